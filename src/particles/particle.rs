//! 粒子数据定义

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 8位RGBA颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// 从HSV构造不透明颜色
    ///
    /// # 参数
    ///
    /// * `hue` - 色相，单位为度，取值会被折回到 `[0, 360)`
    /// * `saturation` - 饱和度 `[0, 1]`
    /// * `value` - 明度 `[0, 1]`
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let hue = hue.rem_euclid(360.0);
        let saturation = saturation.clamp(0.0, 1.0);
        let value = value.clamp(0.0, 1.0);

        let channel = |n: f32| {
            let k = (n + hue / 60.0) % 6.0;
            let t = k.min(4.0 - k).clamp(0.0, 1.0);
            let c = value - value * saturation * t;
            (c * 255.0).round() as u8
        };

        Self::new(channel(5.0), channel(3.0), channel(1.0), 255)
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// 归一化到 `[0, 1]` 的浮点颜色
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::WHITE
    }
}

/// 粒子
///
/// 定长的值类型，除数组槽位外没有身份；剔除时可以自由搬移。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Particle {
    /// 生成时刻（秒）
    pub start_time: f64,
    /// 存活时长（秒）
    pub life_time: f64,
    pub size: f32,
    pub color: Rgba8,
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Particle {
    /// 在时刻 `now` 是否存活
    ///
    /// 当且仅当 `now < start_time + life_time`。
    #[inline]
    pub fn is_alive(&self, now: f64) -> bool {
        now < self.expires_at()
    }

    /// 过期时刻
    #[inline]
    pub fn expires_at(&self) -> f64 {
        self.start_time + self.life_time
    }

    /// 积分 `dt` 秒之后的位置
    #[inline]
    pub fn integrated_position(&self, dt: f32) -> Vec2 {
        self.position + self.velocity * dt
    }
}
