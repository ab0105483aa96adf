//! 粒子生成

use super::particle::{Particle, Rgba8};
use crate::config::{SimulationConfig, SpawnConfig};
use glam::Vec2;
use std::f32::consts::TAU;

/// 随机数来源
///
/// 只在生成粒子时使用。所有 `rand::Rng` 自动实现该trait。
pub trait RandomSource {
    /// `[min, max]` 上的均匀整数
    fn int_inclusive(&mut self, min: i32, max: i32) -> i32;
    /// `[min, max]` 上的均匀浮点数
    fn float_inclusive(&mut self, min: f32, max: f32) -> f32;
}

impl<R: rand::Rng + ?Sized> RandomSource for R {
    fn int_inclusive(&mut self, min: i32, max: i32) -> i32 {
        self.gen_range(min..=max)
    }

    fn float_inclusive(&mut self, min: f32, max: f32) -> f32 {
        self.gen_range(min..=max)
    }
}

/// 粒子生成器
#[derive(Debug, Clone)]
pub struct ParticleSpawner {
    origin: Vec2,
    config: SpawnConfig,
}

impl ParticleSpawner {
    pub fn new(origin: Vec2, config: SpawnConfig) -> Self {
        Self { origin, config }
    }

    /// 从模拟配置（屏幕中心）和生成配置创建
    pub fn from_config(simulation: &SimulationConfig, spawn: &SpawnConfig) -> Self {
        Self::new(simulation.origin(), spawn.clone())
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// 生成间隔（秒）
    #[inline]
    pub fn interval(&self) -> f64 {
        self.config.interval
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    /// 在 `now` 时刻生成一个新粒子
    pub fn spawn<R: RandomSource + ?Sized>(&self, now: f64, rng: &mut R) -> Particle {
        let config = &self.config;

        let size = rng.float_inclusive(config.size.min, config.size.max);
        let hue = rng.float_inclusive(config.hue.min, config.hue.max);
        let saturation = rng.int_inclusive(config.saturation.min, config.saturation.max);
        let value = rng.int_inclusive(config.value.min, config.value.max);
        let color = Rgba8::from_hsv(hue, saturation as f32 / 100.0, value as f32 / 100.0);
        let life_time = rng.float_inclusive(config.lifetime.min, config.lifetime.max);

        let direction = Vec2::from_angle(rng.float_inclusive(0.0, TAU));
        let speed = rng.float_inclusive(config.speed.min, config.speed.max);

        Particle {
            start_time: now,
            life_time: life_time as f64,
            size,
            color,
            position: self.origin,
            velocity: direction * speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValueRange;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// 总是返回下界的随机源
    struct MinSource;

    impl RandomSource for MinSource {
        fn int_inclusive(&mut self, min: i32, _max: i32) -> i32 {
            min
        }

        fn float_inclusive(&mut self, min: f32, _max: f32) -> f32 {
            min
        }
    }

    #[test]
    fn test_spawn_within_configured_ranges() {
        let config = SpawnConfig::default();
        let spawner = ParticleSpawner::new(Vec2::new(400.0, 225.0), config.clone());
        let mut rng = StdRng::seed_from_u64(7);

        for i in 0..500 {
            let now = i as f64 * 0.01;
            let p = spawner.spawn(now, &mut rng);
            assert_eq!(p.start_time, now);
            assert_eq!(p.position, Vec2::new(400.0, 225.0));
            assert!(config.size.contains(p.size));
            assert!(config.lifetime.contains(p.life_time as f32));
            let speed = p.velocity.length();
            assert!(speed >= config.speed.min - 1e-3 && speed <= config.speed.max + 1e-3);
            assert_eq!(p.color.a, 255);
            assert!(p.is_alive(now));
        }
    }

    #[test]
    fn test_origin_is_screen_center() {
        let simulation = SimulationConfig::default();
        let spawner = ParticleSpawner::from_config(&simulation, &SpawnConfig::default());
        assert_eq!(spawner.origin(), Vec2::new(400.0, 225.0));
        assert_eq!(spawner.interval(), 0.001);
    }

    #[test]
    fn test_deterministic_lower_bounds() {
        let config = SpawnConfig {
            size: ValueRange::new(3.0, 9.0),
            lifetime: ValueRange::new(2.0, 4.0),
            speed: ValueRange::new(10.0, 20.0),
            hue: ValueRange::new(120.0, 180.0),
            saturation: ValueRange::new(100, 100),
            value: ValueRange::new(100, 100),
            ..Default::default()
        };
        let spawner = ParticleSpawner::new(Vec2::ZERO, config);
        let p = spawner.spawn(1.5, &mut MinSource);

        assert_eq!(p.size, 3.0);
        assert_eq!(p.life_time, 2.0);
        assert_eq!(p.color, Rgba8::new(0, 255, 0, 255));
        // 角度为0时方向为 +x
        assert!((p.velocity - Vec2::new(10.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_same_seed_same_particles() {
        let spawner = ParticleSpawner::new(Vec2::ZERO, SpawnConfig::default());
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..10 {
            assert_eq!(spawner.spawn(0.0, &mut a), spawner.spawn(0.0, &mut b));
        }
    }
}
