use super::{ConfigError, ConfigResult};
use crate::impl_default;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::Duration;

/// 粒子容量上限（每个缓冲区）
pub const MAX_CAPACITY: usize = 1 << 24;

/// 模拟配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// 粒子容量（每个缓冲区）
    pub capacity: usize,

    /// 屏幕宽度（像素），粒子从屏幕中心生成
    pub screen_width: f32,

    /// 屏幕高度（像素）
    pub screen_height: f32,

    /// 随机种子（None表示使用系统熵）
    #[serde(default)]
    pub seed: Option<u64>,

    /// 无头运行时长（秒）
    pub run_seconds: f64,

    /// 无头运行的最大帧数
    #[serde(default)]
    pub max_frames: Option<u64>,
}

impl_default!(SimulationConfig {
    capacity: 1000,
    screen_width: 800.0,
    screen_height: 450.0,
    seed: None,
    run_seconds: 5.0,
    max_frames: None,
});

impl SimulationConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.capacity()?;
        if !(self.screen_width.is_finite() && self.screen_height.is_finite())
            || self.screen_width <= 0.0
            || self.screen_height <= 0.0
        {
            return Err(ConfigError::ValidationError(
                "Invalid screen size".to_string(),
            ));
        }
        self.run_duration()?;
        Ok(())
    }

    /// 已验证的无头运行时长
    pub fn run_duration(&self) -> ConfigResult<Duration> {
        Duration::try_from_secs_f64(self.run_seconds).map_err(|_| {
            ConfigError::ValidationError(format!(
                "Run duration must be a non-negative number of seconds, got {}",
                self.run_seconds
            ))
        })
    }

    /// 已验证的容量
    pub fn capacity(&self) -> ConfigResult<NonZeroUsize> {
        if self.capacity > MAX_CAPACITY {
            return Err(ConfigError::ValidationError(format!(
                "Particle capacity {} exceeds the maximum of {MAX_CAPACITY}",
                self.capacity
            )));
        }
        NonZeroUsize::new(self.capacity).ok_or_else(|| {
            ConfigError::ValidationError("Particle capacity must be at least 1".to_string())
        })
    }

    /// 生成原点（屏幕中心）
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.screen_width / 2.0, self.screen_height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.run_duration().unwrap(), Duration::from_secs(5));
        assert_eq!(config.origin(), Vec2::new(400.0, 225.0));
    }

    #[test]
    fn test_unrepresentable_run_duration_rejected() {
        for run_seconds in [1e20, f64::INFINITY, f64::NAN, -1.0] {
            let config = SimulationConfig {
                run_seconds,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::ValidationError(_))
            ));
            assert!(config.run_duration().is_err());
        }
    }

    #[test]
    fn test_capacity_bounds() {
        let mut config = SimulationConfig {
            capacity: MAX_CAPACITY,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.capacity = MAX_CAPACITY + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        config.capacity = usize::MAX;
        assert!(config.capacity().is_err());

        config.capacity = 0;
        assert!(config.capacity().is_err());
    }
}
