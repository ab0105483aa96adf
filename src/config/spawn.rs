use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 闭区间 `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> ValueRange<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    fn check_ordered(&self, name: &str) -> ConfigResult<()> {
        if self.min <= self.max {
            Ok(())
        } else {
            Err(ConfigError::ValidationError(format!(
                "{name}: min must not exceed max"
            )))
        }
    }
}

impl ValueRange<f32> {
    fn check_finite_positive(&self, name: &str) -> ConfigResult<()> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "{name}: values must be finite and non-negative"
            )));
        }
        self.check_ordered(name)
    }
}

/// 粒子生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// 生成间隔（秒）
    pub interval: f64,

    /// 尺寸范围（像素半径）
    pub size: ValueRange<f32>,

    /// 存活时长范围（秒）
    pub lifetime: ValueRange<f32>,

    /// 速度范围（像素/秒）
    pub speed: ValueRange<f32>,

    /// 色相范围（度，0-360）
    pub hue: ValueRange<f32>,

    /// 饱和度范围（百分比，0-100）
    pub saturation: ValueRange<i32>,

    /// 明度范围（百分比，0-100）
    pub value: ValueRange<i32>,
}

impl_default!(SpawnConfig {
    interval: 0.001,
    size: ValueRange::new(15.0, 45.0),
    lifetime: ValueRange::new(5.0, 50.0),
    speed: ValueRange::new(50.0, 100.0),
    hue: ValueRange::new(0.0, 360.0),
    saturation: ValueRange::new(0, 100),
    value: ValueRange::new(0, 100),
});

impl SpawnConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(ConfigError::ValidationError(
                "Spawn interval must be a positive number of seconds".to_string(),
            ));
        }
        self.size.check_finite_positive("spawn.size")?;
        self.lifetime.check_finite_positive("spawn.lifetime")?;
        self.speed.check_finite_positive("spawn.speed")?;
        self.hue.check_finite_positive("spawn.hue")?;
        if self.hue.max > 360.0 {
            return Err(ConfigError::ValidationError(
                "spawn.hue: values must lie in 0..=360".to_string(),
            ));
        }
        for (name, range) in [
            ("spawn.saturation", &self.saturation),
            ("spawn.value", &self.value),
        ] {
            range.check_ordered(name)?;
            if range.min < 0 || range.max > 100 {
                return Err(ConfigError::ValidationError(format!(
                    "{name}: values must lie in 0..=100"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SpawnConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_interval() {
        for interval in [0.0, -1.0, f64::NAN] {
            let config = SpawnConfig {
                interval,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::ValidationError(_))
            ));
        }
    }

    #[test]
    fn test_rejects_inverted_range() {
        let config = SpawnConfig {
            lifetime: ValueRange::new(10.0, 1.0),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("spawn.lifetime"));
    }

    #[test]
    fn test_rejects_out_of_range_percent() {
        let config = SpawnConfig {
            value: ValueRange::new(0, 150),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_value_range_contains() {
        let range = ValueRange::new(1.0f32, 2.0);
        assert!(range.contains(1.0));
        assert!(range.contains(2.0));
        assert!(!range.contains(2.5));
    }
}
