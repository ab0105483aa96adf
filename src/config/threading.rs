use super::{ConfigError, ConfigResult};
use crate::impl_default;
use crate::parallel::SpinStrategy;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;

/// 多线程配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadingConfig {
    /// 工作线程数（默认：逻辑核心数减去协调线程）
    pub worker_threads: usize,

    /// 忙等策略
    #[serde(default)]
    pub spin: SpinStrategy,
}

impl_default!(ThreadingConfig {
    worker_threads: default_worker_threads(),
    spin: SpinStrategy::default(),
});

/// 逻辑核心数减一，至少为1
pub fn default_worker_threads() -> usize {
    num_cpus::get().saturating_sub(1).max(1)
}

impl ThreadingConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.worker_count().map(|_| ())
    }

    /// 已验证的工作线程数
    pub fn worker_count(&self) -> ConfigResult<NonZeroUsize> {
        NonZeroUsize::new(self.worker_threads).ok_or_else(|| {
            ConfigError::ValidationError("Worker thread count must be at least 1".to_string())
        })
    }
}
