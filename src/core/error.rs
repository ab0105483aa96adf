//! 统一错误处理模块
//!
//! ## 错误类型分层
//!
//! - **配置错误** (`config::ConfigError`): 启动前发现，拒绝启动
//! - **引擎错误** (`core::error::EngineError`): 启动过程中的失败（线程创建等）
//!
//! 不变量破坏（存活数量越界、分区重叠、工作线程中途退出）不是可恢复错误，
//! 以带上下文的panic报告。

use crate::config::ConfigError;
use thiserror::Error;

/// 引擎核心错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to spawn particle worker {index}: {source}")]
    WorkerSpawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn render thread: {0}")]
    RenderThread(#[source] std::io::Error),

    #[error("General error: {0}")]
    General(String),
}

/// 引擎结果类型别名
pub type EngineResult<T> = Result<T, EngineError>;
