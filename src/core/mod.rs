//! 核心模块
//!
//! 包含引擎的核心功能：
//! - `engine` - 主引擎入口和运行循环
//! - `error` - 错误类型定义
//! - `macros` - 配置样板宏

pub mod engine;
pub mod error;
#[macro_use]
pub mod macros;

pub use engine::{Engine, RenderStats};
pub use error::{EngineError, EngineResult};
