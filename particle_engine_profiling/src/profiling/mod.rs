//! 性能分析工具

pub mod frame_timer;
pub mod profiler;

pub use frame_timer::{FrameTimer, FrameTiming};
pub use profiler::{ProfileScope, Profiler, ScopeStats};
