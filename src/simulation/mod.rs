//! 模拟驱动
//!
//! - `clock` - 帧时钟
//! - `host` - 宿主循环（何时关闭）
//! - `coordinator` - 每帧状态机，驱动工作线程池

pub mod clock;
pub mod coordinator;
pub mod host;

pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::{FrameCoordinator, FramePhase, FrameReport, RunSummary};
pub use host::{HostLoop, RunFor};
