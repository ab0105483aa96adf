//! 并行计算模块
//!
//! 常驻工作线程池，使用按线程的原子信号进行 fork/join：
//! - `signal` - 单线程接力棒信号与忙等策略
//! - `pool` - 工作线程池与协调阶段守卫

pub mod pool;
pub mod signal;

pub use pool::{Armed, Quiesced, WorkerPool};
pub use signal::SpinStrategy;
