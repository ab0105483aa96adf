//! 粒子模块
//!
//! 包含粒子数据、双缓冲存储、工作分区和粒子生成：
//! - `particle` - 粒子值类型与颜色
//! - `buffer` - 双缓冲粒子存储
//! - `partition` - 按工作线程切分存活区间
//! - `spawner` - 根据配置与随机源生成粒子

pub mod buffer;
pub mod particle;
pub mod partition;
pub mod spawner;

pub(crate) use buffer::DoubleBuffer;
pub use buffer::{ParticleStore, Role, Slot};
pub use particle::{Particle, Rgba8};
pub use partition::{partition, Partition, PartitionTable};
pub use spawner::{ParticleSpawner, RandomSource};
