//! 渲染出口
//!
//! 模拟本身不绘制任何东西：协调器每帧在武装工作线程之后把 front 的存活粒子
//! 交给一个 [`RenderSink`]。粒子切片只在调用期间有效，且不可修改。

pub mod snapshot;

pub use snapshot::{ParticleInstance, RenderSnapshot, SnapshotSink};

use crate::particles::Particle;
use crate::simulation::FrameReport;

/// 每帧接收存活粒子的渲染出口
pub trait RenderSink {
    fn draw(&mut self, particles: &[Particle], report: &FrameReport);
}

impl<F> RenderSink for F
where
    F: FnMut(&[Particle], &FrameReport),
{
    fn draw(&mut self, particles: &[Particle], report: &FrameReport) {
        self(particles, report)
    }
}

/// 丢弃所有帧
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    #[inline]
    fn draw(&mut self, _particles: &[Particle], _report: &FrameReport) {}
}
