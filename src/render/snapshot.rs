//! 渲染快照
//!
//! 把存活粒子转换为实例数据，通过有界通道发送给渲染线程。
//! 渲染线程跟不上时丢弃该帧，模拟线程永不阻塞。

use super::RenderSink;
use crate::particles::Particle;
use crate::simulation::FrameReport;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 单个粒子的绘制实例（半径为 `size` 的圆）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleInstance {
    pub center: Vec2,
    pub radius: f32,
    /// 归一化RGBA
    pub color: [f32; 4],
}

impl From<&Particle> for ParticleInstance {
    fn from(particle: &Particle) -> Self {
        Self {
            center: particle.position,
            radius: particle.size,
            color: particle.color.to_f32_array(),
        }
    }
}

/// 一帧的绘制数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub frame: u64,
    pub now: f64,
    pub instances: Vec<ParticleInstance>,
}

impl RenderSnapshot {
    pub fn from_particles(particles: &[Particle], report: &FrameReport) -> Self {
        Self {
            frame: report.frame,
            now: report.now,
            instances: particles.iter().map(ParticleInstance::from).collect(),
        }
    }
}

/// 通过有界通道发送快照的渲染出口
#[derive(Debug)]
pub struct SnapshotSink {
    sender: Sender<RenderSnapshot>,
    sent: u64,
    dropped: u64,
    disconnected: bool,
}

impl SnapshotSink {
    /// 创建出口与接收端，`capacity` 为通道中最多排队的帧数
    pub fn channel(capacity: usize) -> (Self, Receiver<RenderSnapshot>) {
        let (sender, receiver) = bounded(capacity);
        (Self::new(sender), receiver)
    }

    pub fn new(sender: Sender<RenderSnapshot>) -> Self {
        Self {
            sender,
            sent: 0,
            dropped: 0,
            disconnected: false,
        }
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// 因通道已满或接收端关闭而丢弃的帧数
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl RenderSink for SnapshotSink {
    fn draw(&mut self, particles: &[Particle], report: &FrameReport) {
        if self.disconnected {
            self.dropped += 1;
            return;
        }

        match self
            .sender
            .try_send(RenderSnapshot::from_particles(particles, report))
        {
            Ok(()) => self.sent += 1,
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                tracing::trace!(target: "render", frame = report.frame, "Render thread lagging, frame dropped");
            }
            Err(TrySendError::Disconnected(_)) => {
                self.dropped += 1;
                self.disconnected = true;
                tracing::warn!(target: "render", frame = report.frame, "Render receiver closed");
            }
        }
    }
}
