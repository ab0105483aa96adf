use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// 帧计时器
///
/// 测量每帧的CPU耗时，并维护一个增量平均值（毫秒）。
#[derive(Debug, Default)]
pub struct FrameTimer {
    frame_start: Option<Instant>,
    last_frame: Duration,
    average_ms: f64,
    sample_count: u64,
}

/// 帧计时快照
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameTiming {
    pub last_ms: f64,
    pub average_ms: f64,
    pub samples: u64,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记一帧开始
    pub fn begin_frame(&mut self) {
        self.frame_start = Some(Instant::now());
    }

    /// 标记一帧结束并返回该帧耗时
    ///
    /// 未调用 `begin_frame` 时返回 `None`。
    pub fn end_frame(&mut self) -> Option<Duration> {
        let start = self.frame_start.take()?;
        let elapsed = start.elapsed();
        self.add_sample(elapsed);
        Some(elapsed)
    }

    /// 记录一个样本
    pub fn add_sample(&mut self, elapsed: Duration) {
        self.last_frame = elapsed;
        self.sample_count += 1;
        let ms = elapsed.as_secs_f64() * 1000.0;
        self.average_ms += (ms - self.average_ms) / self.sample_count as f64;
    }

    pub fn last_frame(&self) -> Duration {
        self.last_frame
    }

    pub fn average_ms(&self) -> f64 {
        self.average_ms
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn timing(&self) -> FrameTiming {
        FrameTiming {
            last_ms: self.last_frame.as_secs_f64() * 1000.0,
            average_ms: self.average_ms,
            samples: self.sample_count,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
