//! 时钟抽象

use std::time::Instant;

/// 帧时钟
///
/// `now` 是单调递增的秒数，`delta` 是上一帧的时长。
/// 每帧开始时调用一次 [`advance_frame`](Clock::advance_frame)。
pub trait Clock {
    fn now(&self) -> f64;
    fn delta(&self) -> f32;
    fn advance_frame(&mut self);
}

/// 基于 `Instant` 的系统时钟
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
    last: Instant,
    now: f64,
    delta: f32,
}

impl SystemClock {
    pub fn new() -> Self {
        let start = Instant::now();
        Self {
            start,
            last: start,
            now: 0.0,
            delta: 0.0,
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> f64 {
        self.now
    }

    #[inline]
    fn delta(&self) -> f32 {
        self.delta
    }

    fn advance_frame(&mut self) {
        let current = Instant::now();
        self.delta = current.duration_since(self.last).as_secs_f32();
        self.now = current.duration_since(self.start).as_secs_f64();
        self.last = current;
    }
}

/// 手动推进的时钟，用于测试和确定性回放
#[derive(Debug, Clone, PartialEq)]
pub struct ManualClock {
    now: f64,
    step: f32,
    delta: f32,
}

impl ManualClock {
    /// 每帧固定推进 `step` 秒
    pub fn new(step: f32) -> Self {
        Self {
            now: 0.0,
            step,
            delta: 0.0,
        }
    }

    /// 修改后续帧的步长
    pub fn set_step(&mut self, step: f32) {
        self.step = step;
    }

    pub fn step(&self) -> f32 {
        self.step
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> f64 {
        self.now
    }

    #[inline]
    fn delta(&self) -> f32 {
        self.delta
    }

    fn advance_frame(&mut self) {
        self.delta = self.step;
        self.now += self.step as f64;
    }
}
