//! 宿主循环抽象

use std::time::{Duration, Instant};

/// 宿主循环：每帧询问一次是否应当关闭
pub trait HostLoop {
    fn close_requested(&mut self) -> bool;
}

impl<F> HostLoop for F
where
    F: FnMut() -> bool,
{
    fn close_requested(&mut self) -> bool {
        self()
    }
}

/// 运行指定帧数或指定时长后请求关闭
///
/// 两个上限都未设置时永不关闭。
#[derive(Debug, Clone, Default)]
pub struct RunFor {
    max_frames: Option<u64>,
    max_duration: Option<Duration>,
    frames: u64,
    started: Option<Instant>,
}

impl RunFor {
    pub fn new(max_frames: Option<u64>, max_duration: Option<Duration>) -> Self {
        Self {
            max_frames,
            max_duration,
            frames: 0,
            started: None,
        }
    }

    /// 运行 `frames` 帧
    pub fn frames(frames: u64) -> Self {
        Self::new(Some(frames), None)
    }

    /// 运行 `duration` 的墙钟时间
    pub fn duration(duration: Duration) -> Self {
        Self::new(None, Some(duration))
    }

    /// 已经放行的帧数
    pub fn frames_run(&self) -> u64 {
        self.frames
    }
}

impl HostLoop for RunFor {
    fn close_requested(&mut self) -> bool {
        let started = *self.started.get_or_insert_with(Instant::now);

        if self.max_frames.is_some_and(|max| self.frames >= max) {
            return true;
        }
        if self
            .max_duration
            .is_some_and(|max| started.elapsed() >= max)
        {
            return true;
        }

        self.frames += 1;
        false
    }
}
