//! 工作线程信号与忙等策略
//!
//! 每个工作线程一个信号：协调线程写入分区后以 `Release` 置位，
//! 工作线程以 `Acquire` 观察到置位后才读取分区；完成后工作线程以
//! `Release` 清零，协调线程以 `Acquire` 观察到清零后才修改缓冲区。

use crate::particles::Partition;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

/// 单个工作线程的信号（接力棒）
///
/// 按缓存行对齐，避免相邻工作线程之间的伪共享。
#[repr(align(64))]
#[derive(Debug, Default)]
pub(crate) struct WorkerSignal {
    armed: AtomicBool,
    start: AtomicUsize,
    len: AtomicUsize,
}

impl WorkerSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 协调线程：写入本帧分区并置位
    ///
    /// 只能在观察到信号已清零之后调用。
    pub(crate) fn publish(&self, partition: Partition) {
        debug_assert!(!self.armed.load(Ordering::Relaxed));
        self.start.store(partition.start, Ordering::Relaxed);
        self.len.store(partition.len, Ordering::Relaxed);
        self.armed.store(true, Ordering::Release);
    }

    /// 是否已置位
    #[inline]
    pub(crate) fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// 工作线程：读取本帧分区
    ///
    /// 只有在 `is_armed` 返回 `true` 之后读取才有意义。
    #[inline]
    pub(crate) fn assignment(&self) -> Partition {
        Partition::new(
            self.start.load(Ordering::Relaxed),
            self.len.load(Ordering::Relaxed),
        )
    }

    /// 工作线程：本帧完成，清零信号
    #[inline]
    pub(crate) fn complete(&self) {
        self.armed.store(false, Ordering::Release);
    }
}

/// 忙等策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinStrategy {
    /// 纯忙等：每次轮询只发出 `spin_loop` 提示
    Busy,
    /// 指数退避：自旋次数翻倍直到上限，之后让出时间片
    #[default]
    Backoff,
}

/// 退避自旋上限（2^6 = 64 次 `spin_loop`）
const SPIN_LIMIT: u32 = 6;

/// 轮询等待器
#[derive(Debug, Clone)]
pub(crate) struct SpinWait {
    strategy: SpinStrategy,
    step: u32,
}

impl SpinWait {
    pub(crate) fn new(strategy: SpinStrategy) -> Self {
        Self { strategy, step: 0 }
    }

    /// 等待一次
    #[inline]
    pub(crate) fn snooze(&mut self) {
        match self.strategy {
            SpinStrategy::Busy => std::hint::spin_loop(),
            SpinStrategy::Backoff => {
                if self.step <= SPIN_LIMIT {
                    for _ in 0..(1u32 << self.step) {
                        std::hint::spin_loop();
                    }
                    self.step += 1;
                } else {
                    thread::yield_now();
                }
            }
        }
    }

    /// 是否已经进入让出时间片阶段
    #[cfg(test)]
    pub(crate) fn is_yielding(&self) -> bool {
        self.strategy == SpinStrategy::Backoff && self.step > SPIN_LIMIT
    }

    #[inline]
    pub(crate) fn reset(&mut self) {
        self.step = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_signal_alignment() {
        assert_eq!(std::mem::align_of::<WorkerSignal>(), 64);
    }

    #[test]
    fn test_publish_and_complete() {
        let signal = WorkerSignal::new();
        assert!(!signal.is_armed());

        signal.publish(Partition::new(10, 5));
        assert!(signal.is_armed());
        assert_eq!(signal.assignment(), Partition::new(10, 5));

        signal.complete();
        assert!(!signal.is_armed());
    }

    #[test]
    fn test_handoff_across_threads() {
        let signal = Arc::new(WorkerSignal::new());
        let rounds = 1000;

        let worker = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || {
                let mut seen = Vec::with_capacity(rounds);
                let mut spin = SpinWait::new(SpinStrategy::Backoff);
                while seen.len() < rounds {
                    if signal.is_armed() {
                        seen.push(signal.assignment());
                        signal.complete();
                        spin.reset();
                    } else {
                        spin.snooze();
                    }
                }
                seen
            })
        };

        let mut spin = SpinWait::new(SpinStrategy::Backoff);
        for round in 0..rounds {
            while signal.is_armed() {
                spin.snooze();
            }
            spin.reset();
            signal.publish(Partition::new(round, round * 2));
        }

        let seen = worker.join().unwrap();
        for (round, partition) in seen.into_iter().enumerate() {
            assert_eq!(partition, Partition::new(round, round * 2));
        }
    }

    #[test]
    fn test_backoff_escalates_to_yield() {
        let mut spin = SpinWait::new(SpinStrategy::Backoff);
        for _ in 0..=SPIN_LIMIT {
            assert!(!spin.is_yielding());
            spin.snooze();
        }
        assert!(spin.is_yielding());
        spin.snooze();
        spin.reset();
        assert!(!spin.is_yielding());
    }

    #[test]
    fn test_busy_never_yields() {
        let mut spin = SpinWait::new(SpinStrategy::Busy);
        for _ in 0..100 {
            spin.snooze();
        }
        assert!(!spin.is_yielding());
    }
}
