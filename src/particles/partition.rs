//! 工作分区
//!
//! 把 `[0, live_count)` 切分为每个工作线程一段连续区间：
//! 每个线程分到 `live_count / workers` 个粒子，余数由最后一个线程承担。

use std::num::NonZeroUsize;
use std::ops::Range;

/// 单个工作线程在一帧内负责的区间 `(start, len)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Partition {
    pub start: usize,
    pub len: usize,
}

impl Partition {
    pub const EMPTY: Self = Self { start: 0, len: 0 };

    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// 分区表，每个工作线程一项
///
/// 总是由 [`partition`] 或 [`PartitionTable::recompute`] 从存活数量推导，
/// 不单独维护。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    partitions: Vec<Partition>,
    live_count: usize,
}

impl PartitionTable {
    /// 为 `workers` 个工作线程创建空表（全部为空区间）
    pub fn new(workers: NonZeroUsize) -> Self {
        Self {
            partitions: vec![Partition::EMPTY; workers.get()],
            live_count: 0,
        }
    }

    /// 按新的存活数量重新计算，复用已有分配
    pub fn recompute(&mut self, live_count: usize) {
        let workers = self.partitions.len();
        let base = live_count / workers;
        let remainder = live_count % workers;

        for (index, partition) in self.partitions.iter_mut().enumerate() {
            partition.start = index * base;
            partition.len = base;
        }
        if let Some(last) = self.partitions.last_mut() {
            last.len += remainder;
        }
        self.live_count = live_count;
    }

    /// 该表覆盖的存活数量
    #[inline]
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.partitions.len()
    }

    #[inline]
    pub fn get(&self, worker: usize) -> Option<Partition> {
        self.partitions.get(worker).copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn iter(&self) -> impl Iterator<Item = Partition> + '_ {
        self.partitions.iter().copied()
    }

    /// 所有区间长度之和
    pub fn total_len(&self) -> usize {
        self.partitions.iter().map(|p| p.len).sum()
    }
}

/// 计算 `live_count` 个粒子在 `workers` 个线程间的分区
pub fn partition(live_count: usize, workers: NonZeroUsize) -> PartitionTable {
    let mut table = PartitionTable::new(workers);
    table.recompute(live_count);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn workers(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_last_worker_takes_remainder() {
        let table = partition(5, workers(2));
        assert_eq!(
            table.as_slice(),
            &[Partition::new(0, 2), Partition::new(2, 3)]
        );
    }

    #[test]
    fn test_empty_population() {
        let table = partition(0, workers(4));
        assert_eq!(table.worker_count(), 4);
        assert!(table.iter().all(|p| p.is_empty()));
        assert_eq!(table.total_len(), 0);
    }

    #[test]
    fn test_fewer_particles_than_workers() {
        let table = partition(3, workers(7));
        let lens: Vec<_> = table.iter().map(|p| p.len).collect();
        assert_eq!(lens, vec![0, 0, 0, 0, 0, 0, 3]);
        assert_eq!(table.get(6), Some(Partition::new(0, 3)));
    }

    #[test]
    fn test_recompute_reuses_table() {
        let mut table = partition(100, workers(3));
        assert_eq!(table.live_count(), 100);
        table.recompute(10);
        assert_eq!(table.live_count(), 10);
        assert_eq!(
            table.as_slice(),
            &[Partition::new(0, 3), Partition::new(3, 3), Partition::new(6, 4)]
        );
    }

    proptest! {
        #[test]
        fn partition_covers_live_range_exactly_once(
            live in 0usize..=1000,
            n in 1usize..=32,
        ) {
            let table = partition(live, workers(n));
            prop_assert_eq!(table.worker_count(), n);
            prop_assert_eq!(table.total_len(), live);

            let mut covered = vec![0u8; live];
            for p in table.iter() {
                for i in p.range() {
                    prop_assert!(i < live);
                    covered[i] += 1;
                }
            }
            prop_assert!(covered.iter().all(|&c| c == 1));
        }

        #[test]
        fn partitions_are_disjoint_and_ordered(
            live in 0usize..=1000,
            n in 1usize..=32,
        ) {
            let table = partition(live, workers(n));
            let parts = table.as_slice();
            for (i, a) in parts.iter().enumerate() {
                for b in &parts[i + 1..] {
                    let overlap = a.start.max(b.start) < a.end().min(b.end());
                    prop_assert!(!overlap, "{:?} overlaps {:?}", a, b);
                }
            }
            for pair in parts.windows(2) {
                prop_assert_eq!(pair[0].end(), pair[1].start);
            }
        }
    }
}
