//! 常驻工作线程池
//!
//! ## 帧协议
//!
//! ```text
//! ┌──────────────────┐                         ┌──────────────────┐
//! │   Coordinator    │                         │   Worker k       │
//! │                  │  publish(range) Release │                  │
//! │  quiesce() ──────┼────────────────────────►│ spin: is_armed() │
//! │  swap/cull/spawn │                         │ advance(range)   │
//! │  arm(dt) ────────┤◄────────────────────────┤ complete()       │
//! │                  │  complete()   Release   │                  │
//! └──────────────────┘                         └──────────────────┘
//! ```
//!
//! 协调线程只有通过 [`WorkerPool::quiesce`] 返回的 [`Quiesced`] 才能修改粒子存储，
//! 而 `Quiesced` 只在所有信号都被观察到清零之后才存在；[`Quiesced::arm`]
//! 消费它并重新置位所有信号。

use super::signal::{SpinStrategy, SpinWait, WorkerSignal};
use crate::core::error::{EngineError, EngineResult};
use crate::particles::{DoubleBuffer, Particle, ParticleStore, PartitionTable, Slot};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// 工作线程与协调线程共享的状态
struct PoolShared {
    buffers: Arc<DoubleBuffer>,
    signals: Box<[WorkerSignal]>,
    /// 本帧 `dt` 的位模式
    dt_bits: AtomicU32,
    /// 本帧 front 槽位
    front: AtomicU8,
    shutdown: AtomicBool,
}

impl PoolShared {
    /// 工作线程主循环
    fn run_worker(&self, index: usize, strategy: SpinStrategy) {
        let signal = &self.signals[index];
        let mut spin = SpinWait::new(strategy);
        tracing::debug!(target: "workers", worker = index, "Worker started");

        loop {
            if signal.is_armed() {
                let partition = signal.assignment();
                let dt = f32::from_bits(self.dt_bits.load(Ordering::Relaxed));
                let front = Slot::from_u8(self.front.load(Ordering::Relaxed));
                // SAFETY: 分区表保证各工作线程的区间互不相交且位于存活范围之内；
                // 信号置位期间协调线程不访问缓冲区，front 没有写者。
                unsafe { self.buffers.advance(front, partition.range(), dt) };
                signal.complete();
                spin.reset();
            } else if self.shutdown.load(Ordering::Acquire) {
                break;
            } else {
                spin.snooze();
            }
        }

        tracing::debug!(target: "workers", worker = index, "Worker stopped");
    }
}

/// 工作线程句柄集合，析构时发出关闭信号并等待全部退出
struct Workers {
    shared: Arc<PoolShared>,
    handles: Vec<JoinHandle<()>>,
}

impl Workers {
    fn spawn(shared: Arc<PoolShared>, strategy: SpinStrategy) -> EngineResult<Self> {
        let count = shared.signals.len();
        let mut workers = Self {
            shared,
            handles: Vec::with_capacity(count),
        };

        for index in 0..count {
            let shared = Arc::clone(&workers.shared);
            let handle = thread::Builder::new()
                .name(format!("particle-worker-{index}"))
                .spawn(move || shared.run_worker(index, strategy))
                .map_err(|source| EngineError::WorkerSpawn { index, source })?;
            workers.handles.push(handle);
        }

        Ok(workers)
    }

    fn is_finished(&self, index: usize) -> bool {
        self.handles
            .get(index)
            .map_or(true, |handle| handle.is_finished())
    }

    fn join_all(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        for (index, handle) in self.handles.drain(..).enumerate() {
            if handle.join().is_err() {
                tracing::error!(target: "workers", worker = index, "Worker panicked");
            }
        }
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        self.join_all();
    }
}

/// 固定大小的粒子工作线程池
///
/// 拥有 [`ParticleStore`]；线程在创建时启动，在 [`shutdown`](Self::shutdown)
/// 或析构时关闭。
pub struct WorkerPool {
    store: ParticleStore,
    partitions: PartitionTable,
    strategy: SpinStrategy,
    /// back 中有已计算但尚未交换到 front 的结果
    unpublished: bool,
    workers: Workers,
}

impl WorkerPool {
    /// 创建线程池并启动 `worker_count` 个工作线程
    ///
    /// # 错误
    ///
    /// 线程创建失败时返回 [`EngineError::WorkerSpawn`]，已启动的线程会被关闭。
    pub fn spawn(
        store: ParticleStore,
        worker_count: NonZeroUsize,
        strategy: SpinStrategy,
    ) -> EngineResult<Self> {
        let shared = Arc::new(PoolShared {
            buffers: store.shared_buffers(),
            signals: (0..worker_count.get()).map(|_| WorkerSignal::new()).collect(),
            dt_bits: AtomicU32::new(0),
            front: AtomicU8::new(store.slot(crate::particles::Role::Front) as u8),
            shutdown: AtomicBool::new(false),
        });
        let workers = Workers::spawn(shared, strategy)?;

        tracing::info!(
            target: "workers",
            workers = worker_count.get(),
            capacity = store.capacity(),
            ?strategy,
            "Worker pool started"
        );

        Ok(Self {
            partitions: PartitionTable::new(worker_count),
            store,
            strategy,
            unpublished: false,
            workers,
        })
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.partitions.worker_count()
    }

    /// 粒子存储的只读视图（front 在任何阶段都可以安全读取）
    #[inline]
    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    /// front 缓冲区中的存活粒子
    #[inline]
    pub fn live(&self) -> &[Particle] {
        self.store.live()
    }

    /// 最近一次武装时使用的分区表
    #[inline]
    pub fn partitions(&self) -> &PartitionTable {
        &self.partitions
    }

    /// 是否有工作线程仍在计算
    pub fn is_busy(&self) -> bool {
        self.workers.shared.signals.iter().any(WorkerSignal::is_armed)
    }

    /// 等待所有工作线程完成当前帧
    ///
    /// # Panics
    ///
    /// 工作线程在帧进行中退出（例如发生panic）时终止，
    /// 继续运行会让缓冲区处于未定义的中间状态。
    pub fn quiesce(&mut self) -> Quiesced<'_> {
        let mut spin = SpinWait::new(self.strategy);
        for (index, signal) in self.workers.shared.signals.iter().enumerate() {
            while signal.is_armed() {
                if self.workers.is_finished(index) {
                    panic!(
                        "particle worker {index} exited with a frame in flight \
                         (live: {}, capacity: {})",
                        self.store.live_count(),
                        self.store.capacity()
                    );
                }
                spin.snooze();
            }
            spin.reset();
        }
        Quiesced { pool: self }
    }

    /// 关闭线程池并取回粒子存储
    ///
    /// 已武装的帧会先完成，其结果通过交换角色发布到 front。
    pub fn shutdown(mut self) -> ParticleStore {
        {
            let mut quiesced = self.quiesce();
            if quiesced.pool.unpublished {
                quiesced.swap_roles();
            }
        }
        self.workers.join_all();
        tracing::info!(target: "workers", "Worker pool stopped");

        let WorkerPool { store, .. } = self;
        store
    }
}

/// 所有工作线程空闲时的协调阶段
///
/// 只有持有该值时才能修改粒子存储。
pub struct Quiesced<'a> {
    pool: &'a mut WorkerPool,
}

impl<'a> Quiesced<'a> {
    #[inline]
    pub fn store(&self) -> &ParticleStore {
        &self.pool.store
    }

    /// 交换 front/back 角色
    pub fn swap_roles(&mut self) {
        self.pool.store.swap_roles();
        self.pool.unpublished = false;
    }

    /// 剔除过期粒子，返回剔除数量
    pub fn cull(&mut self, now: f64) -> usize {
        self.pool.store.cull(now)
    }

    /// 写入新粒子，已满时返回 `None`
    pub fn spawn(&mut self, particle: Particle) -> Option<usize> {
        self.pool.store.spawn(particle)
    }

    /// 按当前存活数量重新计算分区
    pub fn repartition(&mut self) -> &PartitionTable {
        let live = self.pool.store.live_count();
        self.pool.partitions.recompute(live);
        &self.pool.partitions
    }

    /// 发布 `dt` 与分区并置位所有工作线程
    ///
    /// 分区表与当前存活数量不一致时先重新计算。
    pub fn arm(mut self, dt: f32) -> Armed<'a> {
        if self.pool.partitions.live_count() != self.pool.store.live_count() {
            self.repartition();
        }

        let pool = self.pool;
        pool.unpublished = true;
        let shared = &pool.workers.shared;
        let front = pool.store.slot(crate::particles::Role::Front);
        shared.dt_bits.store(dt.to_bits(), Ordering::Relaxed);
        shared.front.store(front as u8, Ordering::Relaxed);
        for (signal, partition) in shared.signals.iter().zip(pool.partitions.iter()) {
            signal.publish(partition);
        }

        Armed { pool }
    }
}

/// 工作线程计算阶段：只能读取 front
pub struct Armed<'a> {
    pool: &'a WorkerPool,
}

impl<'a> Armed<'a> {
    #[inline]
    pub fn store(&self) -> &'a ParticleStore {
        &self.pool.store
    }

    #[inline]
    pub fn live(&self) -> &'a [Particle] {
        self.pool.store.live()
    }

    #[inline]
    pub fn partitions(&self) -> &'a PartitionTable {
        &self.pool.partitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn filled_store(capacity: usize, count: usize) -> ParticleStore {
        let mut store = ParticleStore::new(nz(capacity));
        for i in 0..count {
            store.spawn(Particle {
                start_time: 0.0,
                life_time: 100.0,
                position: Vec2::new(i as f32, 0.0),
                velocity: Vec2::new(1.0, i as f32),
                ..Default::default()
            });
        }
        store
    }

    #[test]
    fn test_pool_matches_sequential_advance() {
        for workers in [1, 2, 3, 7] {
            let mut reference = filled_store(64, 50);
            reference.advance_all(0.25);
            reference.swap_roles();

            let mut pool =
                WorkerPool::spawn(filled_store(64, 50), nz(workers), SpinStrategy::Busy).unwrap();
            assert_eq!(pool.worker_count(), workers);
            pool.quiesce().arm(0.25);
            let mut quiesced = pool.quiesce();
            quiesced.swap_roles();
            assert_eq!(quiesced.store().live(), reference.live());
        }
    }

    #[test]
    fn test_arm_repartitions_for_live_count() {
        let mut pool =
            WorkerPool::spawn(filled_store(16, 5), nz(2), SpinStrategy::Backoff).unwrap();
        let armed = pool.quiesce().arm(0.1);
        assert_eq!(armed.partitions().live_count(), 5);
        assert_eq!(armed.partitions().get(1).unwrap().len, 3);
        assert_eq!(armed.live().len(), 5);
    }

    #[test]
    fn test_empty_population_runs() {
        let mut pool =
            WorkerPool::spawn(ParticleStore::new(nz(8)), nz(4), SpinStrategy::Backoff).unwrap();
        for _ in 0..10 {
            pool.quiesce().arm(0.016);
        }
        let store = pool.shutdown();
        assert!(store.is_empty());
    }

    #[test]
    fn test_shutdown_publishes_last_frame() {
        let mut pool =
            WorkerPool::spawn(filled_store(8, 3), nz(2), SpinStrategy::Backoff).unwrap();
        let before = pool.live().to_vec();
        pool.quiesce().arm(2.0);
        let store = pool.shutdown();

        for (old, new) in before.iter().zip(store.live()) {
            assert_eq!(new.position, old.position + old.velocity * 2.0);
        }
    }

    #[test]
    fn test_drop_joins_workers() {
        let mut pool =
            WorkerPool::spawn(filled_store(8, 8), nz(3), SpinStrategy::Busy).unwrap();
        pool.quiesce().arm(1.0);
        drop(pool);
    }

    #[test]
    fn test_quiesced_mutation_between_frames() {
        let mut pool =
            WorkerPool::spawn(filled_store(8, 4), nz(2), SpinStrategy::Backoff).unwrap();
        {
            let mut quiesced = pool.quiesce();
            quiesced.swap_roles();
            // 所有粒子在 t=200 都已过期
            assert_eq!(quiesced.cull(200.0), 4);
            assert!(quiesced.spawn(Particle::default()).is_some());
            let table = quiesced.repartition();
            assert_eq!(table.total_len(), 1);
            quiesced.arm(0.5);
        }
        assert!(pool.quiesce().store().live_count() == 1);
    }
}
