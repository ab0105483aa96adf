//! 帧协调器
//!
//! 每帧按固定顺序推进状态机：
//!
//! ```text
//! AwaitingWorkers → Swapping → Culling → Spawning → Repartitioning → Arming
//!        ▲                                                              │
//!        └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! 宿主请求关闭时进入 `ShuttingDown`：等待最后一帧完成、关闭工作线程、释放缓冲区。

use super::clock::Clock;
use super::host::HostLoop;
use crate::config::EngineConfig;
use crate::core::error::EngineResult;
use crate::parallel::WorkerPool;
use crate::particles::{Particle, ParticleSpawner, ParticleStore, RandomSource};
use crate::render::RenderSink;
use particle_engine_profiling::{FrameTimer, Profiler};
use serde::{Deserialize, Serialize};

/// 状态行输出间隔（模拟秒）
const STATUS_INTERVAL: f64 = 1.0;

/// 协调器所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FramePhase {
    AwaitingWorkers,
    Swapping,
    Culling,
    Spawning,
    Repartitioning,
    Arming,
    ShuttingDown,
}

/// 单帧报告
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    /// 帧序号，从1开始
    pub frame: u64,
    /// 本帧时间（秒）
    pub now: f64,
    /// 本帧时长（秒）
    pub dt: f32,
    /// 武装后的存活数量
    pub live: usize,
    pub culled: usize,
    pub spawned: usize,
    /// 协调线程本帧CPU耗时（毫秒）
    pub cpu_ms: f64,
}

/// 一次运行的汇总
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub frames: u64,
    pub final_live: usize,
    pub total_spawned: u64,
    pub total_culled: u64,
    pub average_cpu_ms: f64,
    pub worker_threads: usize,
}

/// 帧协调器
///
/// 拥有工作线程池和生成器，是唯一修改粒子存储的线程。
pub struct FrameCoordinator {
    pool: WorkerPool,
    spawner: ParticleSpawner,
    /// 累积的生成计时（秒）
    spawn_timer: f64,
    phase: FramePhase,
    frame: u64,
    total_spawned: u64,
    total_culled: u64,
    profiler: Profiler,
    timer: FrameTimer,
    last_status: f64,
}

impl FrameCoordinator {
    /// 验证配置并启动工作线程
    ///
    /// # 错误
    ///
    /// 配置无效时返回 [`EngineError::Config`](crate::core::EngineError::Config)，
    /// 线程创建失败时返回 [`EngineError::WorkerSpawn`](crate::core::EngineError::WorkerSpawn)。
    pub fn new(config: &EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let capacity = config.simulation.capacity()?;
        let workers = config.threading.worker_count()?;

        let pool = WorkerPool::spawn(ParticleStore::new(capacity), workers, config.threading.spin)?;
        let spawner = ParticleSpawner::from_config(&config.simulation, &config.spawn);

        tracing::info!(
            target: "coordinator",
            capacity = capacity.get(),
            workers = workers.get(),
            interval = spawner.interval(),
            "Frame coordinator ready"
        );

        Ok(Self {
            pool,
            spawner,
            spawn_timer: 0.0,
            phase: FramePhase::AwaitingWorkers,
            frame: 0,
            total_spawned: 0,
            total_culled: 0,
            profiler: Profiler::new(),
            timer: FrameTimer::new(),
            last_status: 0.0,
        })
    }

    /// 推进一帧
    ///
    /// 等待上一帧完成后交换角色、剔除、生成、重新分区，然后以 `dt` 重新武装工作线程。
    /// 返回时工作线程正在计算下一帧，front 可以安全读取。
    pub fn step<R: RandomSource + ?Sized>(&mut self, now: f64, dt: f32, rng: &mut R) -> FrameReport {
        self.timer.begin_frame();
        self.frame += 1;
        self.spawn_timer += dt as f64;

        self.phase = FramePhase::AwaitingWorkers;
        let mut quiesced = {
            let _scope = self.profiler.scope("await_workers");
            self.pool.quiesce()
        };

        self.phase = FramePhase::Swapping;
        quiesced.swap_roles();

        self.phase = FramePhase::Culling;
        let culled = {
            let _scope = self.profiler.scope("cull");
            quiesced.cull(now)
        };

        self.phase = FramePhase::Spawning;
        let mut spawned = 0;
        {
            let _scope = self.profiler.scope("spawn");
            let interval = self.spawner.interval();
            while self.spawn_timer >= interval {
                if quiesced.store().is_full() {
                    // 容量已满时最多保留一个间隔的积压
                    self.spawn_timer = self.spawn_timer.min(interval);
                    break;
                }
                self.spawn_timer -= interval;
                let particle = self.spawner.spawn(now, rng);
                if quiesced.spawn(particle).is_some() {
                    spawned += 1;
                }
            }
        }

        self.phase = FramePhase::Repartitioning;
        let live = quiesced.repartition().live_count();
        assert!(
            live <= quiesced.store().capacity(),
            "live count {live} exceeds capacity {}",
            quiesced.store().capacity()
        );

        self.phase = FramePhase::Arming;
        quiesced.arm(dt);
        self.phase = FramePhase::AwaitingWorkers;

        self.total_spawned += spawned as u64;
        self.total_culled += culled as u64;
        let cpu_ms = self
            .timer
            .end_frame()
            .map_or(0.0, |elapsed| elapsed.as_secs_f64() * 1000.0);

        let report = FrameReport {
            frame: self.frame,
            now,
            dt,
            live,
            culled,
            spawned,
            cpu_ms,
        };
        tracing::trace!(target: "coordinator", ?report, "Frame armed");

        if now - self.last_status >= STATUS_INTERVAL {
            self.last_status = now;
            tracing::info!(target: "coordinator", live, "{}", self.status_line());
        }

        report
    }

    /// 运行直到宿主请求关闭
    ///
    /// 每帧在武装之后把 front 的存活粒子交给 `sink`。
    pub fn run<C, H, S, R>(&mut self, clock: &mut C, host: &mut H, sink: &mut S, rng: &mut R) -> RunSummary
    where
        C: Clock + ?Sized,
        H: HostLoop + ?Sized,
        S: RenderSink + ?Sized,
        R: RandomSource + ?Sized,
    {
        while !host.close_requested() {
            clock.advance_frame();
            let report = self.step(clock.now(), clock.delta(), rng);
            sink.draw(self.front(), &report);
        }

        self.phase = FramePhase::ShuttingDown;
        tracing::info!(target: "coordinator", frames = self.frame, "Close requested");
        self.summary()
    }

    /// 关闭工作线程并取回粒子存储
    ///
    /// 最后一帧的结果会先发布到 front。
    pub fn shutdown(mut self) -> ParticleStore {
        self.phase = FramePhase::ShuttingDown;
        self.profiler.log_report();
        self.pool.shutdown()
    }

    /// front 缓冲区中的存活粒子
    #[inline]
    pub fn front(&self) -> &[Particle] {
        self.pool.live()
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.pool.store().live_count()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.pool.store().capacity()
    }

    #[inline]
    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    /// 尚未消费的生成计时
    #[inline]
    pub fn spawn_timer(&self) -> f64 {
        self.spawn_timer
    }

    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    pub fn status_line(&self) -> String {
        let workers = self.pool.worker_count();
        format!(
            "Threaded particle system @ CPU: {:.3}ms w/ {} thread{}",
            self.timer.average_ms(),
            workers,
            if workers == 1 { "" } else { "s" }
        )
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.frame,
            final_live: self.live_count(),
            total_spawned: self.total_spawned,
            total_culled: self.total_culled,
            average_cpu_ms: self.timer.average_ms(),
            worker_threads: self.pool.worker_count(),
        }
    }
}
