//! 引擎主入口
//!
//! 定义Engine结构和无头运行循环

use crate::config::{EngineConfig, LoggingConfig};
use crate::render::{RenderSnapshot, SnapshotSink};
use crate::simulation::{FrameCoordinator, RunFor, RunSummary, SystemClock};
use crossbeam_channel::Receiver;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::thread::{self, JoinHandle};

use super::error::{EngineError, EngineResult};

/// 渲染通道中最多排队的帧数
const RENDER_QUEUE_DEPTH: usize = 2;

/// 粒子引擎主结构
///
/// `Engine` 负责：
/// - 初始化日志
/// - 验证配置并启动工作线程池
/// - 驱动帧循环直到运行上限
/// - 关闭工作线程与渲染线程
///
/// # 示例
///
/// ```no_run
/// use particle_engine::config::EngineConfig;
/// use particle_engine::core::Engine;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let summary = Engine::run(EngineConfig::default())?;
///     println!("{} frames", summary.frames);
///     Ok(())
/// }
/// ```
pub struct Engine;

/// 渲染线程统计
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderStats {
    pub frames: u64,
    pub last_frame: u64,
    pub last_instance_count: usize,
}

impl Engine {
    /// 运行引擎直到达到配置的帧数或时长
    pub fn run(config: EngineConfig) -> EngineResult<RunSummary> {
        Self::initialize_logging(&config.logging);
        tracing::info!(target: "engine", "Engine starting");

        // 完整验证由 `FrameCoordinator::new` 在启动线程之前完成
        let run_duration = config.simulation.run_duration()?;
        let mut coordinator = FrameCoordinator::new(&config)?;
        tracing::info!(
            target: "config",
            capacity = config.simulation.capacity,
            workers = config.threading.worker_threads,
            spin = ?config.threading.spin,
            interval = config.spawn.interval,
            seed = ?config.simulation.seed,
            "Configuration validated"
        );

        let mut rng = match config.simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let (mut sink, receiver) = SnapshotSink::channel(RENDER_QUEUE_DEPTH);
        let render_thread = Self::spawn_render_thread(receiver)?;

        let mut host = RunFor::new(
            config.simulation.max_frames,
            Some(run_duration),
        );
        let mut clock = SystemClock::new();

        let summary = coordinator.run(&mut clock, &mut host, &mut sink, &mut rng);
        let store = coordinator.shutdown();

        let (sent, dropped) = (sink.sent(), sink.dropped());
        drop(sink);
        let render_stats = render_thread
            .join()
            .map_err(|_| EngineError::General("Render thread panicked".to_string()))?;

        tracing::info!(
            target: "engine",
            frames = summary.frames,
            live = store.live_count(),
            spawned = summary.total_spawned,
            culled = summary.total_culled,
            average_cpu_ms = summary.average_cpu_ms,
            snapshots_sent = sent,
            snapshots_dropped = dropped,
            rendered = render_stats.frames,
            "Engine stopped"
        );

        Ok(summary)
    }

    /// 初始化日志系统
    ///
    /// `RUST_LOG` 优先，否则使用配置的级别。重复初始化会被忽略。
    pub fn initialize_logging(config: &LoggingConfig) {
        if !config.log_to_console {
            return;
        }
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.level.as_directive()));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .try_init();
    }

    /// 启动渲染线程
    ///
    /// 无头模式下只统计收到的快照；发送端关闭后线程退出。
    fn spawn_render_thread(
        receiver: Receiver<RenderSnapshot>,
    ) -> EngineResult<JoinHandle<RenderStats>> {
        thread::Builder::new()
            .name("particle-render".to_string())
            .spawn(move || {
                let mut stats = RenderStats::default();
                for snapshot in receiver.iter() {
                    stats.frames += 1;
                    stats.last_frame = snapshot.frame;
                    stats.last_instance_count = snapshot.instances.len();
                }
                tracing::debug!(target: "engine", frames = stats.frames, "Render thread stopped");
                stats
            })
            .map_err(EngineError::RenderThread)
    }
}
