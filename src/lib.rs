//! # Particle Engine
//!
//! A multithreaded 2D particle simulation built around a double-buffered
//! particle store and a fixed pool of spin-synchronised worker threads.
//!
//! ## Features
//!
//! - **Double Buffering**: workers read the front buffer and write the back
//!   buffer; the coordinator swaps roles once per frame
//! - **Fork/Join Frames**: every frame is split into contiguous, disjoint
//!   ranges, one per worker, published with release/acquire signals
//! - **Lifecycle**: expired particles are culled in place, new particles are
//!   spawned on a fixed interval up to a fixed capacity
//! - **Configuration**: TOML/JSON files with environment overrides
//! - **Profiling**: per-phase timing and a running CPU average
//!
//! ## Architecture Design
//!
//! The coordinator thread owns all mutation. Workers only ever integrate
//! positions inside their own range:
//! - **State**: [`particles::ParticleStore`] bundles both buffers, the front role and the live count
//! - **Pool**: [`parallel::WorkerPool`] hands out a [`parallel::Quiesced`] guard only when every worker is idle
//! - **Driver**: [`simulation::FrameCoordinator`] runs swap, cull, spawn, repartition and arm in order
//!
//! ### Example
//!
//! ```no_run
//! use particle_engine::config::EngineConfig;
//! use particle_engine::render::NullSink;
//! use particle_engine::simulation::{FrameCoordinator, ManualClock, RunFor};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let config = EngineConfig::default();
//! let mut coordinator = FrameCoordinator::new(&config)?;
//! let mut rng = StdRng::seed_from_u64(7);
//! coordinator.run(&mut ManualClock::new(1.0 / 60.0), &mut RunFor::frames(120), &mut NullSink, &mut rng);
//! let store = coordinator.shutdown();
//! println!("{} particles alive", store.live_count());
//! # Ok::<(), particle_engine::core::EngineError>(())
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Engine entry point, errors and macros
//! - [`config`]: Configuration loading and validation
//! - [`particles`]: Particle data, double buffer, partitioning and spawning
//! - [`parallel`]: Worker signals and the worker pool
//! - [`simulation`]: Clock, host loop and frame coordinator
//! - [`render`]: Render sinks fed with the live front buffer

/// Core engine functionality including the main loop and error types
pub mod core;
/// Configuration system
pub mod config;
/// Particle data and storage
pub mod particles;
/// Worker threads and frame synchronisation
pub mod parallel;
/// Frame coordination and timing
pub mod simulation;
/// Render output
pub mod render;

pub use crate::core::{Engine, EngineError, EngineResult};
pub use config::EngineConfig;
pub use particles::{Particle, ParticleStore};
pub use simulation::{FrameCoordinator, FrameReport};
