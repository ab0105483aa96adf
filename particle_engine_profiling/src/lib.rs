//! # Particle Engine Profiling
//!
//! Lightweight timing tools used by the particle simulation core.
//!
//! ## Modules
//!
//! - [`profiling`] - Named scope profiler and running-average frame timer
//!
//! ## Example
//!
//! ```rust
//! use particle_engine_profiling::{FrameTimer, Profiler};
//!
//! let mut profiler = Profiler::new();
//! {
//!     let _scope = profiler.scope("cull");
//!     // ... do work ...
//! }
//! assert_eq!(profiler.get_stats("cull").unwrap().call_count, 1);
//!
//! let mut timer = FrameTimer::new();
//! timer.begin_frame();
//! // ... frame work ...
//! timer.end_frame();
//! assert_eq!(timer.sample_count(), 1);
//! ```

pub mod profiling;

// Re-export public APIs
pub use profiling::*;
