//! Harvest World - live resource nodes
//!
//! Sits on top of `harvest-core` and `harvest-schema`:
//!
//! ```text
//! Registry (Arc, read-only)
//!  │
//!  └── World
//!       ├── WorldConfig (seed, worker threads, log filter)
//!       ├── ResourceNode[] (one lock each)
//!       └── HarvestSink ← every harvest event, exactly once
//! ```
//!
//! - [`World`]: spawns nodes, routes damage and picks, delivers harvests
//! - [`WorldConfig`]: per-instance seeding and parallelism
//! - [`init_tracing`]: optional `tracing-subscriber` setup for binaries and tests

mod config;
mod error;
mod logging;
mod world;

pub use config::{hash_seed, max_cores, WorldConfig, DEFAULT_GLOBAL_SEED};
pub use error::{Error, Result};
pub use logging::{init_tracing, init_tracing_default, LogLevel};
pub use world::World;
