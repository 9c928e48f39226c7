//! Core logic of the blocktag exploit patch.
//!
//! A job-reward plugin pays players for placing and breaking blocks, which
//! invites an obvious exploit: place a block, break it, collect twice, and
//! repeat. This crate tracks which locations have already paid out
//! ("tags"), classifies later actions against those locations, and keeps
//! tags attached to their blocks when physics events move them in bulk.
//!
//! The game-event adapter calls into [`PatchEngine`]; the engine talks to
//! storage only through the [`blocktag_db::TagStore`] trait.
//!
//! # Modules
//!
//! - [`filter`] -- [`BlockRestrictionFilter`] and [`RestrictionPolicy`]
//! - [`time`] -- the injectable [`TimeSource`] abstraction
//! - [`engine`] -- the [`PatchEngine`] orchestrator
//! - [`config`] -- typed YAML configuration for the plugin

pub mod config;
pub mod engine;
pub mod filter;
pub mod time;

// Re-export primary types for convenience.
pub use config::{ConfigError, DatabaseKind, PluginConfig};
pub use engine::{EngineConfig, EngineError, PatchEngine};
pub use filter::{BlockRestrictionFilter, RestrictionPolicy};
pub use time::{FixedTimeSource, SystemTimeSource, TimeSource};
