//! Shared type definitions for the blocktag exploit patch.
//!
//! This crate is the single source of truth for the value types used across
//! the blocktag workspace. Everything here is an immutable record with
//! derived value equality; there is no behavior beyond construction,
//! accessors, and a handful of pure computations (location offsets).
//!
//! # Modules
//!
//! - [`location`] -- [`BlockLocation`] (the tag primary key) and [`Vector`]
//! - [`block`] -- [`Material`] identifiers and the [`Block`] value
//! - [`tag`] -- the persisted [`Tag`] record
//! - [`movement`] -- batch-move command objects for physics displacement
//! - [`enums`] -- [`RestrictionMode`] and [`ActionKind`]

pub mod block;
pub mod enums;
pub mod location;
pub mod movement;
pub mod tag;

// Re-export all public types at crate root for convenience.
pub use block::{Block, Material};
pub use enums::{ActionKind, RestrictionMode};
pub use location::{BlockLocation, Vector};
pub use movement::{OldNewLocationPair, OldNewLocationPairSet};
pub use tag::Tag;
