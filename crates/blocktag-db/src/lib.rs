//! Tag storage backends for the blocktag exploit patch.
//!
//! The engine talks to storage exclusively through the [`TagStore`] trait:
//! an async key-value contract keyed by [`blocktag_types::BlockLocation`].
//! Which backend sits behind the trait is a deployment decision:
//!
//! ```text
//! PatchEngine
//!     |
//!     +-- dyn TagStore
//!         |-- MemoryTagStore  (reference implementation, unit tests)
//!         |-- SqliteTagStore  (file-based single-writer database)
//!         +-- MySqlTagStore   (networked DBMS via pooled connections)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- the [`TagStore`] boundary trait
//! - [`memory`] -- in-memory reference implementation
//! - [`sqlite`] -- `SQLite`-backed implementation
//! - [`mysql`] -- `MySQL`-backed implementation
//! - [`config`] -- connection pool and table configuration
//! - [`error`] -- shared error types

pub mod config;
pub mod error;
pub mod memory;
pub mod mysql;
pub mod sqlite;
pub mod store;

// Re-export primary types for convenience.
pub use config::DatabaseConfig;
pub use error::StoreError;
pub use memory::MemoryTagStore;
pub use mysql::MySqlTagStore;
pub use sqlite::SqliteTagStore;
pub use store::TagStore;
