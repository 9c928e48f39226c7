//! Error types for the storage layer.
//!
//! All errors are propagated via [`StoreError`], which wraps the underlying
//! [`sqlx`] error with additional context about configuration problems.
//! "Not found" is never an error in this layer: missing keys are expressed
//! as `Option::None` or as silent no-ops per the [`crate::TagStore`]
//! contract.

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database operation failed (connectivity, constraint violation,
    /// or a fault inside the backing engine).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A configuration value was unusable (bad URL, invalid table name).
    #[error("storage configuration error: {0}")]
    Config(String),
}
