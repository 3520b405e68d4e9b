//! Checkpoint store abstraction.

use async_trait::async_trait;
use genprover_core::{Checkpoint, CoreError};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot content failed validation
    #[error("Invalid checkpoint: {0}")]
    Validation(#[from] CoreError),

    /// Document is not a checkpoint
    #[error("Malformed checkpoint: {0}")]
    Format(String),

    /// Written by an incompatible build
    #[error("Unsupported checkpoint version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the document
        found: u64,
        /// Version this build reads
        expected: u32,
    },

    /// Checkpoint not found
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Persistent store for population checkpoints.
///
/// Checkpoints are addressed by name; a store decides how names map to its
/// backing medium.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Save a checkpoint and return the name it was stored under.
    async fn save(&self, checkpoint: &Checkpoint) -> Result<String>;

    /// Load a checkpoint by name.
    async fn load(&self, name: &str) -> Result<Checkpoint>;

    /// Names of stored checkpoints, oldest generation first.
    async fn list(&self) -> Result<Vec<String>>;

    /// The most recent checkpoint, if any.
    async fn latest(&self) -> Result<Option<Checkpoint>> {
        match self.list().await?.last() {
            Some(name) => self.load(name).await.map(Some),
            None => Ok(None),
        }
    }
}
