//! Errors raised by the evolution layer.

use std::time::Duration;

use genprover_core::CoreError;
use genprover_storage::StorageError;

/// Result alias for evolution operations.
pub type Result<T> = std::result::Result<T, EvolutionError>;

/// Errors that can occur while evolving or persisting a population.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    /// Invalid configuration, genotype or broken invariant
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Checkpoint persistence failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// `save_checkpoint` was called without a store
    #[error("No checkpoint store configured")]
    NoCheckpointStore,

    /// A checkpoint write did not finish in time
    #[error("Checkpoint save timed out after {0:?}")]
    CheckpointTimeout(Duration),
}
