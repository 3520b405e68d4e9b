//! Checkpoint persistence for genprover populations.
//!
//! This crate provides a trait-based checkpoint store with a JSON file
//! implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;

pub use trait_::{CheckpointStore, StorageError, Result};
pub use json_storage::{read_checkpoint, write_checkpoint, JsonCheckpointStore};
