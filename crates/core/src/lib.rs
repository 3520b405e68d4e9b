//! genprover core data models.
//!
//! This crate defines the genotype, agent and proof-attempt structures that
//! the evolutionary engine works on, plus the seam proving strategies plug
//! into.

#![warn(missing_docs)]

// Core identities
mod id;
mod error;

// Genetic model
mod genotype;
mod agent;
mod strategy;

// Proving
mod proof;

// Population-level records
mod config;
mod stats;
mod checkpoint;

// Re-exports
pub use id::*;
pub use error::{CoreError, Result, StrategyError};

pub use genotype::{
    Gene, Genotype, GenotypeRecord, GeneticTrait,
    DEFAULT_MUTATION_PROBABILITY_RANGE, DEFAULT_TRAIT_VALUE, TRAIT_COUNT,
};
pub use agent::{Agent, AgentRecord, FitnessSample};
pub use strategy::ProofStrategy;

pub use proof::{
    ProofAttempt, ProofStep, ResourceUsage, StrategyOutcome, TheoremSpec,
    COMPUTATION_BASELINE, MEMORY_BASELINE,
};

pub use config::PopulationConfig;
pub use stats::{PopulationStats, StatsSummary, TraitDistribution};
pub use checkpoint::{Checkpoint, CHECKPOINT_FORMAT_VERSION};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
