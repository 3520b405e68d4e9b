//! Per-generation population statistics.

use serde::{Deserialize, Serialize};

use crate::genotype::GeneticTrait;
use crate::id::AgentId;
use crate::Time;

/// Mean and spread of one trait across the live population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitDistribution {
    /// Trait being described
    #[serde(rename = "trait")]
    pub trait_: GeneticTrait,

    /// Mean value
    pub mean: f64,

    /// Population standard deviation
    pub std_dev: f64,
}

/// Statistics for one generation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    /// Generation number
    pub generation: u32,

    /// When collected
    pub timestamp: Time,

    /// Live agents
    pub population_size: usize,

    /// Mean fitness
    pub avg_fitness: f64,

    /// Best fitness
    pub max_fitness: f64,

    /// Worst fitness
    pub min_fitness: f64,

    /// Median fitness
    pub median_fitness: f64,

    /// Mean lifetime success rate
    pub avg_success_rate: f64,

    /// Mean attempts per agent
    pub avg_proof_attempts: f64,

    /// One entry per trait, in registry order
    pub trait_distributions: Vec<TraitDistribution>,

    /// Elite agents of this generation, best first
    pub elite_agent_ids: Vec<AgentId>,
}

impl PopulationStats {
    /// Abbreviated form kept in checkpoints.
    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            generation: self.generation,
            timestamp: self.timestamp,
            avg_fitness: self.avg_fitness,
            max_fitness: self.max_fitness,
            min_fitness: self.min_fitness,
            avg_success_rate: self.avg_success_rate,
        }
    }

    /// Distribution of a single trait.
    pub fn trait_distribution(&self, trait_: GeneticTrait) -> Option<&TraitDistribution> {
        self.trait_distributions.iter().find(|d| d.trait_ == trait_)
    }
}

/// Abbreviated generation statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    /// Generation number
    pub generation: u32,

    /// When collected
    pub timestamp: Time,

    /// Mean fitness
    pub avg_fitness: f64,

    /// Best fitness
    pub max_fitness: f64,

    /// Worst fitness
    pub min_fitness: f64,

    /// Mean success rate
    pub avg_success_rate: f64,
}
