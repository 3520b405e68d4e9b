//! Population configuration.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Configuration for a population of prover agents.
///
/// The four core options are required on the wire; the rest fall back to
/// their defaults when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of agents per generation
    pub population_size: usize,

    /// Share of top agents carried over unchanged
    pub elite_percentage: f64,

    /// Mutation strength applied to bred children
    pub mutation_rate: f64,

    /// Cut points used by crossover
    pub crossover_points: usize,

    /// Agents sampled per tournament
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,

    /// Specialization tags assigned round-robin at initialization
    #[serde(default)]
    pub specializations: Option<Vec<String>>,

    /// Generations between automatic checkpoints (None disables them)
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: Option<u32>,

    /// Range new genes draw their mutation probability from
    #[serde(default = "default_mutation_probability_range")]
    pub mutation_probability_range: [f64; 2],

    /// Age after which a recorded fitness is recomputed
    #[serde(default = "default_fitness_max_age_secs")]
    pub fitness_max_age_secs: u64,

    /// Upper bound on a single checkpoint write
    #[serde(default = "default_checkpoint_timeout_secs")]
    pub checkpoint_timeout_secs: u64,
}

fn default_tournament_size() -> usize {
    3
}

fn default_checkpoint_interval() -> Option<u32> {
    Some(10)
}

fn default_mutation_probability_range() -> [f64; 2] {
    [0.05, 0.15]
}

fn default_fitness_max_age_secs() -> u64 {
    60
}

fn default_checkpoint_timeout_secs() -> u64 {
    30
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            elite_percentage: 0.1,
            mutation_rate: 0.1,
            crossover_points: 2,
            tournament_size: default_tournament_size(),
            specializations: None,
            checkpoint_interval: default_checkpoint_interval(),
            mutation_probability_range: default_mutation_probability_range(),
            fitness_max_age_secs: default_fitness_max_age_secs(),
            checkpoint_timeout_secs: default_checkpoint_timeout_secs(),
        }
    }
}

impl PopulationConfig {
    /// Check every option against its allowed range.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.population_size == 0 {
            return Err(CoreError::validation("population_size must be greater than 0"));
        }
        check_unit("elite_percentage", self.elite_percentage)?;
        check_unit("mutation_rate", self.mutation_rate)?;
        if self.crossover_points == 0 {
            return Err(CoreError::validation("crossover_points must be at least 1"));
        }
        if self.tournament_size == 0 {
            return Err(CoreError::validation("tournament_size must be at least 1"));
        }
        if let Some(specs) = &self.specializations {
            if specs.iter().any(|s| s.trim().is_empty()) {
                return Err(CoreError::validation("specializations must not contain empty tags"));
            }
        }
        if self.checkpoint_interval == Some(0) {
            return Err(CoreError::validation("checkpoint_interval must be at least 1"));
        }
        let [lo, hi] = self.mutation_probability_range;
        check_unit("mutation_probability_range", lo)?;
        check_unit("mutation_probability_range", hi)?;
        if lo > hi {
            return Err(CoreError::validation(format!(
                "mutation_probability_range is inverted: [{}, {}]",
                lo, hi
            )));
        }
        Ok(())
    }

    /// Number of elites for a population of `size` at `percentage`.
    ///
    /// At least one agent is always kept, and never more than the population.
    pub fn elite_count_for(size: usize, percentage: f64) -> usize {
        if size == 0 {
            return 0;
        }
        let raw = (size as f64 * percentage).floor() as usize;
        raw.clamp(1, size)
    }

    /// Elite count under this configuration.
    pub fn elite_count(&self) -> usize {
        Self::elite_count_for(self.population_size, self.elite_percentage)
    }

    /// Mutation-probability range as an inclusive range.
    pub fn mutation_probability_bounds(&self) -> std::ops::RangeInclusive<f64> {
        self.mutation_probability_range[0]..=self.mutation_probability_range[1]
    }

    /// Fitness staleness threshold.
    pub fn fitness_max_age(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.fitness_max_age_secs as i64)
    }

    /// Checkpoint write timeout.
    pub fn checkpoint_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.checkpoint_timeout_secs)
    }
}

fn check_unit(name: &str, x: f64) -> Result<(), CoreError> {
    if x.is_finite() && (0.0..=1.0).contains(&x) {
        Ok(())
    } else {
        Err(CoreError::validation(format!("{} must be within [0, 1], got {}", name, x)))
    }
}
