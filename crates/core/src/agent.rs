//! Agent model - a genotype plus its proving record.

use std::ops::RangeInclusive;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CoreError;
use crate::genotype::Genotype;
use crate::id::AgentId;
use crate::proof::{ProofAttempt, TheoremSpec, COMPUTATION_BASELINE, MEMORY_BASELINE};
use crate::strategy::ProofStrategy;
use crate::Time;

/// A fitness value and when it was computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessSample {
    /// When the fitness was computed
    pub timestamp: Time,

    /// Fitness in [0, 1]
    pub fitness: f64,
}

/// A genetic theorem-proving agent.
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    genotype: Genotype,
    specialization: Option<String>,
    fitness_history: Vec<FitnessSample>,
    proof_attempts: Vec<ProofAttempt>,
    proof_successes: usize,
    total_attempts: usize,
    attempts_at_last_fitness: usize,
    generation: u32,
    parent_ids: Vec<AgentId>,
    creation_time: Time,
}

impl Agent {
    /// Create a generation-0 agent.
    pub fn new(genotype: Genotype, specialization: Option<String>) -> Self {
        Self {
            id: AgentId::new(),
            genotype,
            specialization,
            fitness_history: Vec::new(),
            proof_attempts: Vec::new(),
            proof_successes: 0,
            total_attempts: 0,
            attempts_at_last_fitness: 0,
            generation: 0,
            parent_ids: Vec::new(),
            creation_time: chrono::Utc::now(),
        }
    }

    /// Create a generation-0 agent with a random genotype.
    ///
    /// Mutation probabilities are drawn from `mutation_probabilities`.
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        specialization: Option<String>,
        mutation_probabilities: RangeInclusive<f64>,
    ) -> Self {
        Self::new(Genotype::random_in(rng, mutation_probabilities), specialization)
    }

    /// Create a child of two parents.
    ///
    /// The child's generation is one past the older parent's.
    pub fn child(genotype: Genotype, specialization: Option<String>, parent1: &Agent, parent2: &Agent) -> Self {
        let mut child = Self::new(genotype, specialization);
        child.generation = parent1.generation.max(parent2.generation) + 1;
        child.parent_ids = vec![parent1.id.clone(), parent2.id.clone()];
        child
    }

    /// Attempt a theorem with the given strategy and record the result.
    ///
    /// A strategy that errors, panics, or reports negative or non-finite
    /// figures yields a failed attempt; the call itself never fails.
    pub fn prove(
        &mut self,
        theorem: &TheoremSpec,
        strategy: &dyn ProofStrategy,
        rng: &mut dyn RngCore,
    ) -> &ProofAttempt {
        let started = Instant::now();
        let genotype = &self.genotype;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy.attempt(theorem, genotype, rng)));
        let elapsed = started.elapsed().as_secs_f64();

        let attempt = match outcome {
            Ok(Ok(outcome)) => match outcome.check() {
                Ok(()) => ProofAttempt::from_outcome(theorem.theorem_id.clone(), outcome, elapsed),
                Err(reason) => {
                    warn!(agent = %self.id, theorem = %theorem.theorem_id, strategy = strategy.name(), "Proof strategy returned a malformed outcome: {}", reason);
                    ProofAttempt::failed(theorem.theorem_id.clone(), reason, elapsed)
                }
            },
            Ok(Err(e)) => {
                warn!(agent = %self.id, theorem = %theorem.theorem_id, strategy = strategy.name(), "Proof strategy failed: {}", e);
                ProofAttempt::failed(theorem.theorem_id.clone(), e.to_string(), elapsed)
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                warn!(agent = %self.id, theorem = %theorem.theorem_id, strategy = strategy.name(), "Proof strategy panicked: {}", reason);
                ProofAttempt::failed(theorem.theorem_id.clone(), reason, elapsed)
            }
        };

        self.record_attempt(attempt);
        &self.proof_attempts[self.proof_attempts.len() - 1]
    }

    /// Append an attempt produced elsewhere.
    pub fn record_attempt(&mut self, attempt: ProofAttempt) {
        self.total_attempts += 1;
        if attempt.success {
            self.proof_successes += 1;
        }
        self.proof_attempts.push(attempt);
    }

    /// Fitness of the recorded attempts, without touching the history.
    ///
    /// `0.6 * success_rate + 0.3 * avg_efficiency + 0.1 * resource_efficiency`,
    /// or 0.0 when nothing has been attempted yet.
    pub fn calculate_fitness(&self) -> f64 {
        if self.proof_attempts.is_empty() {
            return 0.0;
        }
        let total = self.proof_attempts.len() as f64;

        let successful: Vec<&ProofAttempt> = self.proof_attempts.iter().filter(|a| a.success).collect();
        let success_rate = successful.len() as f64 / total;

        let avg_efficiency = if successful.is_empty() {
            0.0
        } else {
            successful.iter().map(|a| a.efficiency()).sum::<f64>() / successful.len() as f64
        };

        let avg_memory = self.proof_attempts.iter().map(|a| a.resources_used.memory).sum::<f64>() / total;
        let avg_computation = self.proof_attempts.iter().map(|a| a.resources_used.computation).sum::<f64>() / total;
        let memory_efficiency = 1.0 / (1.0 + avg_memory / MEMORY_BASELINE);
        let computation_efficiency = 1.0 / (1.0 + avg_computation / COMPUTATION_BASELINE);
        let resource_efficiency = 0.5 * memory_efficiency + 0.5 * computation_efficiency;

        0.6 * success_rate + 0.3 * avg_efficiency + 0.1 * resource_efficiency
    }

    /// Compute fitness and append it to the history.
    ///
    /// Nothing is appended while the agent has no attempts.
    pub fn fitness(&mut self) -> f64 {
        let fitness = self.calculate_fitness();
        if !self.proof_attempts.is_empty() {
            self.fitness_history.push(FitnessSample {
                timestamp: chrono::Utc::now(),
                fitness,
            });
            self.attempts_at_last_fitness = self.proof_attempts.len();
        }
        fitness
    }

    /// Most recent recorded fitness, or 0.0.
    pub fn latest_fitness(&self) -> f64 {
        self.fitness_history.last().map(|s| s.fitness).unwrap_or(0.0)
    }

    /// Whether the recorded fitness is missing, stale, or predates new attempts.
    pub fn needs_fitness_refresh(&self, max_age: chrono::Duration) -> bool {
        let Some(last) = self.fitness_history.last() else {
            return true;
        };
        self.proof_attempts.len() != self.attempts_at_last_fitness
            || chrono::Utc::now() - last.timestamp > max_age
    }

    /// Lifetime success rate, including attempts made before a restore.
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            self.proof_successes as f64 / self.total_attempts as f64
        }
    }

    /// Identifier.
    pub fn id(&self) -> &AgentId {
        &self.id
    }

    /// Genotype.
    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    /// Specialization tag, if any.
    pub fn specialization(&self) -> Option<&str> {
        self.specialization.as_deref()
    }

    /// Fitness history, oldest first.
    pub fn fitness_history(&self) -> &[FitnessSample] {
        &self.fitness_history
    }

    /// Attempts recorded since creation or restore, oldest first.
    pub fn proof_attempts(&self) -> &[ProofAttempt] {
        &self.proof_attempts
    }

    /// Lifetime number of successful attempts.
    pub fn proof_successes(&self) -> usize {
        self.proof_successes
    }

    /// Lifetime number of attempts.
    pub fn total_attempts(&self) -> usize {
        self.total_attempts
    }

    /// Generation the agent was born in.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Parents, empty for generation-0 agents.
    pub fn parent_ids(&self) -> &[AgentId] {
        &self.parent_ids
    }

    /// When the agent was created.
    pub fn creation_time(&self) -> Time {
        self.creation_time
    }

    /// Serializable snapshot of the agent. Proof attempts are not included.
    pub fn to_record(&self) -> AgentRecord {
        AgentRecord {
            agent_id: self.id.clone(),
            specialization: self.specialization.clone(),
            genotype: self.genotype.clone(),
            fitness_history: self.fitness_history.clone(),
            proof_successes: self.proof_successes,
            total_attempts: self.total_attempts,
            creation_time: self.creation_time,
            generation: self.generation,
            parent_ids: self.parent_ids.clone(),
        }
    }

    /// Rebuild an agent from a snapshot, with an empty attempt list.
    pub fn from_record(record: AgentRecord) -> Result<Self, CoreError> {
        record.validate()?;

        Ok(Self {
            id: record.agent_id,
            genotype: record.genotype,
            specialization: record.specialization,
            fitness_history: record.fitness_history,
            proof_attempts: Vec::new(),
            proof_successes: record.proof_successes,
            total_attempts: record.total_attempts,
            attempts_at_last_fitness: 0,
            generation: record.generation,
            parent_ids: record.parent_ids,
            creation_time: record.creation_time,
        })
    }
}

/// Serialized form of an [`Agent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Identifier
    pub agent_id: AgentId,

    /// Specialization tag
    pub specialization: Option<String>,

    /// Genotype
    pub genotype: Genotype,

    /// Fitness history
    pub fitness_history: Vec<FitnessSample>,

    /// Lifetime successes
    pub proof_successes: usize,

    /// Lifetime attempts
    pub total_attempts: usize,

    /// When created
    pub creation_time: Time,

    /// Birth generation
    pub generation: u32,

    /// Parents
    pub parent_ids: Vec<AgentId>,
}

impl AgentRecord {
    /// Check counters, lineage and fitness history.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.proof_successes > self.total_attempts {
            return Err(CoreError::validation(format!(
                "agent {} has {} successes out of {} attempts",
                self.agent_id, self.proof_successes, self.total_attempts
            )));
        }
        if self.parent_ids.len() > 2 {
            return Err(CoreError::validation(format!(
                "agent {} lists {} parents",
                self.agent_id,
                self.parent_ids.len()
            )));
        }
        if let Some(bad) = self
            .fitness_history
            .iter()
            .find(|s| !s.fitness.is_finite() || !(0.0..=1.0).contains(&s.fitness))
        {
            return Err(CoreError::validation(format!(
                "agent {} has out-of-range fitness {}",
                self.agent_id, bad.fitness
            )));
        }
        Ok(())
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "strategy panicked".to_string()
    }
}
