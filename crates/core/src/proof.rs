//! Proof attempt model - what an agent produced for one theorem.

use serde::{Deserialize, Serialize};

/// Memory usage (MB) treated as a typical attempt.
pub const MEMORY_BASELINE: f64 = 500.0;

/// Computation units treated as a typical attempt.
pub const COMPUTATION_BASELINE: f64 = 100.0;

/// A theorem to prove, as supplied by an external repository.
///
/// Only `theorem_id` is interpreted here; every other field is carried
/// opaquely for the proving strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheoremSpec {
    /// Unique theorem identifier
    pub theorem_id: String,

    /// Domain-specific fields
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl TheoremSpec {
    /// Create a theorem spec with no extra fields.
    pub fn new(theorem_id: impl Into<String>) -> Self {
        Self {
            theorem_id: theorem_id.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Attach a domain-specific field.
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Read a domain-specific field.
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }
}

/// One step of a proof attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofStep {
    /// 1-based position in the attempt
    pub step: u32,

    /// What the step did
    pub description: String,

    /// What the step produced
    pub result: String,

    /// Strategy's confidence in the step
    pub confidence: f64,
}

impl ProofStep {
    /// Create a step.
    pub fn new(step: u32, description: impl Into<String>, result: impl Into<String>, confidence: f64) -> Self {
        Self {
            step,
            description: description.into(),
            result: result.into(),
            confidence,
        }
    }
}

/// Resources consumed by an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// Memory (MB)
    pub memory: f64,

    /// Computation (arbitrary units)
    pub computation: f64,
}

impl ResourceUsage {
    /// Create a usage record.
    pub fn new(memory: f64, computation: f64) -> Self {
        Self { memory, computation }
    }

    /// Usage exactly at the normalization baselines.
    pub fn baseline() -> Self {
        Self::new(MEMORY_BASELINE, COMPUTATION_BASELINE)
    }
}

/// What a strategy hands back before timing is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutcome {
    /// Steps taken
    pub steps: Vec<ProofStep>,

    /// Whether the theorem was proved
    pub success: bool,

    /// Estimated resource usage
    pub resources_used: ResourceUsage,

    /// Optional verification details
    pub verification_result: Option<serde_json::Value>,
}

impl StrategyOutcome {
    /// Reject resource figures that are negative or non-finite and steps
    /// with a non-finite confidence.
    pub fn check(&self) -> Result<(), String> {
        let ResourceUsage { memory, computation } = self.resources_used;
        if !(memory.is_finite() && memory >= 0.0 && computation.is_finite() && computation >= 0.0) {
            return Err(format!(
                "invalid resource usage (memory {}, computation {})",
                memory, computation
            ));
        }
        if let Some(step) = self.steps.iter().find(|s| !s.confidence.is_finite()) {
            return Err(format!("step {} has confidence {}", step.step, step.confidence));
        }
        Ok(())
    }
}

/// A single recorded proof attempt. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofAttempt {
    /// Theorem that was attempted
    pub theorem_id: String,

    /// Steps taken
    pub steps: Vec<ProofStep>,

    /// Whether the theorem was proved
    pub success: bool,

    /// Resources used
    pub resources_used: ResourceUsage,

    /// Wall-clock seconds spent
    pub time_taken: f64,

    /// Optional verification details
    pub verification_result: Option<serde_json::Value>,
}

impl ProofAttempt {
    /// Attach a theorem id and timing to a strategy outcome.
    pub fn from_outcome(theorem_id: impl Into<String>, outcome: StrategyOutcome, time_taken: f64) -> Self {
        Self {
            theorem_id: theorem_id.into(),
            steps: outcome.steps,
            success: outcome.success,
            resources_used: outcome.resources_used,
            time_taken,
            verification_result: outcome.verification_result,
        }
    }

    /// A failed attempt standing in for a strategy that errored.
    pub fn failed(theorem_id: impl Into<String>, reason: impl Into<String>, time_taken: f64) -> Self {
        Self {
            theorem_id: theorem_id.into(),
            steps: Vec::new(),
            success: false,
            resources_used: ResourceUsage::baseline(),
            time_taken,
            verification_result: Some(serde_json::json!({ "error": reason.into() })),
        }
    }

    /// Step efficiency, `1 / (1 + steps/10)`.
    pub fn step_efficiency(&self) -> f64 {
        1.0 / (1.0 + self.steps.len() as f64 / 10.0)
    }

    /// Time efficiency, `1 / (1 + time_taken/5)`.
    pub fn time_efficiency(&self) -> f64 {
        1.0 / (1.0 + self.time_taken / 5.0)
    }

    /// Efficiency of the attempt in (0, 1]; zero for failed attempts.
    pub fn efficiency(&self) -> f64 {
        if !self.success {
            return 0.0;
        }
        0.7 * self.step_efficiency() + 0.3 * self.time_efficiency()
    }
}
