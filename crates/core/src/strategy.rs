//! The pluggable proving seam.

use rand::RngCore;

use crate::error::StrategyError;
use crate::genotype::Genotype;
use crate::proof::{StrategyOutcome, TheoremSpec};

/// How an agent of a given specialization goes about proving a theorem.
///
/// Implementations read the agent's genotype, draw every random decision
/// from the supplied `rng`, and return exactly one outcome per call.
pub trait ProofStrategy: Send + Sync {
    /// Specialization tag this strategy serves.
    fn name(&self) -> &str;

    /// Bias a freshly sampled genotype toward this specialization.
    fn seed_genotype(&self, _genotype: &mut Genotype, _rng: &mut dyn RngCore) {}

    /// Attempt a theorem.
    fn attempt(
        &self,
        theorem: &TheoremSpec,
        genotype: &Genotype,
        rng: &mut dyn RngCore,
    ) -> Result<StrategyOutcome, StrategyError>;
}
