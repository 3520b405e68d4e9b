//! Decomposition strategy: split the theorem into subgoals and prove each.

use genprover_core::{
    GeneticTrait, Genotype, ProofStep, ProofStrategy, ResourceUsage, StrategyError, StrategyOutcome,
    TheoremSpec,
};
use rand::{Rng, RngCore};

use crate::{chance, seed_trait};

/// Coefficients of [`DecompositionStrategy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecompositionWeights {
    /// Constant term of the per-subgoal success probability
    pub subgoal_base: f64,
    /// Weight of decomposition depth in the per-subgoal probability
    pub subgoal_depth: f64,
    /// Fraction of proved subgoals that must be exceeded for success
    pub success_threshold: f64,
}

impl Default for DecompositionWeights {
    fn default() -> Self {
        Self {
            subgoal_base: 0.7,
            subgoal_depth: 0.2,
            success_threshold: 0.7,
        }
    }
}

/// Breaks a theorem into `2 + floor(5 * depth)` subgoals.
#[derive(Debug, Clone, Default)]
pub struct DecompositionStrategy {
    weights: DecompositionWeights,
}

impl DecompositionStrategy {
    /// Strategy with default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategy with custom weights.
    pub fn with_weights(weights: DecompositionWeights) -> Self {
        Self { weights }
    }

    /// Number of subgoals a genotype splits into.
    pub fn subgoal_count(genotype: &Genotype) -> usize {
        2 + (5.0 * genotype.value(GeneticTrait::DecompositionDepth)) as usize
    }
}

impl ProofStrategy for DecompositionStrategy {
    fn name(&self) -> &str {
        "decomposition"
    }

    fn seed_genotype(&self, genotype: &mut Genotype, rng: &mut dyn RngCore) {
        seed_trait(genotype, GeneticTrait::DecompositionDepth, 0.6, 0.4, rng);
        seed_trait(genotype, GeneticTrait::ExplorationTendency, 0.5, 0.5, rng);
        seed_trait(genotype, GeneticTrait::FormalStrictness, 0.4, 0.3, rng);
    }

    fn attempt(
        &self,
        _theorem: &TheoremSpec,
        genotype: &Genotype,
        rng: &mut dyn RngCore,
    ) -> Result<StrategyOutcome, StrategyError> {
        let depth = genotype.value(GeneticTrait::DecompositionDepth);
        let subgoals = Self::subgoal_count(genotype);

        let mut steps = Vec::with_capacity(subgoals + 2);
        steps.push(ProofStep::new(
            1,
            format!("Decompose theorem into {} subgoals", subgoals),
            format!("Identified {} subgoals", subgoals),
            0.7 + 0.3 * depth,
        ));

        let p = self.weights.subgoal_base + self.weights.subgoal_depth * depth;
        let mut proved = 0usize;
        for i in 0..subgoals {
            let ok = chance(rng, p);
            if ok {
                proved += 1;
            }
            steps.push(ProofStep::new(
                steps.len() as u32 + 1,
                format!("Prove subgoal {}", i + 1),
                if ok { "Subgoal proved" } else { "Subgoal not proved" },
                0.6 + 0.4 * rng.gen::<f64>(),
            ));
        }

        let fraction = proved as f64 / subgoals as f64;
        steps.push(ProofStep::new(
            steps.len() as u32 + 1,
            "Combine subgoal proofs",
            format!("Proved {}/{} subgoals", proved, subgoals),
            0.5 + 0.5 * fraction,
        ));

        let n = subgoals as f64;
        Ok(StrategyOutcome {
            steps,
            success: fraction > self.weights.success_threshold,
            resources_used: ResourceUsage::new(100.0 + 50.0 * n, 80.0 + 30.0 * n),
            verification_result: None,
        })
    }
}
