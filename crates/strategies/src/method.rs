//! Proof-method strategy: commit to one classic method, fall back to another.

use genprover_core::{
    GeneticTrait, Genotype, ProofStep, ProofStrategy, ResourceUsage, StrategyError, StrategyOutcome,
    TheoremSpec,
};
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::{chance, seed_trait};

/// Proof methods in preference order.
pub const PROOF_METHODS: [&str; 6] = [
    "direct",
    "induction",
    "contradiction",
    "contrapositive",
    "construction",
    "optimization",
];

/// Coefficients of [`MethodStrategy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodWeights {
    /// Constant term of the primary method's success probability
    pub primary_base: f64,
    /// Weight of method preference for the primary method
    pub primary_preference: f64,
    /// Constant term of the alternative method's success probability
    pub alternative_base: f64,
    /// Weight of exploration for the alternative method
    pub alternative_exploration: f64,
}

impl Default for MethodWeights {
    fn default() -> Self {
        Self {
            primary_base: 0.5,
            primary_preference: 0.5,
            alternative_base: 0.3,
            alternative_exploration: 0.7,
        }
    }
}

/// Picks a proof method from the method-preference gene.
#[derive(Debug, Clone, Default)]
pub struct MethodStrategy {
    weights: MethodWeights,
}

impl MethodStrategy {
    /// Strategy with default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategy with custom weights.
    pub fn with_weights(weights: MethodWeights) -> Self {
        Self { weights }
    }

    /// Index into [`PROOF_METHODS`] a genotype prefers.
    pub fn method_index(genotype: &Genotype) -> usize {
        let preference = genotype.value(GeneticTrait::ProofMethodPreference);
        ((preference * PROOF_METHODS.len() as f64) as usize).min(PROOF_METHODS.len() - 1)
    }
}

impl ProofStrategy for MethodStrategy {
    fn name(&self) -> &str {
        "proof_strategy"
    }

    fn seed_genotype(&self, genotype: &mut Genotype, rng: &mut dyn RngCore) {
        seed_trait(genotype, GeneticTrait::ProofMethodPreference, 0.6, 0.4, rng);
        seed_trait(genotype, GeneticTrait::ExplorationTendency, 0.4, 0.4, rng);
        seed_trait(genotype, GeneticTrait::ResourceAllocation, 0.4, 0.2, rng);
    }

    fn attempt(
        &self,
        _theorem: &TheoremSpec,
        genotype: &Genotype,
        rng: &mut dyn RngCore,
    ) -> Result<StrategyOutcome, StrategyError> {
        let preference = genotype.value(GeneticTrait::ProofMethodPreference);
        let exploration = genotype.value(GeneticTrait::ExplorationTendency);
        let index = Self::method_index(genotype);
        let method = PROOF_METHODS[index];

        let try_alternatives = chance(rng, exploration);

        let mut steps = vec![
            ProofStep::new(
                1,
                "Analyze theorem structure",
                "Structure analyzed",
                0.7 + 0.3 * preference,
            ),
            ProofStep::new(
                2,
                format!("Select proof method: {}", method),
                format!("Selected {}", method),
                0.6 + 0.4 * preference,
            ),
        ];

        let primary = chance(
            rng,
            self.weights.primary_base + self.weights.primary_preference * preference,
        );

        let success = if !primary && try_alternatives {
            let alternatives: Vec<&str> = PROOF_METHODS.iter().copied().filter(|m| *m != method).collect();
            let alternative = alternatives.choose(&mut *rng).copied().unwrap_or(method);
            steps.push(ProofStep::new(
                3,
                format!("Attempt proof by {}", method),
                format!("{} approach failed", method),
                0.4,
            ));
            let ok = chance(
                rng,
                self.weights.alternative_base + self.weights.alternative_exploration * exploration,
            );
            steps.push(ProofStep::new(
                4,
                format!("Switch to alternative method: {}", alternative),
                if ok {
                    format!("Proved by {}", alternative)
                } else {
                    format!("{} approach failed", alternative)
                },
                if ok { 0.7 } else { 0.3 },
            ));
            ok
        } else {
            steps.push(ProofStep::new(
                3,
                format!("Attempt proof by {}", method),
                if primary {
                    format!("Proved by {}", method)
                } else {
                    format!("{} approach failed", method)
                },
                if primary { 0.8 } else { 0.4 },
            ));
            primary
        };

        let factor = 0.5 + 0.5 * index as f64 / 5.0;
        Ok(StrategyOutcome {
            steps,
            success,
            resources_used: ResourceUsage::new(70.0 + 130.0 * factor, 50.0 + 100.0 * factor),
            verification_result: None,
        })
    }
}
