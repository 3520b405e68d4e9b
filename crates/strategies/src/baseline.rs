//! Generic strategy used when no specialization applies.

use genprover_core::{
    GeneticTrait, Genotype, ProofStep, ProofStrategy, ResourceUsage, StrategyError, StrategyOutcome,
    TheoremSpec,
};
use rand::RngCore;

use crate::chance;

/// Success-probability coefficients of [`BaselineStrategy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineWeights {
    /// Constant term
    pub base: f64,
    /// Weight of formal strictness
    pub strictness: f64,
    /// Weight of how close decomposition depth is to 0.5
    pub balanced_depth: f64,
}

impl Default for BaselineWeights {
    fn default() -> Self {
        Self {
            base: 0.3,
            strictness: 0.4,
            balanced_depth: 0.3,
        }
    }
}

/// A three-step proof whose odds depend on strictness and a balanced
/// decomposition depth.
#[derive(Debug, Clone, Default)]
pub struct BaselineStrategy {
    weights: BaselineWeights,
}

impl BaselineStrategy {
    /// Strategy with default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategy with custom weights.
    pub fn with_weights(weights: BaselineWeights) -> Self {
        Self { weights }
    }

    /// Probability of success for a genotype.
    pub fn success_probability(&self, genotype: &Genotype) -> f64 {
        let depth = genotype.value(GeneticTrait::DecompositionDepth);
        let strictness = genotype.value(GeneticTrait::FormalStrictness);
        self.weights.base
            + self.weights.strictness * strictness
            + self.weights.balanced_depth * (1.0 - (0.5 - depth).abs())
    }
}

impl ProofStrategy for BaselineStrategy {
    fn name(&self) -> &str {
        "baseline"
    }

    fn attempt(
        &self,
        _theorem: &TheoremSpec,
        genotype: &Genotype,
        rng: &mut dyn RngCore,
    ) -> Result<StrategyOutcome, StrategyError> {
        let depth = genotype.value(GeneticTrait::DecompositionDepth);
        let strictness = genotype.value(GeneticTrait::FormalStrictness);

        let steps = vec![
            ProofStep::new(1, "Initial formalization", "Formalized theorem", 0.8),
            ProofStep::new(2, "Applied relevant axioms", "Intermediate result", 0.7),
            ProofStep::new(3, "Completed proof by induction", "Theorem proved", 0.7),
        ];

        let success = chance(rng, self.success_probability(genotype));

        Ok(StrategyOutcome {
            steps,
            success,
            resources_used: ResourceUsage::new(100.0 + 200.0 * depth, 50.0 + 100.0 * strictness),
            verification_result: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::flat_genotype;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_success_probability_coefficients() {
        let strategy = BaselineStrategy::new();
        // 0.3 + 0.4 * 0.5 + 0.3 * 1.0
        assert!((strategy.success_probability(&flat_genotype(0.5)) - 0.8).abs() < 1e-12);
        // 0.3 + 0.0 + 0.3 * 0.5
        assert!((strategy.success_probability(&flat_genotype(0.0)) - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_attempt_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let outcome = BaselineStrategy::new()
            .attempt(&TheoremSpec::new("t"), &flat_genotype(1.0), &mut rng)
            .unwrap();
        assert_eq!(outcome.steps.len(), 3);
        assert_eq!(outcome.resources_used, ResourceUsage::new(300.0, 150.0));
    }

    #[test]
    fn test_certain_failure_with_zero_weights() {
        let strategy = BaselineStrategy::with_weights(BaselineWeights {
            base: 0.0,
            strictness: 0.0,
            balanced_depth: 0.0,
        });
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..50 {
            let outcome = strategy.attempt(&TheoremSpec::new("t"), &flat_genotype(0.5), &mut rng).unwrap();
            assert!(!outcome.success);
        }
    }
}
