//! Axiom-centric strategy: formalize precisely, pick few axioms.

use genprover_core::{
    GeneticTrait, Genotype, ProofStep, ProofStrategy, ResourceUsage, StrategyError, StrategyOutcome,
    TheoremSpec,
};
use rand::RngCore;

use crate::{chance, seed_trait};

/// Success-probability coefficients of [`AxiomStrategy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxiomWeights {
    /// Constant term
    pub base: f64,
    /// Weight of formal strictness
    pub strictness: f64,
    /// Weight of axiom selection
    pub selection: f64,
}

impl Default for AxiomWeights {
    fn default() -> Self {
        Self {
            base: 0.3,
            strictness: 0.4,
            selection: 0.3,
        }
    }
}

/// Proves theorems from a minimal axiom set.
#[derive(Debug, Clone, Default)]
pub struct AxiomStrategy {
    weights: AxiomWeights,
}

impl AxiomStrategy {
    /// Strategy with default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategy with custom weights.
    pub fn with_weights(weights: AxiomWeights) -> Self {
        Self { weights }
    }
}

impl ProofStrategy for AxiomStrategy {
    fn name(&self) -> &str {
        "axiom"
    }

    fn seed_genotype(&self, genotype: &mut Genotype, rng: &mut dyn RngCore) {
        seed_trait(genotype, GeneticTrait::FormalStrictness, 0.7, 0.3, rng);
        seed_trait(genotype, GeneticTrait::AxiomSelection, 0.7, 0.3, rng);
        seed_trait(genotype, GeneticTrait::ExplorationTendency, 0.1, 0.3, rng);
    }

    fn attempt(
        &self,
        _theorem: &TheoremSpec,
        genotype: &Genotype,
        rng: &mut dyn RngCore,
    ) -> Result<StrategyOutcome, StrategyError> {
        let selection = genotype.value(GeneticTrait::AxiomSelection);
        let strictness = genotype.value(GeneticTrait::FormalStrictness);
        let axioms = 3 + (5.0 * (1.0 - selection)) as u32;

        let steps = vec![
            ProofStep::new(
                1,
                "Formalize theorem statement in precise logical notation",
                "Formalized theorem",
                0.8 + 0.2 * strictness,
            ),
            ProofStep::new(
                2,
                "Identify minimal set of relevant axioms",
                format!("Selected {} axioms", axioms),
                0.7 + 0.3 * selection,
            ),
            ProofStep::new(
                3,
                "Apply selected axioms systematically",
                "Theorem derived from axioms",
                0.6 + 0.2 * strictness + 0.2 * selection,
            ),
        ];

        let p = self.weights.base + self.weights.strictness * strictness + self.weights.selection * selection;
        let success = chance(rng, p);

        Ok(StrategyOutcome {
            steps,
            success,
            resources_used: ResourceUsage::new(
                50.0 + 100.0 * (1.0 - selection),
                30.0 + 50.0 * (1.0 - selection),
            ),
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
    fn test_seed_biases_toward_precision() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50 {
            let mut genotype = Genotype::random(&mut rng);
            AxiomStrategy::new().seed_genotype(&mut genotype, &mut rng);
            assert!(genotype.value(GeneticTrait::FormalStrictness) >= 0.7);
            assert!(genotype.value(GeneticTrait::AxiomSelection) >= 0.7);
            let explore = genotype.value(GeneticTrait::ExplorationTendency);
            assert!((0.1..0.4).contains(&explore));
        }
    }

    #[test]
    fn test_perfect_axiom_agent_always_succeeds_cheaply() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        for _ in 0..20 {
            let outcome = AxiomStrategy::new()
                .attempt(&TheoremSpec::new("t"), &flat_genotype(1.0), &mut rng)
                .unwrap();
            assert!(outcome.success);
            assert_eq!(outcome.resources_used, ResourceUsage::new(50.0, 30.0));
            assert_eq!(outcome.steps[1].result, "Selected 3 axioms");
        }
    }
}
