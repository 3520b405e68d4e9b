//! Generalization strategy: prove via reusable patterns.

use genprover_core::{
    GeneticTrait, Genotype, ProofStep, ProofStrategy, ResourceUsage, StrategyError, StrategyOutcome,
    TheoremSpec,
};
use rand::RngCore;
use serde_json::json;

use crate::{chance, seed_trait};

/// Coefficients of [`GeneralizationStrategy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneralizationWeights {
    /// Constant term of a pattern's usefulness
    pub pattern_base: f64,
    /// Weight of proof-term reuse in a pattern's usefulness
    pub pattern_reuse: f64,
    /// Constant term of the success probability
    pub base: f64,
    /// Weight of the useful-pattern fraction
    pub useful_fraction: f64,
    /// Weight of formal strictness
    pub strictness: f64,
}

impl Default for GeneralizationWeights {
    fn default() -> Self {
        Self {
            pattern_base: 0.4,
            pattern_reuse: 0.6,
            base: 0.2,
            useful_fraction: 0.4,
            strictness: 0.4,
        }
    }
}

/// Explores `2 + floor(3 * exploration)` patterns and builds a proof from
/// the useful ones.
#[derive(Debug, Clone, Default)]
pub struct GeneralizationStrategy {
    weights: GeneralizationWeights,
}

impl GeneralizationStrategy {
    /// Strategy with default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategy with custom weights.
    pub fn with_weights(weights: GeneralizationWeights) -> Self {
        Self { weights }
    }

    /// Number of patterns a genotype explores.
    pub fn pattern_count(genotype: &Genotype) -> usize {
        2 + (3.0 * genotype.value(GeneticTrait::ExplorationTendency)) as usize
    }

    /// Lift a theorem and its relatives into a generalized statement.
    ///
    /// The result carries the id `GEN_<id>`, the parent theorem ids and a
    /// confidence from exploration and proof-term reuse.
    pub fn generalize(&self, theorem: &TheoremSpec, related: &[TheoremSpec], genotype: &Genotype) -> TheoremSpec {
        let exploration = genotype.value(GeneticTrait::ExplorationTendency);
        let reuse = genotype.value(GeneticTrait::ProofTermReuse);
        let parents: Vec<&str> = std::iter::once(theorem)
            .chain(related)
            .map(|t| t.theorem_id.as_str())
            .collect();

        TheoremSpec::new(format!("GEN_{}", theorem.theorem_id))
            .with_field("natural_language", json!(format!("Generalized form of {}", theorem.theorem_id)))
            .with_field("parent_theorems", json!(parents))
            .with_field("confidence", json!(0.5 + 0.5 * (exploration + reuse) / 2.0))
    }
}

impl ProofStrategy for GeneralizationStrategy {
    fn name(&self) -> &str {
        "generalization"
    }

    fn seed_genotype(&self, genotype: &mut Genotype, rng: &mut dyn RngCore) {
        seed_trait(genotype, GeneticTrait::ExplorationTendency, 0.6, 0.4, rng);
        seed_trait(genotype, GeneticTrait::ProofTermReuse, 0.6, 0.4, rng);
        seed_trait(genotype, GeneticTrait::FormalStrictness, 0.4, 0.3, rng);
    }

    fn attempt(
        &self,
        _theorem: &TheoremSpec,
        genotype: &Genotype,
        rng: &mut dyn RngCore,
    ) -> Result<StrategyOutcome, StrategyError> {
        let exploration = genotype.value(GeneticTrait::ExplorationTendency);
        let reuse = genotype.value(GeneticTrait::ProofTermReuse);
        let strictness = genotype.value(GeneticTrait::FormalStrictness);
        let patterns = Self::pattern_count(genotype);

        let mut steps = vec![
            ProofStep::new(
                1,
                "Identify patterns and structures in the theorem",
                "Pattern analysis complete",
                0.7 + 0.3 * exploration,
            ),
            ProofStep::new(
                2,
                "Relate to known theorems and principles",
                "Connections to existing knowledge established",
                0.6 + 0.4 * reuse,
            ),
        ];

        let mut useful = 0usize;
        for i in 1..=patterns {
            let ok = chance(rng, self.weights.pattern_base + self.weights.pattern_reuse * reuse);
            steps.push(ProofStep::new(
                steps.len() as u32 + 1,
                format!("Explore pattern {} and potential generalization", i),
                if ok { "Useful pattern" } else { "Pattern not applicable" },
                if ok { 1.0 } else { 0.5 },
            ));
            if ok {
                useful += 1;
                steps.push(ProofStep::new(
                    steps.len() as u32 + 1,
                    format!("Apply pattern {} to develop proof component", i),
                    "Pattern successfully applied",
                    0.6 + 0.4 * reuse,
                ));
            }
        }

        let fraction = useful as f64 / patterns as f64;
        steps.push(ProofStep::new(
            steps.len() as u32 + 1,
            "Synthesize patterns into cohesive proof",
            format!("Created proof using {} patterns", useful),
            0.5 + 0.5 * fraction,
        ));
        steps.push(ProofStep::new(
            steps.len() as u32 + 1,
            "Verify generalized proof against specific theorem",
            "Generalized proof verified for specific case",
            0.5 + 0.5 * strictness,
        ));

        let p = self.weights.base + self.weights.useful_fraction * fraction + self.weights.strictness * strictness;
        let n = patterns as f64;

        Ok(StrategyOutcome {
            steps,
            success: chance(rng, p),
            resources_used: ResourceUsage::new(90.0 + 20.0 * n, 80.0 + 20.0 * n),
            verification_result: None,
        })
    }
}
