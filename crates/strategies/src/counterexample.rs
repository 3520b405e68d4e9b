//! Counterexample strategy: search the parameter space for violations.

use genprover_core::{
    GeneticTrait, Genotype, ProofStep, ProofStrategy, ResourceUsage, StrategyError, StrategyOutcome,
    TheoremSpec,
};
use rand::{Rng, RngCore};
use serde_json::json;

use crate::{chance, seed_trait};

/// Coefficients of [`CounterexampleStrategy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterexampleWeights {
    /// Chance that a searched region yields a counterexample
    pub discovery: f64,
    /// Success probability when the search comes up empty
    pub inconclusive: f64,
}

impl Default for CounterexampleWeights {
    fn default() -> Self {
        Self {
            discovery: 0.15,
            inconclusive: 0.5,
        }
    }
}

/// Searches `3 + floor(7 * exploration)` regions for counterexamples.
///
/// Finding one counts as success; the counterexamples are reported in the
/// attempt's verification result.
#[derive(Debug, Clone, Default)]
pub struct CounterexampleStrategy {
    weights: CounterexampleWeights,
}

impl CounterexampleStrategy {
    /// Strategy with default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategy with custom weights.
    pub fn with_weights(weights: CounterexampleWeights) -> Self {
        Self { weights }
    }

    /// Number of regions a genotype searches.
    pub fn region_count(genotype: &Genotype) -> usize {
        3 + (7.0 * genotype.value(GeneticTrait::ExplorationTendency)) as usize
    }
}

impl ProofStrategy for CounterexampleStrategy {
    fn name(&self) -> &str {
        "counterexample"
    }

    fn seed_genotype(&self, genotype: &mut Genotype, rng: &mut dyn RngCore) {
        seed_trait(genotype, GeneticTrait::CounterexampleGeneration, 0.7, 0.3, rng);
        seed_trait(genotype, GeneticTrait::ExplorationTendency, 0.7, 0.3, rng);
        seed_trait(genotype, GeneticTrait::FormalStrictness, 0.2, 0.3, rng);
    }

    fn attempt(
        &self,
        _theorem: &TheoremSpec,
        genotype: &Genotype,
        rng: &mut dyn RngCore,
    ) -> Result<StrategyOutcome, StrategyError> {
        let skill = genotype.value(GeneticTrait::CounterexampleGeneration);
        let exploration = genotype.value(GeneticTrait::ExplorationTendency);
        let regions = Self::region_count(genotype);

        let mut steps = vec![ProofStep::new(
            1,
            "Analyze theorem assumptions and constraints",
            "Identified boundary conditions",
            0.7 + 0.3 * skill,
        )];

        let mut found = Vec::new();
        for region in 1..=regions {
            steps.push(ProofStep::new(
                steps.len() as u32 + 1,
                format!("Search region {} of parameter space", region),
                "Searching for counterexamples",
                0.6 + 0.4 * skill,
            ));

            if chance(rng, self.weights.discovery) {
                let parameters: serde_json::Map<String, serde_json::Value> = (0..3)
                    .map(|j| (format!("param{}", j), json!(rng.gen::<f64>())))
                    .collect();
                found.push(json!({
                    "region": region,
                    "parameters": parameters,
                    "violation": "Violates a stated condition of the theorem",
                }));
                steps.push(ProofStep::new(
                    steps.len() as u32 + 1,
                    format!("Found potential counterexample in region {}", region),
                    "Counterexample detailed and verified",
                    0.7 + 0.3 * skill,
                ));
            }
        }

        let success = if found.is_empty() {
            steps.push(ProofStep::new(
                steps.len() as u32 + 1,
                "Exhaustive search completed with no counterexamples found",
                "Theorem may be valid",
                0.5 + 0.3 * skill,
            ));
            chance(rng, self.weights.inconclusive)
        } else {
            steps.push(ProofStep::new(
                steps.len() as u32 + 1,
                "Analyze counterexamples and evaluate theorem validity",
                format!("Theorem disproven with {} counterexamples", found.len()),
                0.8 + 0.2 * skill,
            ));
            true
        };

        let verification_result = if found.is_empty() {
            None
        } else {
            Some(json!({ "counterexamples": found }))
        };

        Ok(StrategyOutcome {
            steps,
            success,
            resources_used: ResourceUsage::new(
                100.0 + 100.0 * exploration,
                150.0 + 150.0 * exploration * skill,
            ),
            verification_result,
        })
    }
}
