//! Genotype model - the heritable traits of a prover agent.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Value returned by [`Genotype::get_trait_value`] for unknown trait names.
pub const DEFAULT_TRAIT_VALUE: f64 = 0.5;

/// Mutation-probability sub-range used by [`Genotype::random`].
pub const DEFAULT_MUTATION_PROBABILITY_RANGE: RangeInclusive<f64> = 0.05..=0.15;

/// Number of traits in the registry.
pub const TRAIT_COUNT: usize = 12;

/// Traits that shape how an agent goes about proving a theorem.
///
/// The registry is closed: every genotype carries exactly one gene per
/// variant, and declaration order is the order crossover walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneticTrait {
    /// How deeply to break theorems down
    DecompositionDepth,
    /// Preference among proof methods
    ProofMethodPreference,
    /// Adherence to formal methods
    FormalStrictness,
    /// Ability to produce counterexamples
    CounterexampleGeneration,
    /// Depth of domain knowledge
    EconomicDomainKnowledge,
    /// Ability to pick relevant axioms
    AxiomSelection,
    /// How computational resources get allocated
    ResourceAllocation,
    /// Tendency to reuse existing proof terms
    ProofTermReuse,
    /// Preference for longer or shorter proofs
    ProofLengthPreference,
    /// How thoroughly proofs get checked
    VerificationThoroughness,
    /// Handling of ambiguous cases
    UncertaintyHandling,
    /// Tendency to try novel approaches
    ExplorationTendency,
}

impl GeneticTrait {
    /// Every trait, in declaration order.
    pub const ALL: [GeneticTrait; TRAIT_COUNT] = [
        GeneticTrait::DecompositionDepth,
        GeneticTrait::ProofMethodPreference,
        GeneticTrait::FormalStrictness,
        GeneticTrait::CounterexampleGeneration,
        GeneticTrait::EconomicDomainKnowledge,
        GeneticTrait::AxiomSelection,
        GeneticTrait::ResourceAllocation,
        GeneticTrait::ProofTermReuse,
        GeneticTrait::ProofLengthPreference,
        GeneticTrait::VerificationThoroughness,
        GeneticTrait::UncertaintyHandling,
        GeneticTrait::ExplorationTendency,
    ];

    /// Position of this trait in the registry.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wire name of the trait.
    pub fn name(self) -> &'static str {
        match self {
            Self::DecompositionDepth => "decomposition_depth",
            Self::ProofMethodPreference => "proof_method_preference",
            Self::FormalStrictness => "formal_strictness",
            Self::CounterexampleGeneration => "counterexample_generation",
            Self::EconomicDomainKnowledge => "economic_domain_knowledge",
            Self::AxiomSelection => "axiom_selection",
            Self::ResourceAllocation => "resource_allocation",
            Self::ProofTermReuse => "proof_term_reuse",
            Self::ProofLengthPreference => "proof_length_preference",
            Self::VerificationThoroughness => "verification_thoroughness",
            Self::UncertaintyHandling => "uncertainty_handling",
            Self::ExplorationTendency => "exploration_tendency",
        }
    }

    /// Look a trait up by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }
}

impl std::fmt::Display for GeneticTrait {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for GeneticTrait {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| CoreError::validation(format!("unknown trait '{}'", s)))
    }
}

/// A single gene: a trait value plus its own mutation probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    /// Normalized trait value, always within [0, 1]
    pub value: f64,

    /// Chance that a mutation pass touches this gene
    pub mutation_probability: f64,
}

impl Gene {
    /// Create a gene, clamping both fields into [0, 1].
    pub fn new(value: f64, mutation_probability: f64) -> Self {
        Self {
            value: clamp_unit(value),
            mutation_probability: clamp_unit(mutation_probability),
        }
    }

    /// Potentially mutate this gene.
    ///
    /// With probability `mutation_probability` the value moves by a uniform
    /// delta in `[-strength, strength]` and is clamped back into [0, 1].
    /// Strength is taken as an absolute value capped at 1.0; non-finite
    /// strength means no movement. Returns whether a mutation happened.
    pub fn mutate<R: Rng + ?Sized>(&mut self, strength: f64, rng: &mut R) -> bool {
        if rng.gen::<f64>() >= self.mutation_probability {
            return false;
        }
        let strength = if strength.is_finite() { strength.abs().min(1.0) } else { 0.0 };
        let delta = rng.gen_range(-strength..=strength);
        self.value = clamp_unit(self.value + delta);
        true
    }
}

/// The complete genetic makeup of a prover agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GenotypeRecord", into = "GenotypeRecord")]
pub struct Genotype {
    genes: [Gene; TRAIT_COUNT],
}

/// Flat serialized form: `{trait_name: {value, mutation_probability}}`.
pub type GenotypeRecord = BTreeMap<String, Gene>;

impl Genotype {
    /// Build a genotype from one gene per trait, in declaration order.
    pub fn from_genes(genes: [Gene; TRAIT_COUNT]) -> Self {
        Self { genes }
    }

    /// Random genotype with mutation probabilities in the default sub-range.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::random_in(rng, DEFAULT_MUTATION_PROBABILITY_RANGE)
    }

    /// Random genotype with mutation probabilities drawn from `range`.
    pub fn random_in<R: Rng + ?Sized>(rng: &mut R, range: RangeInclusive<f64>) -> Self {
        let genes = std::array::from_fn(|_| {
            let value = rng.gen::<f64>();
            let mutation_probability = rng.gen_range(range.clone());
            Gene::new(value, mutation_probability)
        });
        Self { genes }
    }

    /// Copy a parent and give every gene a chance to mutate.
    pub fn from_parent<R: Rng + ?Sized>(parent: &Genotype, mutation_rate: f64, rng: &mut R) -> Self {
        let mut child = parent.clone();
        child.mutate(mutation_rate, rng);
        child
    }

    /// Run a mutation pass over every gene; returns how many changed.
    pub fn mutate<R: Rng + ?Sized>(&mut self, strength: f64, rng: &mut R) -> usize {
        self.genes
            .iter_mut()
            .map(|gene| gene.mutate(strength, rng))
            .filter(|mutated| *mutated)
            .count()
    }

    /// Multi-point crossover producing two complementary children.
    ///
    /// `points` is reduced to `TRAIT_COUNT - 1` when it asks for more cuts
    /// than the registry can hold; zero points returns copies of the parents.
    pub fn crossover<R: Rng + ?Sized>(
        parent1: &Genotype,
        parent2: &Genotype,
        points: usize,
        rng: &mut R,
    ) -> (Genotype, Genotype) {
        let points = points.min(TRAIT_COUNT - 1);

        let mut cuts: Vec<usize> = rand::seq::index::sample(rng, TRAIT_COUNT - 1, points)
            .into_iter()
            .map(|i| i + 1)
            .collect();
        cuts.sort_unstable();

        let mut child1 = parent1.clone();
        let mut child2 = parent2.clone();

        let mut from_first = true;
        let mut next_cut = 0;
        for i in 0..TRAIT_COUNT {
            if next_cut < cuts.len() && i >= cuts[next_cut] {
                next_cut += 1;
                from_first = !from_first;
            }
            if !from_first {
                child1.genes[i] = parent2.genes[i];
                child2.genes[i] = parent1.genes[i];
            }
        }

        (child1, child2)
    }

    /// The gene for a trait.
    pub fn gene(&self, trait_: GeneticTrait) -> &Gene {
        &self.genes[trait_.index()]
    }

    /// Mutable access to the gene for a trait.
    pub fn gene_mut(&mut self, trait_: GeneticTrait) -> &mut Gene {
        &mut self.genes[trait_.index()]
    }

    /// The value of a trait.
    pub fn value(&self, trait_: GeneticTrait) -> f64 {
        self.genes[trait_.index()].value
    }

    /// Overwrite a trait value, clamped into [0, 1].
    pub fn set_value(&mut self, trait_: GeneticTrait, value: f64) {
        self.genes[trait_.index()].value = clamp_unit(value);
    }

    /// Look a trait value up by wire name.
    ///
    /// Names outside the registry resolve to [`DEFAULT_TRAIT_VALUE`] rather
    /// than an error.
    pub fn get_trait_value(&self, name: &str) -> f64 {
        GeneticTrait::from_name(name)
            .map(|t| self.value(t))
            .unwrap_or(DEFAULT_TRAIT_VALUE)
    }

    /// Iterate `(trait, gene)` pairs in declaration order.
    pub fn genes(&self) -> impl Iterator<Item = (GeneticTrait, &Gene)> {
        GeneticTrait::ALL.iter().copied().zip(self.genes.iter())
    }
}

impl From<Genotype> for GenotypeRecord {
    fn from(genotype: Genotype) -> Self {
        genotype
            .genes()
            .map(|(t, gene)| (t.name().to_string(), *gene))
            .collect()
    }
}

impl TryFrom<GenotypeRecord> for Genotype {
    type Error = CoreError;

    fn try_from(mut record: GenotypeRecord) -> Result<Self, Self::Error> {
        let mut genes = [Gene::new(DEFAULT_TRAIT_VALUE, 0.0); TRAIT_COUNT];

        for t in GeneticTrait::ALL {
            let gene = record
                .remove(t.name())
                .ok_or_else(|| CoreError::validation(format!("genotype is missing trait '{}'", t)))?;
            check_unit(t, "value", gene.value)?;
            check_unit(t, "mutation_probability", gene.mutation_probability)?;
            genes[t.index()] = gene;
        }

        if let Some(unknown) = record.keys().next() {
            return Err(CoreError::validation(format!("genotype has unknown trait '{}'", unknown)));
        }

        Ok(Self { genes })
    }
}

fn check_unit(t: GeneticTrait, field: &str, x: f64) -> Result<(), CoreError> {
    if x.is_finite() && (0.0..=1.0).contains(&x) {
        Ok(())
    } else {
        Err(CoreError::validation(format!("{} of trait '{}' is out of range: {}", field, t, x)))
    }
}

fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        return DEFAULT_TRAIT_VALUE;
    }
    x.clamp(0.0, 1.0)
}
