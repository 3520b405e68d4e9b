//! Proof strategies for genprover agents.
//!
//! Each specialization proves theorems its own way: the strategy reads the
//! agent's genotype, simulates a sequence of proof steps and draws a
//! success outcome from the injected random source. The success-probability
//! coefficients live in per-strategy `*Weights` structs so they can be tuned
//! without touching the step logic.

#![warn(missing_docs)]

mod baseline;
mod axiom;
mod decomposition;
mod method;
mod counterexample;
mod verification;
mod generalization;
mod registry;

pub use baseline::{BaselineStrategy, BaselineWeights};
pub use axiom::{AxiomStrategy, AxiomWeights};
pub use decomposition::{DecompositionStrategy, DecompositionWeights};
pub use method::{MethodStrategy, MethodWeights, PROOF_METHODS};
pub use counterexample::{CounterexampleStrategy, CounterexampleWeights};
pub use verification::{
    Severity, VerificationFinding, VerificationReport, VerificationStrategy, VerificationWeights,
};
pub use generalization::{GeneralizationStrategy, GeneralizationWeights};
pub use registry::StrategyRegistry;

use genprover_core::{GeneticTrait, Genotype};
use rand::{Rng, RngCore};

/// Draw a Bernoulli trial with success probability `p`.
pub(crate) fn chance(rng: &mut dyn RngCore, p: f64) -> bool {
    rng.gen::<f64>() < p
}

/// Overwrite a trait with a uniform draw from `[lo, lo + width)`.
pub(crate) fn seed_trait(genotype: &mut Genotype, trait_: GeneticTrait, lo: f64, width: f64, rng: &mut dyn RngCore) {
    let value = lo + rng.gen::<f64>() * width;
    genotype.set_value(trait_, value);
}
