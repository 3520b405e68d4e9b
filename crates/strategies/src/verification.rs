//! Verification strategy and step-by-step proof checking.

use genprover_core::{
    GeneticTrait, Genotype, ProofAttempt, ProofStep, ProofStrategy, ResourceUsage, StrategyError,
    StrategyOutcome, TheoremSpec,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::{chance, seed_trait};

/// Coefficients of [`VerificationStrategy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerificationWeights {
    /// Constant term
    pub base: f64,
    /// Weight of verification thoroughness
    pub thoroughness: f64,
    /// Weight of formal strictness
    pub strictness: f64,
    /// Chance that a detected error is high severity
    pub high_severity: f64,
}

impl Default for VerificationWeights {
    fn default() -> Self {
        Self {
            base: 0.3,
            thoroughness: 0.4,
            strictness: 0.3,
            high_severity: 0.3,
        }
    }
}

/// How serious a verification finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Cosmetic
    Low,
    /// Needs attention
    Medium,
    /// Invalidates the proof
    High,
}

/// One error or warning raised against a proof step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationFinding {
    /// 1-based step the finding refers to
    pub step: u32,

    /// `logical_gap` or `formality`
    pub kind: String,

    /// Human-readable explanation
    pub description: String,

    /// Severity
    pub severity: Severity,
}

/// Result of checking a proof attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Whether the proof passes
    pub verified: bool,

    /// Number of steps checked
    pub steps_verified: usize,

    /// Logical errors
    pub errors: Vec<VerificationFinding>,

    /// Formality warnings
    pub warnings: Vec<VerificationFinding>,

    /// Checked steps over total steps
    pub completeness: f64,

    /// Thoroughness gene of the verifier
    pub thoroughness: f64,
}

/// Methodical proofs with many check steps; also verifies other attempts.
#[derive(Debug, Clone, Default)]
pub struct VerificationStrategy {
    weights: VerificationWeights,
}

impl VerificationStrategy {
    /// Strategy with default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategy with custom weights.
    pub fn with_weights(weights: VerificationWeights) -> Self {
        Self { weights }
    }

    /// Check every step of `attempt` the way a verifier with `genotype` would.
    ///
    /// Low-confidence steps are more likely to draw errors (scaled by
    /// thoroughness) and formality warnings (scaled by strictness). The
    /// proof passes with no errors, or at most two errors none of which is
    /// high severity.
    pub fn verify(&self, attempt: &ProofAttempt, genotype: &Genotype, rng: &mut dyn RngCore) -> VerificationReport {
        let thoroughness = genotype.value(GeneticTrait::VerificationThoroughness);
        let strictness = genotype.value(GeneticTrait::FormalStrictness);

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for (i, step) in attempt.steps.iter().enumerate() {
            let doubt = 1.0 - step.confidence;
            let number = i as u32 + 1;

            if chance(rng, doubt * thoroughness) {
                let severity = if chance(rng, self.weights.high_severity) {
                    Severity::High
                } else {
                    Severity::Medium
                };
                errors.push(VerificationFinding {
                    step: number,
                    kind: "logical_gap".to_string(),
                    description: "Insufficient justification for conclusion".to_string(),
                    severity,
                });
            }

            if chance(rng, doubt * strictness) {
                warnings.push(VerificationFinding {
                    step: number,
                    kind: "formality".to_string(),
                    description: "Step could be more precisely stated".to_string(),
                    severity: Severity::Low,
                });
            }
        }

        let verified = errors.is_empty()
            || (errors.len() <= 2 && errors.iter().all(|e| e.severity != Severity::High));
        let steps_verified = attempt.steps.len();
        let completeness = if attempt.steps.is_empty() { 0.0 } else { 1.0 };

        VerificationReport {
            verified,
            steps_verified,
            errors,
            warnings,
            completeness,
            thoroughness,
        }
    }
}

impl ProofStrategy for VerificationStrategy {
    fn name(&self) -> &str {
        "verification"
    }

    fn seed_genotype(&self, genotype: &mut Genotype, rng: &mut dyn RngCore) {
        seed_trait(genotype, GeneticTrait::VerificationThoroughness, 0.7, 0.3, rng);
        seed_trait(genotype, GeneticTrait::FormalStrictness, 0.7, 0.3, rng);
        seed_trait(genotype, GeneticTrait::ExplorationTendency, 0.1, 0.2, rng);
    }

    fn attempt(
        &self,
        _theorem: &TheoremSpec,
        genotype: &Genotype,
        rng: &mut dyn RngCore,
    ) -> Result<StrategyOutcome, StrategyError> {
        let thoroughness = genotype.value(GeneticTrait::VerificationThoroughness);
        let strictness = genotype.value(GeneticTrait::FormalStrictness);
        let checks = 3 + (5.0 * thoroughness) as usize;

        let mut steps = vec![
            ProofStep::new(
                1,
                "Formalize theorem statement with precise notation",
                "Formal theorem statement",
                0.8 + 0.2 * strictness,
            ),
            ProofStep::new(
                2,
                "Identify proof approach from verified theorems",
                "Selected verification-oriented approach",
                0.7 + 0.3 * thoroughness,
            ),
        ];

        for i in 0..checks {
            steps.push(ProofStep::new(
                steps.len() as u32 + 1,
                format!("Verification step {}: check logical consistency", i + 1),
                "Step verified",
                0.7 + 0.3 * (1.0 - i as f64 / checks as f64),
            ));
        }

        steps.push(ProofStep::new(
            steps.len() as u32 + 1,
            "Combine verified steps into complete proof",
            "Complete formal proof",
            0.7 + 0.3 * thoroughness,
        ));

        let p = self.weights.base + self.weights.thoroughness * thoroughness + self.weights.strictness * strictness;

        Ok(StrategyOutcome {
            steps,
            success: chance(rng, p),
            resources_used: ResourceUsage::new(80.0 + 120.0 * thoroughness, 70.0 + 130.0 * thoroughness),
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

    fn attempt_with_confidences(confidences: &[f64]) -> ProofAttempt {
        ProofAttempt {
            theorem_id: "t".into(),
            steps: confidences
                .iter()
                .enumerate()
                .map(|(i, c)| ProofStep::new(i as u32 + 1, "step", "ok", *c))
                .collect(),
            success: true,
            resources_used: ResourceUsage::new(100.0, 100.0),
            time_taken: 0.1,
            verification_result: None,
        }
    }

    #[test]
    fn test_attempt_check_steps_follow_thoroughness() {
        let mut rng = ChaCha8Rng::seed_from_u64(30);
        let outcome = VerificationStrategy::new()
            .attempt(&TheoremSpec::new("t"), &flat_genotype(1.0), &mut rng)
            .unwrap();
        // 2 setup + 8 checks + combine
        assert_eq!(outcome.steps.len(), 11);
        assert!(outcome.success);
        assert_eq!(outcome.resources_used, ResourceUsage::new(200.0, 200.0));
    }

    #[test]
    fn test_confident_steps_pass_verification() {
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        let report = VerificationStrategy::new().verify(
            &attempt_with_confidences(&[1.0, 1.0, 1.0]),
            &flat_genotype(1.0),
            &mut rng,
        );
        assert!(report.verified);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
        assert_eq!(report.steps_verified, 3);
        assert_eq!(report.completeness, 1.0);
    }

    #[test]
    fn test_doubtful_steps_fail_with_high_severity() {
        let strategy = VerificationStrategy::with_weights(VerificationWeights {
            high_severity: 1.0,
            ..Default::default()
        });
        let mut rng = ChaCha8Rng::seed_from_u64(32);
        let report = strategy.verify(&attempt_with_confidences(&[0.0, 0.0]), &flat_genotype(1.0), &mut rng);
        assert!(!report.verified);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.warnings.len(), 2);
        assert!(report.errors.iter().all(|e| e.severity == Severity::High));
    }

    #[test]
    fn test_two_medium_errors_still_verify() {
        let strategy = VerificationStrategy::with_weights(VerificationWeights {
            high_severity: 0.0,
            ..Default::default()
        });
        let mut rng = ChaCha8Rng::seed_from_u64(33);
        let report = strategy.verify(&attempt_with_confidences(&[0.0, 0.0]), &flat_genotype(1.0), &mut rng);
        assert!(report.verified);

        let report = strategy.verify(&attempt_with_confidences(&[0.0, 0.0, 0.0]), &flat_genotype(1.0), &mut rng);
        assert!(!report.verified);
    }
}
