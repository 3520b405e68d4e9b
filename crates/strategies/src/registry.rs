//! Specialization tag to strategy lookup.

use std::collections::HashMap;
use std::sync::Arc;

use genprover_core::ProofStrategy;
use tracing::debug;

use crate::{
    AxiomStrategy, BaselineStrategy, CounterexampleStrategy, DecompositionStrategy,
    GeneralizationStrategy, MethodStrategy, VerificationStrategy,
};

/// Maps specialization tags to proof strategies.
///
/// Tags without an entry, and agents without a tag, resolve to the
/// fallback strategy.
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn ProofStrategy>>,
    fallback: Arc<dyn ProofStrategy>,
}

impl StrategyRegistry {
    /// Empty registry with the given fallback.
    pub fn new(fallback: Arc<dyn ProofStrategy>) -> Self {
        Self {
            strategies: HashMap::new(),
            fallback,
        }
    }

    /// The six built-in specializations over the baseline fallback.
    pub fn builtin() -> Self {
        Self::new(Arc::new(BaselineStrategy::new()))
            .with_strategy(Arc::new(AxiomStrategy::new()))
            .with_strategy(Arc::new(DecompositionStrategy::new()))
            .with_strategy(Arc::new(MethodStrategy::new()))
            .with_strategy(Arc::new(CounterexampleStrategy::new()))
            .with_strategy(Arc::new(VerificationStrategy::new()))
            .with_strategy(Arc::new(GeneralizationStrategy::new()))
    }

    /// Register a strategy under its own name, returning any it replaced.
    pub fn register(&mut self, strategy: Arc<dyn ProofStrategy>) -> Option<Arc<dyn ProofStrategy>> {
        let tag = strategy.name().to_string();
        debug!(tag = %tag, "Registering proof strategy");
        self.strategies.insert(tag, strategy)
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_strategy(mut self, strategy: Arc<dyn ProofStrategy>) -> Self {
        self.register(strategy);
        self
    }

    /// Strategy for a specialization tag.
    pub fn resolve(&self, specialization: Option<&str>) -> &dyn ProofStrategy {
        specialization
            .and_then(|tag| self.strategies.get(tag))
            .unwrap_or(&self.fallback)
            .as_ref()
    }

    /// Whether a tag has its own strategy.
    pub fn contains(&self, tag: &str) -> bool {
        self.strategies.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("tags", &self.tags())
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genprover_core::{Genotype, StrategyError, StrategyOutcome, TheoremSpec};
    use rand::RngCore;

    struct Named(&'static str);

    impl ProofStrategy for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn attempt(
            &self,
            _theorem: &TheoremSpec,
            _genotype: &Genotype,
            _rng: &mut dyn RngCore,
        ) -> Result<StrategyOutcome, StrategyError> {
            Err(StrategyError::Unsupported(self.0.to_string()))
        }
    }

    #[test]
    fn test_builtin_tags() {
        let registry = StrategyRegistry::builtin();
        assert_eq!(
            registry.tags(),
            vec![
                "axiom",
                "counterexample",
                "decomposition",
                "generalization",
                "proof_strategy",
                "verification"
            ]
        );
    }

    #[test]
    fn test_resolve_falls_back_to_baseline() {
        let registry = StrategyRegistry::builtin();
        assert_eq!(registry.resolve(Some("axiom")).name(), "axiom");
        assert_eq!(registry.resolve(Some("astrology")).name(), "baseline");
        assert_eq!(registry.resolve(None).name(), "baseline");
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = StrategyRegistry::new(Arc::new(Named("fallback")));
        assert!(registry.register(Arc::new(Named("custom"))).is_none());
        assert!(registry.register(Arc::new(Named("custom"))).is_some());
        assert!(registry.contains("custom"));
        assert_eq!(registry.resolve(Some("custom")).name(), "custom");
        assert_eq!(registry.resolve(Some("other")).name(), "fallback");
    }
}
