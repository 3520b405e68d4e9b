//! Error types shared by the genetic engine.

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the core model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// Malformed input (genotype record, configuration, ...)
    #[error("validation error: {0}")]
    Validation(String),

    /// A programming-contract violation, e.g. selecting from an empty pool
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl CoreError {
    /// Build a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an invariant error.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }
}

/// Errors a proof strategy may report for a single attempt.
///
/// These never abort a generation; the agent records a failed attempt instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrategyError {
    /// The strategy cannot handle this theorem
    #[error("unsupported theorem {0}")]
    Unsupported(String),

    /// The strategy failed while working on the theorem
    #[error("strategy failed: {0}")]
    Failed(String),
}
