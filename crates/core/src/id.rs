//! Unique identifiers for genprover entities.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Prefix carried by every generated agent identifier.
const AGENT_PREFIX: &str = "gtp_";

/// Unique identifier for an Agent.
///
/// Generated ids look like `gtp_01J9...`; ids restored from a checkpoint are
/// kept verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Generate a new AgentId
    pub fn new() -> Self {
        Self(format!("{}{}", AGENT_PREFIX, Ulid::new()))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for AgentId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
