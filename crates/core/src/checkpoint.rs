//! Checkpoint snapshot format.

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentRecord};
use crate::config::PopulationConfig;
use crate::error::CoreError;
use crate::stats::StatsSummary;
use crate::Time;

/// Snapshot format version written by this build.
pub const CHECKPOINT_FORMAT_VERSION: u32 = 1;

/// A point-in-time snapshot of a population.
///
/// Proof attempts and full per-generation statistics are not part of the
/// snapshot; a restored population starts with empty attempt lists and a
/// single fresh stats entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Snapshot format version
    pub format_version: u32,

    /// Generation at save time
    pub generation: u32,

    /// When saved
    pub timestamp: Time,

    /// Configuration of the population
    pub config: PopulationConfig,

    /// Every live agent
    pub agents: Vec<AgentRecord>,

    /// Abbreviated history, oldest first
    pub history: Vec<StatsSummary>,
}

impl Checkpoint {
    /// Default file name: `pop_gen0007_1718000000.json`.
    pub fn file_name(&self) -> String {
        format!("pop_gen{:04}_{}.json", self.generation, self.timestamp.timestamp())
    }

    /// Check the snapshot without building anything.
    ///
    /// Covers the config, agent ids, every agent record and the finiteness
    /// of the history figures.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.config.validate()?;
        if self.agents.is_empty() {
            return Err(CoreError::validation("checkpoint contains no agents"));
        }
        let mut seen = std::collections::HashSet::new();
        for record in &self.agents {
            if !seen.insert(&record.agent_id) {
                return Err(CoreError::validation(format!(
                    "checkpoint contains agent {} twice",
                    record.agent_id
                )));
            }
            record.validate()?;
        }
        if let Some(bad) = self.history.iter().find(|h| {
            ![h.avg_fitness, h.max_fitness, h.min_fitness, h.avg_success_rate]
                .iter()
                .all(|v| v.is_finite())
        }) {
            return Err(CoreError::validation(format!(
                "history entry for generation {} has non-finite figures",
                bad.generation
            )));
        }
        Ok(())
    }

    /// Check the snapshot and rebuild its agents.
    ///
    /// Either every agent is restored or an error is returned.
    pub fn restore_agents(&self) -> Result<Vec<Agent>, CoreError> {
        self.validate()?;
        self.agents.iter().cloned().map(Agent::from_record).collect()
    }
}
