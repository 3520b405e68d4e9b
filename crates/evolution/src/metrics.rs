//! Population statistics and summaries.

use genprover_core::{Agent, AgentId, GeneticTrait, PopulationStats, TraitDistribution};
use serde::{Deserialize, Serialize};

use crate::selection::rank;

/// Collect statistics for the current population.
///
/// Fitness figures use each agent's latest recorded fitness; the spread of
/// each trait is the population standard deviation. The first
/// `elite_count` ranked agents are listed as elites.
pub fn collect_stats(agents: &[Agent], generation: u32, elite_count: usize) -> PopulationStats {
    let fitnesses: Vec<f64> = agents.iter().map(Agent::latest_fitness).collect();
    let success_rates: Vec<f64> = agents.iter().map(Agent::success_rate).collect();
    let attempts: Vec<f64> = agents.iter().map(|a| a.total_attempts() as f64).collect();

    let trait_distributions = GeneticTrait::ALL
        .iter()
        .map(|&trait_| {
            let values: Vec<f64> = agents.iter().map(|a| a.genotype().value(trait_)).collect();
            TraitDistribution {
                trait_,
                mean: mean(&values),
                std_dev: std_dev(&values),
            }
        })
        .collect();

    let elite_agent_ids: Vec<AgentId> = rank(agents)
        .into_iter()
        .take(elite_count)
        .map(|i| agents[i].id().clone())
        .collect();

    PopulationStats {
        generation,
        timestamp: chrono::Utc::now(),
        population_size: agents.len(),
        avg_fitness: mean(&fitnesses),
        max_fitness: fitnesses.iter().copied().reduce(f64::max).unwrap_or(0.0),
        min_fitness: fitnesses.iter().copied().reduce(f64::min).unwrap_or(0.0),
        median_fitness: median(&fitnesses),
        avg_success_rate: mean(&success_rates),
        avg_proof_attempts: mean(&attempts),
        trait_distributions,
        elite_agent_ids,
    }
}

/// Key figures of one elite agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliteSummary {
    /// Agent identifier
    pub agent_id: AgentId,
    /// Specialization tag
    pub specialization: Option<String>,
    /// Latest fitness
    pub fitness: f64,
    /// Lifetime success rate
    pub success_rate: f64,
    /// Generation the agent was born in
    pub generation: u32,
}

impl From<&Agent> for EliteSummary {
    fn from(agent: &Agent) -> Self {
        Self {
            agent_id: agent.id().clone(),
            specialization: agent.specialization().map(str::to_string),
            fitness: agent.latest_fitness(),
            success_rate: agent.success_rate(),
            generation: agent.generation(),
        }
    }
}

/// Snapshot of where a population stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSummary {
    /// Current generation
    pub generation: u32,
    /// Live agents
    pub population_size: usize,
    /// Mean fitness of the latest statistics
    pub avg_fitness: f64,
    /// Best fitness of the latest statistics
    pub max_fitness: f64,
    /// Mean success rate of the latest statistics
    pub avg_success_rate: f64,
    /// Current elites, best first
    pub elite_agents: Vec<EliteSummary>,
    /// Per-trait mean and spread
    pub trait_distributions: Vec<TraitDistribution>,
}

/// Fitness figures of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessPoint {
    /// Generation number
    pub generation: u32,
    /// Mean fitness
    pub avg_fitness: f64,
    /// Best fitness
    pub max_fitness: f64,
    /// Worst fitness
    pub min_fitness: f64,
}

impl From<&PopulationStats> for FitnessPoint {
    fn from(stats: &PopulationStats) -> Self {
        Self {
            generation: stats.generation,
            avg_fitness: stats.avg_fitness,
            max_fitness: stats.max_fitness,
            min_fitness: stats.min_fitness,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
