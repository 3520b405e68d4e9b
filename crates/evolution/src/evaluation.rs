//! Parallel theorem evaluation.

use genprover_core::{Agent, TheoremSpec};
use genprover_strategies::StrategyRegistry;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Have every agent attempt every theorem.
///
/// Agents run in parallel; agent `i` draws from its own generator seeded
/// with `seeds[i]`, so results do not depend on scheduling.
///
/// # Panics
///
/// If `seeds` is shorter than `agents`.
pub fn evaluate_population(
    agents: &mut [Agent],
    theorems: &[TheoremSpec],
    registry: &StrategyRegistry,
    seeds: &[u64],
) {
    assert!(seeds.len() >= agents.len(), "one seed per agent is required");

    agents
        .par_iter_mut()
        .zip(seeds.par_iter())
        .for_each(|(agent, &seed)| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let strategy = registry.resolve(agent.specialization());
            for theorem in theorems {
                agent.prove(theorem, strategy, &mut rng);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use genprover_core::Genotype;

    fn agents(rng: &mut ChaCha8Rng) -> Vec<Agent> {
        ["axiom", "verification", "counterexample", "unknown"]
            .iter()
            .map(|tag| Agent::new(Genotype::random(rng), Some(tag.to_string())))
            .collect()
    }

    #[test]
    fn test_every_agent_attempts_every_theorem() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut agents = agents(&mut rng);
        let theorems: Vec<TheoremSpec> = (0..3).map(|i| TheoremSpec::new(format!("T{}", i))).collect();

        evaluate_population(&mut agents, &theorems, &StrategyRegistry::builtin(), &[1, 2, 3, 4]);

        for agent in &agents {
            assert_eq!(agent.total_attempts(), 3);
            let ids: Vec<&str> = agent.proof_attempts().iter().map(|a| a.theorem_id.as_str()).collect();
            assert_eq!(ids, vec!["T0", "T1", "T2"]);
        }
    }

    #[test]
    fn test_outcomes_follow_seeds() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let base = agents(&mut rng);
        let theorems: Vec<TheoremSpec> = (0..5).map(|i| TheoremSpec::new(format!("T{}", i))).collect();
        let registry = StrategyRegistry::builtin();

        let mut first = base.clone();
        let mut second = base.clone();
        evaluate_population(&mut first, &theorems, &registry, &[7, 8, 9, 10]);
        evaluate_population(&mut second, &theorems, &registry, &[7, 8, 9, 10]);

        for (a, b) in first.iter().zip(&second) {
            let steps_a: Vec<_> = a.proof_attempts().iter().map(|p| (p.success, p.steps.clone())).collect();
            let steps_b: Vec<_> = b.proof_attempts().iter().map(|p| (p.success, p.steps.clone())).collect();
            assert_eq!(steps_a, steps_b);
        }
    }
}
