//! Ranking and tournament selection.

use genprover_core::{Agent, CoreError};
use rand::Rng;

/// Indices of `agents` ordered by latest fitness, best first.
///
/// The sort is stable: equally fit agents keep their population order.
pub fn rank(agents: &[Agent]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..agents.len()).collect();
    order.sort_by(|&a, &b| agents[b].latest_fitness().total_cmp(&agents[a].latest_fitness()));
    order
}

/// Pick a parent by tournament.
///
/// `min(size, pool.len())` distinct agents are sampled and the one with the
/// highest latest fitness wins; ties go to the first sampled.
pub fn tournament_select<'a, R: Rng + ?Sized>(
    pool: &'a [Agent],
    size: usize,
    rng: &mut R,
) -> Result<&'a Agent, CoreError> {
    if pool.is_empty() {
        return Err(CoreError::invariant("tournament selection on an empty pool"));
    }
    let k = size.clamp(1, pool.len());

    rand::seq::index::sample(rng, pool.len(), k)
        .into_iter()
        .map(|i| &pool[i])
        .reduce(|best, candidate| {
            if candidate.latest_fitness() > best.latest_fitness() {
                candidate
            } else {
                best
            }
        })
        .ok_or_else(|| CoreError::invariant("tournament sampled no contestants"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use genprover_core::{Gene, Genotype, ProofAttempt, ResourceUsage, TRAIT_COUNT};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Agent whose latest fitness comes from `successes` out of `attempts`.
    pub(crate) fn scored_agent(successes: usize, attempts: usize) -> Agent {
        let mut agent = Agent::new(Genotype::from_genes([Gene::new(0.5, 0.1); TRAIT_COUNT]), None);
        for i in 0..attempts {
            agent.record_attempt(ProofAttempt {
                theorem_id: format!("t{}", i),
                steps: Vec::new(),
                success: i < successes,
                resources_used: ResourceUsage::new(100.0, 100.0),
                time_taken: 0.0,
                verification_result: None,
            });
        }
        agent.fitness();
        agent
    }

    #[test]
    fn test_empty_pool_is_an_invariant_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = tournament_select(&[], 3, &mut rng).unwrap_err();
        assert!(matches!(err, CoreError::Invariant(_)));
    }

    #[test]
    fn test_full_tournament_picks_best() {
        let pool = vec![scored_agent(1, 4), scored_agent(4, 4), scored_agent(2, 4)];
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..20 {
            let winner = tournament_select(&pool, 10, &mut rng).unwrap();
            assert_eq!(winner.id(), pool[1].id());
        }
    }

    #[test]
    fn test_single_agent_pool() {
        let pool = vec![scored_agent(0, 0)];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(tournament_select(&pool, 3, &mut rng).unwrap().id(), pool[0].id());
    }

    #[test]
    fn test_rank_is_stable_and_descending() {
        let agents = vec![
            scored_agent(1, 2),
            scored_agent(2, 2),
            scored_agent(1, 2),
            scored_agent(0, 0),
        ];
        assert_eq!(rank(&agents), vec![1, 0, 2, 3]);
    }
}
