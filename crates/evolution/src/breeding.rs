//! Building the next generation from a ranked population.

use genprover_core::{Agent, CoreError, Genotype, PopulationConfig};
use rand::Rng;
use tracing::debug;

use crate::selection::tournament_select;

/// Build the next generation of `config.population_size` agents.
///
/// `ranking` orders `population` best first (see [`rank`](crate::rank)).
/// The top `max(1, floor(len * elite_percentage))` agents carry over
/// unchanged; the remainder is filled with crossover children of
/// tournament-selected parents, mutated with `mutation_rate`. Both children
/// take the first parent's specialization. When one slot is left, the
/// second child is dropped.
pub fn create_new_generation<R: Rng + ?Sized>(
    population: &[Agent],
    ranking: &[usize],
    config: &PopulationConfig,
    rng: &mut R,
) -> Result<Vec<Agent>, CoreError> {
    let target = config.population_size;
    let elite_count = PopulationConfig::elite_count_for(population.len(), config.elite_percentage).min(target);

    let mut next: Vec<Agent> = Vec::with_capacity(target);
    next.extend(ranking.iter().take(elite_count).map(|&i| population[i].clone()));
    debug!(elites = next.len(), target, "Carried elites into next generation");

    while next.len() < target {
        let parent1 = tournament_select(population, config.tournament_size, rng)?;
        let parent2 = tournament_select(population, config.tournament_size, rng)?;
        debug!(parent1 = %parent1.id(), parent2 = %parent2.id(), "Selected parents");

        let (mut genotype1, mut genotype2) =
            Genotype::crossover(parent1.genotype(), parent2.genotype(), config.crossover_points, rng);
        genotype1.mutate(config.mutation_rate, rng);
        genotype2.mutate(config.mutation_rate, rng);

        let specialization = parent1.specialization().map(str::to_string);
        next.push(Agent::child(genotype1, specialization.clone(), parent1, parent2));
        if next.len() < target {
            next.push(Agent::child(genotype2, specialization, parent1, parent2));
        }
    }

    Ok(next)
}
