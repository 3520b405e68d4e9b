//! Evolution layer - selection, breeding and population management.
//!
//! A [`PopulationManager`] runs the generational loop: every agent attempts
//! the theorem set, fitness is refreshed, the fittest agents carry over and
//! tournament-selected parents breed the rest of the next generation.

#![warn(missing_docs)]

mod error;
mod selection;
mod breeding;
mod evaluation;
mod metrics;
mod manager;

pub use error::{EvolutionError, Result};
pub use selection::{rank, tournament_select};
pub use breeding::create_new_generation;
pub use evaluation::evaluate_population;
pub use metrics::{collect_stats, EliteSummary, FitnessPoint, PopulationSummary};
pub use manager::{PopulationManager, StatsObserver};
