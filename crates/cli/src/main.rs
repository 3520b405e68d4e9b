//! genprover CLI - evolve populations of theorem-proving agents.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use genprover_core::{PopulationConfig, TheoremSpec};
use genprover_evolution::{PopulationManager, PopulationSummary};
use genprover_storage::JsonCheckpointStore;
use genprover_strategies::StrategyRegistry;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "genprover")]
#[command(about = "Genetic theorem-proving agent evolution", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a fresh population
    Run {
        /// Population config (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Number of agents
        #[arg(long)]
        population: Option<usize>,
        /// Share of agents kept as elites
        #[arg(long)]
        elite_percentage: Option<f64>,
        /// Mutation strength for children
        #[arg(long)]
        mutation_rate: Option<f64>,
        /// Crossover cut points
        #[arg(long)]
        crossover_points: Option<usize>,
        /// Specialization tags, assigned round-robin
        #[arg(long, value_delimiter = ',')]
        specializations: Option<Vec<String>>,
        /// Directory for checkpoints
        #[arg(long)]
        checkpoint_dir: Option<PathBuf>,
        #[command(flatten)]
        evolve: EvolveArgs,
    },
    /// Continue evolving from a checkpoint
    Resume {
        /// Checkpoint file
        checkpoint: PathBuf,
        /// Directory for further checkpoints
        #[arg(long)]
        checkpoint_dir: Option<PathBuf>,
        #[command(flatten)]
        evolve: EvolveArgs,
    },
    /// Print a checkpoint's population summary as JSON
    Inspect {
        /// Checkpoint file
        checkpoint: PathBuf,
    },
}

#[derive(Args)]
struct EvolveArgs {
    /// Generations to run
    #[arg(long, default_value = "10")]
    generations: u32,
    /// Random seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Theorems to evaluate on (JSON array)
    #[arg(long)]
    theorems: Option<PathBuf>,
    /// Number of synthetic theorems when no file is given
    #[arg(long, default_value = "10")]
    synthetic: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            population,
            elite_percentage,
            mutation_rate,
            crossover_points,
            specializations,
            checkpoint_dir,
            evolve,
        } => {
            let mut config = match config {
                Some(path) => load_config(&path)?,
                None => PopulationConfig::default(),
            };
            if let Some(n) = population {
                config.population_size = n;
            }
            if let Some(e) = elite_percentage {
                config.elite_percentage = e;
            }
            if let Some(m) = mutation_rate {
                config.mutation_rate = m;
            }
            if let Some(k) = crossover_points {
                config.crossover_points = k;
            }
            if specializations.is_some() {
                config.specializations = specializations;
            }

            let seed = evolve.seed.unwrap_or_else(rand::random);
            info!("Using seed {}", seed);
            let manager = PopulationManager::new(config, StrategyRegistry::builtin(), seed)?;
            run_evolution(manager, &evolve, checkpoint_dir).await?;
        }
        Commands::Resume {
            checkpoint,
            checkpoint_dir,
            evolve,
        } => {
            let seed = evolve.seed.unwrap_or_else(rand::random);
            info!("Resuming from {} with seed {}", checkpoint.display(), seed);
            let manager = PopulationManager::load_checkpoint(&checkpoint, StrategyRegistry::builtin(), seed)
                .await
                .with_context(|| format!("Failed to load checkpoint {}", checkpoint.display()))?;
            run_evolution(manager, &evolve, checkpoint_dir).await?;
        }
        Commands::Inspect { checkpoint } => {
            let manager = PopulationManager::load_checkpoint(&checkpoint, StrategyRegistry::builtin(), 0)
                .await
                .with_context(|| format!("Failed to load checkpoint {}", checkpoint.display()))?;
            println!("{}", serde_json::to_string_pretty(&manager.population_summary())?);
        }
    }

    Ok(())
}

async fn run_evolution(
    manager: PopulationManager,
    args: &EvolveArgs,
    checkpoint_dir: Option<PathBuf>,
) -> Result<()> {
    let theorems = match &args.theorems {
        Some(path) => load_theorems(path)?,
        None => synthetic_theorems(args.synthetic),
    };
    let mut manager = manager.with_theorems(theorems);

    if let Some(dir) = &checkpoint_dir {
        let store = JsonCheckpointStore::new(dir).await?;
        info!("Writing checkpoints to {}", store.root().display());
        manager = manager.with_checkpoint_store(Arc::new(store));
    }

    manager.evolve(args.generations).await?;

    if checkpoint_dir.is_some() {
        let name = manager.save_checkpoint().await?;
        println!("Checkpoint: {}", name);
    }

    print_summary(&manager.population_summary());
    Ok(())
}

fn load_config(path: &Path) -> Result<PopulationConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: PopulationConfig = serde_json::from_str(&json)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}

fn load_theorems(path: &Path) -> Result<Vec<TheoremSpec>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read theorems {}", path.display()))?;
    let theorems: Vec<TheoremSpec> = serde_json::from_str(&json)
        .with_context(|| format!("Invalid theorem file {}", path.display()))?;
    if theorems.is_empty() {
        anyhow::bail!("Theorem file {} is empty", path.display());
    }
    Ok(theorems)
}

fn synthetic_theorems(n: usize) -> Vec<TheoremSpec> {
    (1..=n)
        .map(|i| {
            TheoremSpec::new(format!("SYN_{:03}", i))
                .with_field("natural_language", json!(format!("Synthetic theorem {}", i)))
                .with_field("difficulty", json!(i as f64 / n as f64))
        })
        .collect()
}

fn print_summary(summary: &PopulationSummary) {
    println!("Generation {} ({} agents)", summary.generation, summary.population_size);
    println!("  Avg fitness: {:.4}", summary.avg_fitness);
    println!("  Max fitness: {:.4}", summary.max_fitness);
    println!("  Avg success rate: {:.2}%", summary.avg_success_rate * 100.0);
    println!("Elite agents:");
    for elite in &summary.elite_agents {
        println!(
            "  {} | {} | gen {} | fitness {:.4} | success {:.2}%",
            elite.agent_id,
            elite.specialization.as_deref().unwrap_or("baseline"),
            elite.generation,
            elite.fitness,
            elite.success_rate * 100.0,
        );
    }
}
