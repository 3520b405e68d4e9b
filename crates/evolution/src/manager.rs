//! The population manager - runs the generational loop.

use std::path::Path;
use std::sync::Arc;

use genprover_core::{
    Agent, AgentId, Checkpoint, Genotype, PopulationConfig, PopulationStats, TheoremSpec,
    CHECKPOINT_FORMAT_VERSION,
};
use genprover_storage::{read_checkpoint, write_checkpoint, CheckpointStore, StorageError};
use genprover_strategies::StrategyRegistry;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, info, warn};

use crate::breeding::create_new_generation;
use crate::evaluation::evaluate_population;
use crate::metrics::{collect_stats, EliteSummary, FitnessPoint, PopulationSummary};
use crate::selection::rank;
use crate::{EvolutionError, Result};

/// Callback invoked with every newly collected [`PopulationStats`].
pub type StatsObserver = Box<dyn Fn(&PopulationStats) + Send + Sync>;

/// Owns a population of prover agents and evolves it.
///
/// Each generation runs:
/// ```text
/// Evaluate → Refresh fitness → Rank → Elites + Breed → Replace → Checkpoint
/// ```
/// All randomness comes from a single seeded generator owned by the
/// manager.
pub struct PopulationManager {
    config: PopulationConfig,
    registry: StrategyRegistry,
    rng: ChaCha8Rng,
    agents: Vec<Agent>,
    generation: u32,
    history: Vec<PopulationStats>,
    theorems: Vec<TheoremSpec>,
    store: Option<Arc<dyn CheckpointStore>>,
    observer: Option<StatsObserver>,
}

impl PopulationManager {
    /// Create a fresh generation-0 population.
    ///
    /// Specializations from the config are assigned round-robin and each
    /// agent's strategy gets to bias its random genotype.
    pub fn new(config: PopulationConfig, registry: StrategyRegistry, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let tags = config.specializations.clone().unwrap_or_default();
        for tag in &tags {
            if !registry.contains(tag) {
                warn!(tag = %tag, "Unknown specialization, agents will use the baseline strategy");
            }
        }

        let agents: Vec<Agent> = (0..config.population_size)
            .map(|i| {
                let specialization = (!tags.is_empty()).then(|| tags[i % tags.len()].clone());
                let mut genotype = Genotype::random_in(&mut rng, config.mutation_probability_bounds());
                registry
                    .resolve(specialization.as_deref())
                    .seed_genotype(&mut genotype, &mut rng);
                Agent::new(genotype, specialization)
            })
            .collect();

        info!(
            population = agents.len(),
            specializations = tags.len(),
            seed,
            "Initialized population"
        );

        let mut manager = Self::assemble(config, registry, rng, agents, 0);
        manager.record_stats();
        Ok(manager)
    }

    fn assemble(
        config: PopulationConfig,
        registry: StrategyRegistry,
        rng: ChaCha8Rng,
        agents: Vec<Agent>,
        generation: u32,
    ) -> Self {
        Self {
            config,
            registry,
            rng,
            agents,
            generation,
            history: Vec::new(),
            theorems: Vec::new(),
            store: None,
            observer: None,
        }
    }

    /// Set the theorems agents are evaluated on.
    pub fn with_theorems(mut self, theorems: Vec<TheoremSpec>) -> Self {
        self.theorems = theorems;
        self
    }

    /// Replace the evaluation theorems.
    pub fn set_theorems(&mut self, theorems: Vec<TheoremSpec>) {
        self.theorems = theorems;
    }

    /// Persist checkpoints through `store`.
    pub fn with_checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Call `observer` with every new generation's statistics.
    ///
    /// The observer is first called with the latest statistics already
    /// recorded, so it also sees the initial or restored population.
    pub fn with_stats_observer(mut self, observer: impl Fn(&PopulationStats) + Send + Sync + 'static) -> Self {
        if let Some(latest) = self.history.last() {
            observer(latest);
        }
        self.observer = Some(Box::new(observer));
        self
    }

    /// Evolve for `num_generations` generations and return the final elites.
    ///
    /// A failed or timed-out automatic checkpoint is logged and does not stop
    /// evolution.
    ///
    /// Evaluation is CPU-bound. On a multi-threaded runtime each generation
    /// runs under [`tokio::task::block_in_place`] so other tasks move off
    /// this worker; on a current-thread runtime it blocks the runtime until
    /// the generation completes.
    pub async fn evolve(&mut self, num_generations: u32) -> Result<Vec<&Agent>> {
        for _ in 0..num_generations {
            self.run_generation_in_place()?;

            if self.checkpoint_due() {
                match self.save_checkpoint_with_timeout().await {
                    Ok(name) => debug!(checkpoint = %name, "Automatic checkpoint written"),
                    Err(e) => warn!(generation = self.generation, "Automatic checkpoint failed: {}", e),
                }
            }
        }
        Ok(self.get_elite_agents(None))
    }

    /// Run a single generation without checkpointing.
    pub fn run_generation(&mut self) -> Result<()> {
        info!(
            "Starting generation {} ({} agents, {} theorems)",
            self.generation + 1,
            self.agents.len(),
            self.theorems.len()
        );

        let seeds: Vec<u64> = (0..self.agents.len()).map(|_| self.rng.gen()).collect();
        evaluate_population(&mut self.agents, &self.theorems, &self.registry, &seeds);

        let max_age = self.config.fitness_max_age();
        for agent in &mut self.agents {
            if agent.needs_fitness_refresh(max_age) {
                agent.fitness();
            }
        }

        let ranking = rank(&self.agents);
        let next = create_new_generation(&self.agents, &ranking, &self.config, &mut self.rng)?;
        self.agents = next;
        self.generation += 1;

        let stats = self.record_stats();
        info!(
            generation = stats.generation,
            avg_fitness = stats.avg_fitness,
            max_fitness = stats.max_fitness,
            avg_success_rate = stats.avg_success_rate,
            "Generation complete"
        );
        Ok(())
    }

    fn run_generation_in_place(&mut self) -> Result<()> {
        match Handle::try_current().map(|h| h.runtime_flavor()) {
            Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(|| self.run_generation()),
            _ => self.run_generation(),
        }
    }

    fn record_stats(&mut self) -> &PopulationStats {
        let elite_count = PopulationConfig::elite_count_for(self.agents.len(), self.config.elite_percentage);
        let stats = collect_stats(&self.agents, self.generation, elite_count);
        if let Some(observer) = &self.observer {
            observer(&stats);
        }
        self.history.push(stats);
        &self.history[self.history.len() - 1]
    }

    fn checkpoint_due(&self) -> bool {
        match (self.config.checkpoint_interval, &self.store) {
            (Some(interval), Some(_)) if interval > 0 => self.generation % interval == 0,
            _ => false,
        }
    }

    async fn save_checkpoint_with_timeout(&self) -> Result<String> {
        let limit = self.config.checkpoint_timeout();
        tokio::time::timeout(limit, self.save_checkpoint())
            .await
            .map_err(|_| EvolutionError::CheckpointTimeout(limit))?
    }

    /// Top agents by latest fitness, best first.
    ///
    /// Returns `max(1, floor(len * percentage))` agents; `None` uses the
    /// configured elite percentage.
    pub fn get_elite_agents(&self, percentage: Option<f64>) -> Vec<&Agent> {
        let pct = percentage.unwrap_or(self.config.elite_percentage);
        let count = PopulationConfig::elite_count_for(self.agents.len(), pct);
        rank(&self.agents)
            .into_iter()
            .take(count)
            .map(|i| &self.agents[i])
            .collect()
    }

    /// Look up an agent.
    pub fn get_agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    /// Look up an agent mutably.
    pub fn get_agent_mut(&mut self, id: &AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id() == id)
    }

    /// Add an agent to the current population.
    pub fn add_agent(&mut self, agent: Agent) {
        debug!(agent = %agent.id(), "Adding agent to population");
        self.agents.push(agent);
    }

    /// Current agents.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Statistics of every generation since creation or restore.
    pub fn history(&self) -> &[PopulationStats] {
        &self.history
    }

    /// Current generation number.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Configuration in use.
    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Evaluation theorems.
    pub fn theorems(&self) -> &[TheoremSpec] {
        &self.theorems
    }

    /// Summary of the latest statistics and current elites.
    pub fn population_summary(&self) -> PopulationSummary {
        let latest = self.history.last();
        PopulationSummary {
            generation: self.generation,
            population_size: self.agents.len(),
            avg_fitness: latest.map(|s| s.avg_fitness).unwrap_or(0.0),
            max_fitness: latest.map(|s| s.max_fitness).unwrap_or(0.0),
            avg_success_rate: latest.map(|s| s.avg_success_rate).unwrap_or(0.0),
            elite_agents: self.get_elite_agents(None).into_iter().map(EliteSummary::from).collect(),
            trait_distributions: latest.map(|s| s.trait_distributions.clone()).unwrap_or_default(),
        }
    }

    /// Per-generation fitness figures, oldest first.
    pub fn fitness_trend(&self) -> Vec<FitnessPoint> {
        self.history.iter().map(FitnessPoint::from).collect()
    }

    /// Snapshot the population.
    pub fn to_checkpoint(&self) -> Checkpoint {
        Checkpoint {
            format_version: CHECKPOINT_FORMAT_VERSION,
            generation: self.generation,
            timestamp: chrono::Utc::now(),
            config: self.config.clone(),
            agents: self.agents.iter().map(Agent::to_record).collect(),
            history: self.history.iter().map(PopulationStats::summary).collect(),
        }
    }

    /// Save a checkpoint through the configured store.
    pub async fn save_checkpoint(&self) -> Result<String> {
        let store = self.store.as_ref().ok_or(EvolutionError::NoCheckpointStore)?;
        Ok(store.save(&self.to_checkpoint()).await?)
    }

    /// Save a checkpoint to an explicit path.
    pub async fn save_checkpoint_to(&self, path: impl AsRef<Path>) -> Result<()> {
        Ok(write_checkpoint(path.as_ref(), &self.to_checkpoint()).await?)
    }

    /// Restore a manager from a checkpoint file.
    pub async fn load_checkpoint(path: impl AsRef<Path>, registry: StrategyRegistry, seed: u64) -> Result<Self> {
        let checkpoint = read_checkpoint(path.as_ref()).await?;
        Self::from_checkpoint(checkpoint, registry, seed)
    }

    /// Restore a manager from a checkpoint.
    ///
    /// The snapshot is fully validated before anything is built. Proof
    /// attempts and the earlier statistics are not part of a snapshot, so
    /// the restored history holds one fresh entry.
    pub fn from_checkpoint(checkpoint: Checkpoint, registry: StrategyRegistry, seed: u64) -> Result<Self> {
        if checkpoint.format_version != CHECKPOINT_FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: u64::from(checkpoint.format_version),
                expected: CHECKPOINT_FORMAT_VERSION,
            }
            .into());
        }
        let agents = checkpoint.restore_agents()?;

        info!(
            generation = checkpoint.generation,
            agents = agents.len(),
            "Restored population from checkpoint"
        );

        let rng = ChaCha8Rng::seed_from_u64(seed);
        let mut manager = Self::assemble(checkpoint.config, registry, rng, agents, checkpoint.generation);
        manager.record_stats();
        Ok(manager)
    }
}

impl std::fmt::Debug for PopulationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopulationManager")
            .field("generation", &self.generation)
            .field("agents", &self.agents.len())
            .field("theorems", &self.theorems.len())
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genprover_core::{GeneticTrait, ProofStep, ProofStrategy, ResourceUsage, StrategyError, StrategyOutcome};
    use genprover_storage::JsonCheckpointStore;
    use rand::RngCore;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn config(population_size: usize) -> PopulationConfig {
        PopulationConfig {
            population_size,
            ..Default::default()
        }
    }

    fn theorems(n: usize) -> Vec<TheoremSpec> {
        (0..n).map(|i| TheoremSpec::new(format!("T{}", i))).collect()
    }

    struct Broken;

    impl ProofStrategy for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn attempt(
            &self,
            _theorem: &TheoremSpec,
            _genotype: &Genotype,
            _rng: &mut dyn RngCore,
        ) -> std::result::Result<StrategyOutcome, StrategyError> {
            Err(StrategyError::Failed("prover offline".into()))
        }
    }

    /// Reports resource figures that no real prover could.
    struct Overdrawn(f64);

    impl ProofStrategy for Overdrawn {
        fn name(&self) -> &str {
            "overdrawn"
        }

        fn attempt(
            &self,
            _theorem: &TheoremSpec,
            _genotype: &Genotype,
            _rng: &mut dyn RngCore,
        ) -> std::result::Result<StrategyOutcome, StrategyError> {
            Ok(StrategyOutcome {
                steps: vec![ProofStep::new(1, "spend", "done", 0.9)],
                success: true,
                resources_used: ResourceUsage::new(self.0, 100.0),
                verification_result: None,
            })
        }
    }

    #[test]
    fn test_new_population() {
        let cfg = PopulationConfig {
            specializations: Some(vec!["axiom".into(), "verification".into()]),
            ..config(12)
        };
        let manager = PopulationManager::new(cfg, StrategyRegistry::builtin(), 7).unwrap();

        assert_eq!(manager.agents().len(), 12);
        assert_eq!(manager.generation(), 0);
        assert_eq!(manager.history().len(), 1);
        for (i, agent) in manager.agents().iter().enumerate() {
            let expected = if i % 2 == 0 { "axiom" } else { "verification" };
            assert_eq!(agent.specialization(), Some(expected));
            assert!(agent.genotype().value(GeneticTrait::FormalStrictness) >= 0.7);
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = PopulationManager::new(config(0), StrategyRegistry::builtin(), 1).unwrap_err();
        assert!(matches!(err, EvolutionError::Core(_)));
    }

    #[test]
    fn test_same_seed_same_genotypes() {
        let a = PopulationManager::new(config(8), StrategyRegistry::builtin(), 42).unwrap();
        let b = PopulationManager::new(config(8), StrategyRegistry::builtin(), 42).unwrap();
        let ga: Vec<&Genotype> = a.agents().iter().map(Agent::genotype).collect();
        let gb: Vec<&Genotype> = b.agents().iter().map(Agent::genotype).collect();
        assert_eq!(ga, gb);
    }

    #[tokio::test]
    async fn test_evolve_keeps_size_and_grows_history() {
        let mut manager = PopulationManager::new(config(10), StrategyRegistry::builtin(), 3)
            .unwrap()
            .with_theorems(theorems(3));

        let elites = manager.evolve(5).await.unwrap();
        assert_eq!(elites.len(), 1);

        assert_eq!(manager.generation(), 5);
        assert_eq!(manager.agents().len(), 10);
        assert_eq!(manager.history().len(), 6);
        let generations: Vec<u32> = manager.history().iter().map(|s| s.generation).collect();
        assert_eq!(generations, vec![0, 1, 2, 3, 4, 5]);
        assert!(manager.history().iter().all(|s| s.population_size == 10));
    }

    #[test]
    fn test_elites_survive_a_generation() {
        let mut manager = PopulationManager::new(
            PopulationConfig {
                elite_percentage: 0.2,
                ..config(10)
            },
            StrategyRegistry::builtin(),
            5,
        )
        .unwrap()
        .with_theorems(theorems(4));

        manager.run_generation().unwrap();

        let (elders, children): (Vec<&Agent>, Vec<&Agent>) =
            manager.agents().iter().partition(|a| a.generation() == 0);
        assert_eq!(elders.len(), 2);
        assert!(elders.iter().all(|a| a.total_attempts() == 4 && !a.fitness_history().is_empty()));
        assert_eq!(children.len(), 8);
        assert!(children.iter().all(|a| a.total_attempts() == 0 && a.parent_ids().len() == 2));
    }

    #[tokio::test]
    async fn test_failing_strategy_is_tolerated() {
        let registry = StrategyRegistry::new(Arc::new(Broken));
        let mut manager = PopulationManager::new(config(6), registry, 9)
            .unwrap()
            .with_theorems(theorems(2));

        manager.evolve(2).await.unwrap();
        assert_eq!(manager.agents().len(), 6);
        let elite = manager.get_elite_agents(None)[0];
        assert!(elite.total_attempts() > 0);
        assert_eq!(elite.proof_successes(), 0);
        // only resource efficiency at baseline usage remains
        assert!((elite.latest_fitness() - 0.05).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_stats_observer_sees_every_generation() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut manager = PopulationManager::new(config(4), StrategyRegistry::builtin(), 11)
            .unwrap()
            .with_theorems(theorems(1))
            .with_stats_observer(move |stats| {
                sink.lock().unwrap().push(stats.generation);
            });

        manager.evolve(3).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_evolve_on_multi_thread_runtime() {
        let mut manager = PopulationManager::new(config(6), StrategyRegistry::builtin(), 12)
            .unwrap()
            .with_theorems(theorems(2));

        let ticker = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        });
        manager.evolve(3).await.unwrap();
        ticker.await.unwrap();

        assert_eq!(manager.generation(), 3);
        assert_eq!(manager.agents().len(), 6);
    }

    #[tokio::test]
    async fn test_malformed_resources_survive_checkpoint_round_trip() {
        let dir = TempDir::new().unwrap();

        for (i, memory) in [-500.0, -400.0, f64::NAN].into_iter().enumerate() {
            let registry = StrategyRegistry::new(Arc::new(Overdrawn(memory)));
            let mut manager = PopulationManager::new(config(4), registry, 31)
                .unwrap()
                .with_theorems(theorems(2));
            manager.evolve(1).await.unwrap();

            for agent in manager.agents() {
                assert!((0.0..=1.0).contains(&agent.latest_fitness()));
            }

            let path = dir.path().join(format!("cp{}.json", i));
            manager.save_checkpoint_to(&path).await.unwrap();
            let restored = PopulationManager::load_checkpoint(&path, StrategyRegistry::builtin(), 1)
                .await
                .unwrap();
            assert_eq!(restored.agents().len(), 4);
        }
    }

    #[tokio::test]
    async fn test_save_without_store() {
        let manager = PopulationManager::new(config(4), StrategyRegistry::builtin(), 1).unwrap();
        let err = manager.save_checkpoint().await.unwrap_err();
        assert!(matches!(err, EvolutionError::NoCheckpointStore));
    }

    #[tokio::test]
    async fn test_checkpoint_round_trip_is_lossy_in_history() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("population.json");

        let mut manager = PopulationManager::new(config(8), StrategyRegistry::builtin(), 21)
            .unwrap()
            .with_theorems(theorems(3));
        manager.evolve(3).await.unwrap();
        assert_eq!(manager.to_checkpoint().history.len(), 4);
        manager.save_checkpoint_to(&path).await.unwrap();

        let restored = PopulationManager::load_checkpoint(&path, StrategyRegistry::builtin(), 22)
            .await
            .unwrap();

        assert_eq!(restored.generation(), 3);
        assert_eq!(restored.config(), manager.config());
        assert_eq!(restored.history().len(), 1);
        assert_eq!(restored.history()[0].generation, 3);
        for (a, b) in manager.agents().iter().zip(restored.agents()) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.genotype(), b.genotype());
            assert_eq!(a.fitness_history(), b.fitness_history());
            assert_eq!(a.total_attempts(), b.total_attempts());
            assert!(b.proof_attempts().is_empty());
        }
    }

    #[tokio::test]
    async fn test_automatic_checkpoints() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(JsonCheckpointStore::new(dir.path()).await.unwrap());

        let mut manager = PopulationManager::new(
            PopulationConfig {
                checkpoint_interval: Some(2),
                ..config(4)
            },
            StrategyRegistry::builtin(),
            13,
        )
        .unwrap()
        .with_theorems(theorems(1))
        .with_checkpoint_store(store.clone());

        manager.evolve(4).await.unwrap();

        let names = store.list().await.unwrap();
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("pop_gen0002_"));
        assert!(names[1].starts_with("pop_gen0004_"));
    }

    #[test]
    fn test_from_checkpoint_rejects_bad_snapshots() {
        let manager = PopulationManager::new(config(4), StrategyRegistry::builtin(), 1).unwrap();

        let mut cp = manager.to_checkpoint();
        cp.format_version = 99;
        let err = PopulationManager::from_checkpoint(cp, StrategyRegistry::builtin(), 1).unwrap_err();
        assert!(matches!(
            err,
            EvolutionError::Storage(StorageError::UnsupportedVersion { found: 99, .. })
        ));

        let mut cp = manager.to_checkpoint();
        cp.agents.clear();
        let err = PopulationManager::from_checkpoint(cp, StrategyRegistry::builtin(), 1).unwrap_err();
        assert!(matches!(err, EvolutionError::Core(_)));
    }

    #[test]
    fn test_summary_and_trend() {
        let mut manager = PopulationManager::new(config(5), StrategyRegistry::builtin(), 17)
            .unwrap()
            .with_theorems(theorems(2));
        manager.run_generation().unwrap();
        manager.run_generation().unwrap();

        let summary = manager.population_summary();
        assert_eq!(summary.generation, 2);
        assert_eq!(summary.population_size, 5);
        assert_eq!(summary.elite_agents.len(), 1);
        assert_eq!(summary.trait_distributions.len(), GeneticTrait::ALL.len());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["trait_distributions"][0]["trait"], "decomposition_depth");

        let trend = manager.fitness_trend();
        assert_eq!(trend.iter().map(|p| p.generation).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_add_and_get_agents() {
        let mut manager = PopulationManager::new(config(3), StrategyRegistry::builtin(), 2).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let extra = Agent::new(Genotype::random(&mut rng), None);
        let id = extra.id().clone();

        manager.add_agent(extra);
        assert_eq!(manager.agents().len(), 4);
        assert!(manager.get_agent(&id).is_some());
        assert!(manager.get_agent_mut(&id).is_some());
        assert!(manager.get_agent(&AgentId::new()).is_none());
    }
}
