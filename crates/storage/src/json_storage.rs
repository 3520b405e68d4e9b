//! JSON file checkpoint store.
//!
//! Each checkpoint is a single pretty-printed JSON document named
//! `pop_gen{generation:04}_{unix_secs}.json`. Writes go to a temporary file
//! that is renamed into place, so a failed save never leaves a partial
//! snapshot behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use genprover_core::{Checkpoint, CHECKPOINT_FORMAT_VERSION};
use tokio::fs;
use tracing::{debug, info};

use super::{CheckpointStore, Result, StorageError};

/// File-based JSON checkpoint store.
#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    root: PathBuf,
}

impl JsonCheckpointStore {
    /// Create the store, creating `root` if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Directory holding the checkpoints.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn checkpoint_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

#[async_trait]
impl CheckpointStore for JsonCheckpointStore {
    async fn save(&self, checkpoint: &Checkpoint) -> Result<String> {
        let name = checkpoint.file_name();
        write_checkpoint(&self.checkpoint_path(&name), checkpoint).await?;
        Ok(name)
    }

    async fn load(&self, name: &str) -> Result<Checkpoint> {
        read_checkpoint(&self.checkpoint_path(name)).await
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut rd = fs::read_dir(&self.root).await?;
        while let Some(entry) = rd.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                if parse_file_name(name).is_some() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort_by_key(|name| parse_file_name(name));
        Ok(names)
    }
}

/// Write a checkpoint to `path` through a temporary sibling file.
///
/// The snapshot is validated first, so a checkpoint that could not be read
/// back is never written.
pub async fn write_checkpoint(path: &Path, checkpoint: &Checkpoint) -> Result<()> {
    checkpoint.validate()?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let json = serde_json::to_string_pretty(checkpoint)?;
    let mut tmp = TempFileGuard::new(path.with_extension("json.tmp"));
    fs::write(tmp.path(), json.as_bytes()).await?;
    fs::rename(tmp.path(), path).await?;
    tmp.disarm();

    info!(
        path = %path.display(),
        generation = checkpoint.generation,
        agents = checkpoint.agents.len(),
        "Saved checkpoint"
    );
    Ok(())
}

/// Removes the temporary file on drop unless disarmed.
///
/// Covers error returns as well as a save future dropped between the write
/// and the rename.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!(path = %self.path.display(), "Failed to remove temporary checkpoint: {}", e);
                }
            }
        }
    }
}

/// Read a checkpoint from `path`.
///
/// The format version is checked before the document is decoded.
pub async fn read_checkpoint(path: &Path) -> Result<Checkpoint> {
    let json = match fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StorageError::NotFound(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let value: serde_json::Value = serde_json::from_str(&json)?;
    let version = value
        .get("format_version")
        .ok_or_else(|| StorageError::Format("missing format_version".to_string()))?
        .as_u64()
        .ok_or_else(|| StorageError::Format("format_version is not an unsigned integer".to_string()))?;
    if version != u64::from(CHECKPOINT_FORMAT_VERSION) {
        return Err(StorageError::UnsupportedVersion {
            found: version,
            expected: CHECKPOINT_FORMAT_VERSION,
        });
    }

    let checkpoint: Checkpoint = serde_json::from_value(value)?;
    debug!(path = %path.display(), generation = checkpoint.generation, "Read checkpoint");
    Ok(checkpoint)
}

/// `(generation, unix_secs)` of a checkpoint file name.
fn parse_file_name(name: &str) -> Option<(u32, i64)> {
    let stem = name.strip_prefix("pop_gen")?.strip_suffix(".json")?;
    let (generation, timestamp) = stem.split_once('_')?;
    Some((generation.parse().ok()?, timestamp.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use genprover_core::{Agent, Gene, Genotype, PopulationConfig, TRAIT_COUNT};
    use tempfile::TempDir;

    fn checkpoint(generation: u32, secs: i64) -> Checkpoint {
        let agents = (0..3)
            .map(|i| {
                let genotype = Genotype::from_genes([Gene::new(0.1 * i as f64, 0.1); TRAIT_COUNT]);
                Agent::new(genotype, Some("axiom".into())).to_record()
            })
            .collect();
        Checkpoint {
            format_version: CHECKPOINT_FORMAT_VERSION,
            generation,
            timestamp: chrono::DateTime::from_timestamp(secs, 0).unwrap(),
            config: PopulationConfig {
                population_size: 3,
                ..Default::default()
            },
            agents,
            history: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("checkpoints");
        let store = JsonCheckpointStore::new(&root).await.unwrap();
        assert_eq!(store.root(), root.as_path());
        assert!(root.is_dir());

        let cp = checkpoint(7, 1_700_000_000);
        let name = store.save(&cp).await.unwrap();
        assert_eq!(name, "pop_gen0007_1700000000.json");

        let loaded = store.load(&name).await.unwrap();
        assert_eq!(loaded, cp);
        assert!(!root.join("pop_gen0007_1700000000.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_list_orders_by_generation() {
        let dir = TempDir::new().unwrap();
        let store = JsonCheckpointStore::new(dir.path()).await.unwrap();

        store.save(&checkpoint(10, 1_700_000_100)).await.unwrap();
        store.save(&checkpoint(2, 1_700_000_000)).await.unwrap();
        store.save(&checkpoint(10000, 1_700_000_200)).await.unwrap();
        std::fs::write(dir.path().join("notes.json"), "{}").unwrap();

        let names = store.list().await.unwrap();
        assert_eq!(
            names,
            vec![
                "pop_gen0002_1700000000.json",
                "pop_gen0010_1700000100.json",
                "pop_gen10000_1700000200.json",
            ]
        );

        let latest = store.latest().await.unwrap().unwrap();
        assert_eq!(latest.generation, 10000);
    }

    #[tokio::test]
    async fn test_latest_of_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = JsonCheckpointStore::new(dir.path()).await.unwrap();
        assert!(store.latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_checkpoint(&dir.path().join("nope.json")).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rejects_bad_versions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cp.json");

        let mut value = serde_json::to_value(checkpoint(1, 0)).unwrap();
        value["format_version"] = serde_json::json!(2);
        std::fs::write(&path, value.to_string()).unwrap();
        let err = read_checkpoint(&path).await.unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedVersion { found: 2, expected: 1 }));

        value.as_object_mut().unwrap().remove("format_version");
        std::fs::write(&path, value.to_string()).unwrap();
        let err = read_checkpoint(&path).await.unwrap_err();
        assert!(matches!(err, StorageError::Format(_)));
    }

    #[tokio::test]
    async fn test_rejects_corrupt_genotype() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cp.json");

        let mut value = serde_json::to_value(checkpoint(1, 0)).unwrap();
        value["agents"][0]["genotype"]
            .as_object_mut()
            .unwrap()
            .remove("axiom_selection");
        std::fs::write(&path, value.to_string()).unwrap();

        let err = read_checkpoint(&path).await.unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("run").join("cp.json");
        write_checkpoint(&path, &checkpoint(3, 5)).await.unwrap();
        assert_eq!(read_checkpoint(&path).await.unwrap().generation, 3);
    }

    #[tokio::test]
    async fn test_write_refuses_invalid_checkpoint() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cp.json");

        let mut cp = checkpoint(1, 0);
        cp.agents[0].fitness_history.push(genprover_core::FitnessSample {
            timestamp: chrono::Utc::now(),
            fitness: f64::NAN,
        });
        let err = write_checkpoint(&path, &cp).await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
        assert!(!path.exists());

        cp.agents.clear();
        assert!(matches!(write_checkpoint(&path, &cp).await, Err(StorageError::Validation(_))));
    }

    #[tokio::test]
    async fn test_cancelled_write_leaves_no_checkpoint() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cp.json");

        let result = tokio::time::timeout(std::time::Duration::ZERO, write_checkpoint(&path, &checkpoint(1, 0))).await;
        assert!(result.is_err());
        assert!(!path.exists());

        write_checkpoint(&path, &checkpoint(1, 0)).await.unwrap();
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_temp_file_guard() {
        let dir = TempDir::new().unwrap();
        let dropped = dir.path().join("a.json.tmp");
        let kept = dir.path().join("b.json.tmp");
        std::fs::write(&dropped, "{}").unwrap();
        std::fs::write(&kept, "{}").unwrap();

        drop(TempFileGuard::new(dropped.clone()));
        let mut guard = TempFileGuard::new(kept.clone());
        guard.disarm();
        drop(guard);

        assert!(!dropped.exists());
        assert!(kept.exists());
        drop(TempFileGuard::new(dir.path().join("never-written.json.tmp")));
    }

    #[test]
    fn test_parse_file_name() {
        assert_eq!(parse_file_name("pop_gen0042_123.json"), Some((42, 123)));
        assert_eq!(parse_file_name("pop_gen_x.json"), None);
        assert_eq!(parse_file_name("other.json"), None);
    }
}
