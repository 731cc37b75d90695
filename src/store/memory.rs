//! In-memory game store
//!
//! Backs the CLI's file mode and the test suite. Honors the same
//! write-once contract as the database store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::common::errors::{EngineError, Result};
use crate::common::traits::GameStore;
use crate::common::types::{ProjectionSnapshot, Tick};

/// Everything stored for one game, as read from or written to a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord<S, P> {
    pub game_id: String,
    pub priors: P,
    pub ticks: Vec<Tick<S>>,
    #[serde(default)]
    pub snapshots: Vec<ProjectionSnapshot>,
}

/// Store held entirely in memory
pub struct MemoryStore<S, P> {
    ticks: RwLock<HashMap<String, Vec<Tick<S>>>>,
    priors: RwLock<HashMap<String, P>>,
    snapshots: RwLock<HashMap<String, BTreeMap<i64, ProjectionSnapshot>>>,
    unavailable: AtomicBool,
}

impl<S, P> MemoryStore<S, P> {
    pub fn new() -> Self {
        Self {
            ticks: RwLock::new(HashMap::new()),
            priors: RwLock::new(HashMap::new()),
            snapshots: RwLock::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Load a full game record
    ///
    /// Stored snapshots go through the write-once path, so a record with
    /// two snapshots for the same tick is rejected.
    pub async fn from_record(record: GameRecord<S, P>) -> Result<Self> {
        let store = Self::new();
        store.insert_priors(&record.game_id, record.priors).await;
        for tick in record.ticks {
            store.append_tick(tick).await;
        }
        for snapshot in record.snapshots {
            store.insert_snapshot(snapshot).await?;
        }
        Ok(store)
    }

    /// Append a tick to a game's delivery log
    pub async fn append_tick(&self, tick: Tick<S>) {
        self.ticks
            .write()
            .await
            .entry(tick.game_id.clone())
            .or_default()
            .push(tick);
    }

    pub async fn insert_priors(&self, game_id: &str, priors: P) {
        self.priors.write().await.insert(game_id.to_string(), priors);
    }

    /// Simulate the upstream store going away (or coming back)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of persisted snapshots for a game
    pub async fn snapshot_count(&self, game_id: &str) -> usize {
        self.snapshots
            .read()
            .await
            .get(game_id)
            .map(|s| s.len())
            .unwrap_or(0)
    }

    async fn insert_snapshot(&self, snapshot: ProjectionSnapshot) -> Result<()> {
        let mut snapshots = self.snapshots.write().await;
        let game = snapshots.entry(snapshot.game_id.clone()).or_default();
        if game.contains_key(&snapshot.tick_id) {
            return Err(EngineError::SnapshotExists {
                game_id: snapshot.game_id,
                tick_id: snapshot.tick_id,
            });
        }
        game.insert(snapshot.tick_id, snapshot);
        Ok(())
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(EngineError::StoreUnavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

impl<S, P> Default for MemoryStore<S, P> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S, P> GameStore<S, P> for MemoryStore<S, P>
where
    S: Clone + Send + Sync + 'static,
    P: Clone + Send + Sync + 'static,
{
    async fn load_ticks(&self, game_id: &str) -> Result<Vec<Tick<S>>> {
        self.ensure_available()?;
        self.ticks
            .read()
            .await
            .get(game_id)
            .cloned()
            .ok_or_else(|| EngineError::GameNotFound(game_id.to_string()))
    }

    async fn load_priors(&self, game_id: &str) -> Result<P> {
        self.ensure_available()?;
        self.priors
            .read()
            .await
            .get(game_id)
            .cloned()
            .ok_or_else(|| EngineError::PriorsNotFound(game_id.to_string()))
    }

    async fn load_snapshots(&self, game_id: &str) -> Result<Vec<ProjectionSnapshot>> {
        self.ensure_available()?;
        Ok(self
            .snapshots
            .read()
            .await
            .get(game_id)
            .map(|s| s.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn save_snapshot(&self, snapshot: &ProjectionSnapshot) -> Result<()> {
        self.ensure_available()?;
        self.insert_snapshot(snapshot.clone()).await
    }
}
