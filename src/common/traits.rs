//! Trait definitions for the persistence collaborator

use async_trait::async_trait;

use super::errors::Result;
use super::types::{ProjectionSnapshot, Tick};

/// Trait for the store holding tick history, priors and snapshots
///
/// Implementations are I/O only. Fetch failures must surface as errors
/// whose [`is_retryable`](super::errors::EngineError::is_retryable) reports
/// whether the caller may try again; the engine never retries internally.
#[async_trait]
pub trait GameStore<S, P>: Send + Sync
where
    S: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    /// Load the full tick history for a game in delivery order
    async fn load_ticks(&self, game_id: &str) -> Result<Vec<Tick<S>>>;

    /// Load the pregame priors for a game
    async fn load_priors(&self, game_id: &str) -> Result<P>;

    /// Load every persisted snapshot for a game ordered by tick id
    async fn load_snapshots(&self, game_id: &str) -> Result<Vec<ProjectionSnapshot>>;

    /// Persist a snapshot
    ///
    /// Snapshots are write-once: an existing `(game_id, tick_id)` must
    /// produce [`EngineError::SnapshotExists`](super::errors::EngineError::SnapshotExists)
    /// and leave the stored value untouched.
    async fn save_snapshot(&self, snapshot: &ProjectionSnapshot) -> Result<()>;
}
