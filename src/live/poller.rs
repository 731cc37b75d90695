//! Live polling job
//!
//! Each cycle pulls new ticks for every tracked game from the store, runs
//! them through that game's pipeline and persists the snapshots. Games are
//! processed on their own tasks; the only thing they share is the read-only
//! model and the store handle.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use crate::common::errors::{EngineError, Result};
use crate::common::traits::GameStore;
use crate::common::types::ProjectionSnapshot;
use crate::model::{GamePipeline, SportModel};

/// Per-game polling state, owned by whichever task is processing the game
struct GameState<M: SportModel> {
    pipeline: Option<GamePipeline<M>>,
    /// Index of the next unseen tick in the store's delivery log
    cursor: usize,
    /// Snapshots computed but not yet persisted
    pending: Vec<ProjectionSnapshot>,
}

impl<M: SportModel> GameState<M> {
    fn new() -> Self {
        Self {
            pipeline: None,
            cursor: 0,
            pending: Vec::new(),
        }
    }
}

/// Counts for one game in one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleStats {
    pub processed: usize,
    pub saved: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

/// Totals for one polling cycle across all games
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollSummary {
    pub games: usize,
    pub processed: usize,
    pub saved: usize,
    pub duplicates: usize,
    pub rejected: usize,
    /// Games whose cycle stopped on a store error
    pub failed: Vec<String>,
}

impl PollSummary {
    fn absorb(&mut self, stats: &CycleStats) {
        self.processed += stats.processed;
        self.saved += stats.saved;
        self.duplicates += stats.duplicates;
        self.rejected += stats.rejected;
    }
}

pub struct LivePoller<M: SportModel, St> {
    model: Arc<M>,
    store: Arc<St>,
    games: HashMap<String, GameState<M>>,
    poll_interval: Duration,
}

impl<M, St> LivePoller<M, St>
where
    M: SportModel + 'static,
    St: GameStore<M::Stats, M::Priors> + 'static,
{
    pub fn new(model: Arc<M>, store: Arc<St>, poll_interval: Duration) -> Self {
        Self {
            model,
            store,
            games: HashMap::new(),
            poll_interval,
        }
    }

    /// Start tracking a game; a no-op if it is already tracked
    pub fn track(&mut self, game_id: impl Into<String>) {
        self.games.entry(game_id.into()).or_insert_with(GameState::new);
    }

    /// Stop tracking a game and drop its pipeline
    pub fn untrack(&mut self, game_id: &str) -> bool {
        self.games.remove(game_id).is_some()
    }

    pub fn tracked(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.games.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Run one polling cycle over every tracked game
    pub async fn poll_once(&mut self) -> PollSummary {
        let ids: Vec<String> = self.games.keys().cloned().collect();
        let mut tasks = JoinSet::new();

        for (game_id, state) in self.games.drain() {
            let model = Arc::clone(&self.model);
            let store = Arc::clone(&self.store);
            tasks.spawn(async move {
                let mut state = state;
                let outcome = poll_game(model, store.as_ref(), &game_id, &mut state).await;
                (game_id, state, outcome)
            });
        }

        let mut summary = PollSummary {
            games: ids.len(),
            ..PollSummary::default()
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((game_id, state, outcome)) => {
                    match outcome {
                        Ok(stats) => summary.absorb(&stats),
                        Err(e) => {
                            if e.is_retryable() {
                                warn!("Store error for {}, retrying next cycle: {}", game_id, e);
                            } else {
                                error!("Polling {} failed: {}", game_id, e);
                            }
                            summary.failed.push(game_id.clone());
                        }
                    }
                    self.games.insert(game_id, state);
                }
                Err(e) => error!("Game task aborted: {}", e),
            }
        }

        // A task that panicked lost its pipeline; start that game over.
        // Snapshots it already wrote come back as duplicates.
        for game_id in ids {
            if !self.games.contains_key(&game_id) {
                warn!("Resetting state for {}", game_id);
                summary.failed.push(game_id.clone());
                self.games.insert(game_id, GameState::new());
            }
        }

        summary.failed.sort();
        summary
    }

    /// Poll on the configured interval until the stop signal flips to true
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Live poller started: {} games every {:?}",
            self.games.len(),
            self.poll_interval
        );

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let summary = self.poll_once().await;
                    debug!(
                        games = summary.games,
                        saved = summary.saved,
                        rejected = summary.rejected,
                        failed = summary.failed.len(),
                        "Poll cycle complete"
                    );
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Live poller stopped");
    }
}

/// Advance one game by whatever the store has that we have not seen
#[instrument(skip(model, store, state))]
async fn poll_game<M, St>(
    model: Arc<M>,
    store: &St,
    game_id: &str,
    state: &mut GameState<M>,
) -> Result<CycleStats>
where
    M: SportModel,
    St: GameStore<M::Stats, M::Priors>,
{
    let mut stats = CycleStats::default();

    while let Some(snapshot) = state.pending.first() {
        persist::<M::Stats, M::Priors, St>(store, snapshot, &mut stats).await?;
        state.pending.remove(0);
    }

    if state.pipeline.is_none() {
        let priors = store.load_priors(game_id).await?;
        info!("Loaded priors for {}", game_id);
        state.pipeline = Some(GamePipeline::new(model, game_id, priors));
    }
    let Some(pipeline) = state.pipeline.as_mut() else {
        return Err(EngineError::Internal(format!("no pipeline for {}", game_id)));
    };

    let ticks = match store.load_ticks(game_id).await {
        Ok(ticks) => ticks,
        Err(EngineError::GameNotFound(_)) => {
            debug!("No ticks yet for {}", game_id);
            return Ok(stats);
        }
        Err(e) => return Err(e),
    };

    for tick in ticks.iter().skip(state.cursor) {
        state.cursor += 1;
        stats.processed += 1;
        match pipeline.process(tick) {
            Ok(snapshot) => {
                if let Err(e) =
                    persist::<M::Stats, M::Priors, St>(store, &snapshot, &mut stats).await
                {
                    state.pending.push(snapshot);
                    return Err(e);
                }
            }
            Err(EngineError::Validation(_)) => stats.rejected += 1,
            Err(e) => return Err(e),
        }
    }

    Ok(stats)
}

async fn persist<S, P, St>(
    store: &St,
    snapshot: &ProjectionSnapshot,
    stats: &mut CycleStats,
) -> Result<()>
where
    S: Send + Sync + 'static,
    P: Send + Sync + 'static,
    St: GameStore<S, P> + ?Sized,
{
    match store.save_snapshot(snapshot).await {
        Ok(()) => {
            stats.saved += 1;
            Ok(())
        }
        Err(EngineError::SnapshotExists { game_id, tick_id }) => {
            debug!("Snapshot for {} tick {} already stored", game_id, tick_id);
            stats.duplicates += 1;
            Ok(())
        }
        Err(e) => Err(e),
    }
}
