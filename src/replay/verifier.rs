//! Replay harness
//!
//! Rebuilds a fresh pipeline from stored history and checks that it lands
//! on the persisted snapshots. Never writes to the store.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::types::{
    Mismatch, RejectedTick, ReplayField, ReplayReport, ReplayRequest, ReplaySummary,
};
use crate::common::errors::{EngineError, Result};
use crate::common::traits::GameStore;
use crate::common::types::{ProjectionSnapshot, Tick};
use crate::model::{GamePipeline, SportModel};

/// Output of running a tick history through a fresh pipeline
#[derive(Debug, Clone, Default)]
pub struct ReplayRun {
    pub snapshots: Vec<ProjectionSnapshot>,
    pub rejected: Vec<RejectedTick>,
}

/// Run every tick in delivery order through a new pipeline
///
/// Validation failures are recorded and skipped, the same way the live
/// path skips them. Any other error aborts the run.
pub fn replay_history<M: SportModel>(
    model: Arc<M>,
    game_id: &str,
    priors: M::Priors,
    ticks: &[Tick<M::Stats>],
) -> Result<ReplayRun> {
    let mut pipeline = GamePipeline::new(model, game_id, priors);
    let mut run = ReplayRun::default();

    for tick in ticks {
        match pipeline.process(tick) {
            Ok(snapshot) => run.snapshots.push(snapshot),
            Err(EngineError::Validation(err)) => run.rejected.push(RejectedTick {
                tick_id: tick.tick_id,
                sequence: tick.sequence,
                reason: err.to_string(),
            }),
            Err(e) => return Err(e),
        }
    }
    Ok(run)
}

/// Difference outside tolerance, NaN included
fn exceeds(diff: f64, tolerance: f64) -> bool {
    !(diff.abs() <= tolerance)
}

#[derive(Debug, Default)]
struct Comparison {
    mismatches: Vec<Mismatch>,
    input_drift: Vec<i64>,
    unmatched: Vec<i64>,
    orphaned: Vec<i64>,
}

fn compare(
    recomputed: &[ProjectionSnapshot],
    stored: &[ProjectionSnapshot],
    tolerance: f64,
) -> Comparison {
    let by_tick: BTreeMap<i64, &ProjectionSnapshot> =
        stored.iter().map(|s| (s.tick_id, s)).collect();
    let mut seen = HashSet::new();
    let mut out = Comparison::default();

    for fresh in recomputed {
        let Some(old) = by_tick.get(&fresh.tick_id) else {
            out.unmatched.push(fresh.tick_id);
            continue;
        };
        seen.insert(fresh.tick_id);

        if old.input_digest != fresh.input_digest {
            out.input_drift.push(fresh.tick_id);
        }

        for field in ReplayField::ALL {
            let stored_value = field.read(old);
            let recomputed_value = field.read(fresh);
            let diff = recomputed_value - stored_value;
            if exceeds(diff, tolerance) {
                out.mismatches.push(Mismatch {
                    tick_id: fresh.tick_id,
                    field,
                    stored: stored_value,
                    recomputed: recomputed_value,
                    diff,
                });
            }
        }
    }

    out.orphaned = by_tick
        .keys()
        .filter(|id| !seen.contains(id))
        .copied()
        .collect();
    out
}

fn build_report(
    game_id: &str,
    ticks: &[Tick<impl Sized>],
    run: ReplayRun,
    comparison: Comparison,
) -> ReplayReport {
    ReplayReport {
        game_id: game_id.to_string(),
        tick_count: ticks.len(),
        is_deterministic: comparison.mismatches.is_empty(),
        mismatches: comparison.mismatches,
        summary: ReplaySummary {
            first_tick: ticks.first().map(|t| t.tick_id),
            last_tick: ticks.last().map(|t| t.tick_id),
        },
        rejected_ticks: run.rejected,
        input_drift: comparison.input_drift,
        unmatched_ticks: comparison.unmatched,
        orphaned_snapshots: comparison.orphaned,
    }
}

/// Run the same history twice and compare the two runs
///
/// Needs no store; catches any hidden state or nondeterminism in the model.
pub fn verify_determinism<M: SportModel>(
    model: Arc<M>,
    game_id: &str,
    priors: &M::Priors,
    ticks: &[Tick<M::Stats>],
    tolerance: f64,
) -> Result<ReplayReport> {
    let first = replay_history(Arc::clone(&model), game_id, priors.clone(), ticks)?;
    let second = replay_history(model, game_id, priors.clone(), ticks)?;
    let comparison = compare(&second.snapshots, &first.snapshots, tolerance);
    Ok(build_report(game_id, ticks, second, comparison))
}

/// Replays a game's stored history against its persisted snapshots
pub struct ReplayVerifier<M, St> {
    model: Arc<M>,
    store: Arc<St>,
}

impl<M, St> ReplayVerifier<M, St>
where
    M: SportModel,
    St: GameStore<M::Stats, M::Priors>,
{
    pub fn new(model: Arc<M>, store: Arc<St>) -> Self {
        Self { model, store }
    }

    /// Recompute every tick and compare
    ///
    /// Store failures propagate unchanged so the caller can check
    /// [`EngineError::is_retryable`].
    #[instrument(skip(self, request), fields(game_id = %request.game_id))]
    pub async fn run(&self, request: &ReplayRequest) -> Result<ReplayReport> {
        let game_id = request.game_id.as_str();
        let ticks = self.store.load_ticks(game_id).await?;
        let priors = self.store.load_priors(game_id).await?;
        let stored = if request.verify_against_stored {
            self.store.load_snapshots(game_id).await?
        } else {
            Vec::new()
        };

        info!("Replaying {} ticks for {}", ticks.len(), game_id);
        let run = replay_history(Arc::clone(&self.model), game_id, priors, &ticks)?;

        let comparison = if request.verify_against_stored {
            compare(&run.snapshots, &stored, request.tolerance)
        } else {
            Comparison::default()
        };

        for m in &comparison.mismatches {
            warn!(
                "Replay mismatch for {} tick {}: {} stored={} recomputed={} diff={}",
                game_id, m.tick_id, m.field, m.stored, m.recomputed, m.diff
            );
        }
        if !comparison.input_drift.is_empty() {
            warn!(
                "Input digest changed for {} ticks of {}",
                comparison.input_drift.len(),
                game_id
            );
        }

        let report = build_report(game_id, &ticks, run, comparison);
        info!(
            "Replay of {} finished: deterministic={} mismatches={} rejected={}",
            game_id,
            report.is_deterministic,
            report.mismatches.len(),
            report.rejected_ticks.len()
        );
        Ok(report)
    }
}
