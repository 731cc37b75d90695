//! Generic tick → snapshot pipeline

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, warn};

use super::edge::EdgeScorer;
use super::traits::SportModel;
use super::validator::TickValidator;
use crate::common::errors::Result;
use crate::common::types::{ProjectionSnapshot, Tick};

/// Per-game pipeline state
///
/// Owns the game's immutable priors and its ordering guard. One instance
/// per live game; nothing here is shared between games except the model,
/// which is read-only.
pub struct GamePipeline<M: SportModel> {
    model: Arc<M>,
    game_id: String,
    priors: M::Priors,
    validator: TickValidator<M::Stats>,
}

impl<M: SportModel> GamePipeline<M> {
    pub fn new(model: Arc<M>, game_id: impl Into<String>, priors: M::Priors) -> Self {
        let game_id = game_id.into();
        Self {
            model,
            validator: TickValidator::new(game_id.clone()),
            game_id,
            priors,
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn priors(&self) -> &M::Priors {
        &self.priors
    }

    /// Sequence of the last tick that made it through validation
    pub fn last_sequence(&self) -> Option<u64> {
        self.validator.last_sequence()
    }

    /// Validate, project and score one tick
    ///
    /// Rejected ticks return [`EngineError::Validation`](crate::EngineError::Validation)
    /// and leave the pipeline exactly as it was.
    pub fn process(&mut self, tick: &Tick<M::Stats>) -> Result<ProjectionSnapshot> {
        let model = Arc::clone(&self.model);
        if let Err(err) = self
            .validator
            .admit(tick, |tick, previous| model.check_stats(tick, previous))
        {
            warn!(
                "Rejected tick {} (seq {}) for game {}: {}",
                tick.tick_id, tick.sequence, self.game_id, err
            );
            return Err(err.into());
        }

        let projection = self.model.project(tick, &self.priors);
        let market_line = EdgeScorer::market_line(
            tick.live_market_total,
            self.model.closing_total(&self.priors),
        );
        let edge_z = EdgeScorer::edge_z(projection.fair_value, market_line, projection.volatility);
        let input_digest = input_digest(tick, &self.priors)?;

        debug!(
            game_id = %self.game_id,
            tick_id = tick.tick_id,
            fair_value = projection.fair_value,
            edge_z,
            "Projected tick"
        );

        Ok(ProjectionSnapshot {
            game_id: self.game_id.clone(),
            tick_id: tick.tick_id,
            sequence: tick.sequence,
            sport: self.model.sport(),
            elapsed_minutes: tick.elapsed_minutes,
            remaining_minutes: tick.remaining_minutes,
            projection,
            market_line,
            edge_z,
            input_digest,
        })
    }
}

/// SHA-256 over the canonical JSON of a tick and its priors
pub fn input_digest<S: Serialize, P: Serialize>(tick: &Tick<S>, priors: &P) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(tick)?);
    hasher.update(b"\n");
    hasher.update(serde_json::to_vec(priors)?);
    Ok(hex::encode(hasher.finalize()))
}
