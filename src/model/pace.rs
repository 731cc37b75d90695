//! Possession estimation and pace blending

use serde::{Deserialize, Serialize};

use super::basketball::TeamBox;
use crate::common::math::{blend, safe_div, unit};

/// Box-score possession estimate
#[derive(Debug, Clone, Copy)]
pub struct PossessionEstimator {
    fta_factor: f64,
}

impl PossessionEstimator {
    pub fn new(fta_factor: f64) -> Self {
        Self { fta_factor }
    }

    /// `max(0, FGA + TOV + factor * FTA - ORB)`
    pub fn team(&self, team: &TeamBox) -> f64 {
        let raw = team.fga as f64 + team.tov as f64 + self.fta_factor * team.fta as f64
            - team.orb as f64;
        raw.max(0.0)
    }

    /// Average of both teams' estimates
    pub fn game(&self, home: &TeamBox, away: &TeamBox) -> f64 {
        (self.team(home) + self.team(away)) / 2.0
    }
}

/// Output of [`PaceBlender::estimate`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaceEstimate {
    /// Observed volume scaled to a full regulation game
    pub live_pace: f64,
    /// `clamp(elapsed / regulation, 0, 1)`
    pub weight: f64,
    /// Live pace blended with the prior
    pub blended_pace: f64,
    /// Volume expected over the remaining minutes
    pub remaining: f64,
}

/// Blends live pace with the pregame prior by elapsed-time fraction
#[derive(Debug, Clone, Copy)]
pub struct PaceBlender {
    regulation_minutes: f64,
}

impl PaceBlender {
    pub fn new(regulation_minutes: f64) -> Self {
        Self { regulation_minutes }
    }

    /// Blend observed `volume` (possessions or shots) with `prior` pace
    ///
    /// At zero elapsed time the weight is 0 and the estimate is exactly the
    /// prior; early samples must not dominate.
    pub fn estimate(&self, volume: f64, elapsed: f64, remaining: f64, prior: f64) -> PaceEstimate {
        let live_pace = if elapsed > 0.0 {
            safe_div(volume, elapsed, 0.0) * self.regulation_minutes
        } else {
            prior
        };
        let weight = unit(safe_div(elapsed, self.regulation_minutes, 0.0));
        let blended_pace = blend(live_pace, prior, weight);
        let remaining = safe_div(remaining.max(0.0), self.regulation_minutes, 0.0) * blended_pace;

        PaceEstimate {
            live_pace,
            weight,
            blended_pace,
            remaining,
        }
    }
}
