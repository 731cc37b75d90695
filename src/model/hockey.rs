//! Hockey expected-goals model

use serde::{Deserialize, Serialize};

use super::edge::{clamped_volatility, time_decay, VolatilityBounds};
use super::overlay;
use super::pace::PaceBlender;
use super::traits::SportModel;
use super::validator::check_monotonic;
use crate::common::errors::ValidationError;
use crate::common::math::{blend, clamp, safe_div};
use crate::common::types::{Overlay, OverlayKind, Projection, Sport, TeamSide, Tick};
use crate::config::models::HockeyConfig;

/// Manpower state from the shooting team's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    #[default]
    Even,
    PowerPlay,
    ShortHanded,
}

/// Goalie quality bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalieTier {
    Elite,
    #[default]
    Average,
    Weak,
}

/// One shot on goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotEvent {
    pub team: TeamSide,
    pub elapsed_minutes: f64,
    #[serde(default)]
    pub strength: Strength,
    /// Provider play description, e.g. "Slap Shot" or "Breakaway, wrist"
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_goal: bool,
}

/// Hockey tick statistics
///
/// `shots` is cumulative for the game and ordered by elapsed time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HockeyStats {
    pub home_goals: u32,
    pub away_goals: u32,
    /// Team currently playing without its goalie
    #[serde(default)]
    pub goalie_pulled: Option<TeamSide>,
    #[serde(default)]
    pub shots: Vec<ShotEvent>,
}

impl HockeyStats {
    pub fn goals(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Home => self.home_goals,
            TeamSide::Away => self.away_goals,
        }
    }
}

/// Hockey pregame priors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HockeyPriors {
    #[serde(default)]
    pub closing_total: Option<f64>,
    /// Expected combined shots per 60 minutes
    #[serde(default)]
    pub shot_rate: Option<f64>,
    #[serde(default)]
    pub home_goalie: GoalieTier,
    #[serde(default)]
    pub away_goalie: GoalieTier,
}

impl HockeyPriors {
    /// Goalie defending against `shooter`
    pub fn goalie_facing(&self, shooter: TeamSide) -> GoalieTier {
        match shooter {
            TeamSide::Home => self.away_goalie,
            TeamSide::Away => self.home_goalie,
        }
    }
}

/// Situational tag assigned to a shot; at most one applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotContext {
    Breakaway,
    Rebound,
    Deflection,
    WeakSlapShot,
    Standard,
}

/// Hockey model
#[derive(Debug, Clone, Default)]
pub struct HockeyModel {
    config: HockeyConfig,
}

impl HockeyModel {
    pub fn new(config: HockeyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HockeyConfig {
        &self.config
    }

    /// Combined goals per minute implied by the closing line
    pub fn anchor_rate(&self, priors: &HockeyPriors) -> f64 {
        let total = priors
            .closing_total
            .filter(|t| t.is_finite() && *t > 0.0)
            .unwrap_or(self.config.default_total);
        safe_div(total, self.config.regulation_minutes, 0.0)
    }

    /// Classify a shot, highest priority first
    pub fn context(&self, shot: &ShotEvent, previous: Option<&ShotEvent>) -> ShotContext {
        let text = shot.description.to_lowercase();
        if text.contains("breakaway") || text.contains("penalty shot") {
            return ShotContext::Breakaway;
        }
        if let Some(prev) = previous {
            let gap = shot.elapsed_minutes - prev.elapsed_minutes;
            if prev.team == shot.team && gap <= self.config.rebound_window_minutes {
                return ShotContext::Rebound;
            }
        }
        if text.contains("deflect") || text.contains("tip") {
            return ShotContext::Deflection;
        }
        if text.contains("slap") && shot.strength == Strength::Even {
            return ShotContext::WeakSlapShot;
        }
        ShotContext::Standard
    }

    /// Expected-goal value of one shot
    ///
    /// # Arguments
    /// * `previous` - Shot immediately before this one, for rebounds
    /// * `lead` - Shooter's goal lead at the moment of the shot
    pub fn shot_xg(
        &self,
        shot: &ShotEvent,
        previous: Option<&ShotEvent>,
        lead: i64,
        priors: &HockeyPriors,
    ) -> f64 {
        let cfg = &self.config;
        let bounded = |m: f64| clamp(m, cfg.multiplier_min, cfg.multiplier_max);

        let base = match shot.strength {
            Strength::Even => cfg.base_xg_even,
            Strength::PowerPlay => cfg.base_xg_power_play,
            Strength::ShortHanded => cfg.base_xg_short_handed,
        };
        let goalie = match priors.goalie_facing(shot.team) {
            GoalieTier::Elite => cfg.goalie_elite,
            GoalieTier::Average => cfg.goalie_average,
            GoalieTier::Weak => cfg.goalie_weak,
        };
        let situational = match self.context(shot, previous) {
            ShotContext::Breakaway => cfg.breakaway_multiplier,
            ShotContext::Rebound => cfg.rebound_multiplier,
            ShotContext::Deflection => cfg.deflection_multiplier,
            ShotContext::WeakSlapShot => cfg.slap_shot_multiplier,
            ShotContext::Standard => 1.0,
        };
        let shell = if shot.elapsed_minutes >= cfg.shell_start_minute {
            match lead.signum() {
                1 => cfg.shell_leading_multiplier,
                -1 => cfg.shell_trailing_multiplier,
                _ => 1.0,
            }
        } else {
            1.0
        };

        let xg = base * bounded(goalie) * bounded(situational) * bounded(shell);
        clamp(xg, 0.0, cfg.xg_cap)
    }

    /// Sum of xG over every shot
    ///
    /// Goal-flagged shots replay the score shot by shot. Feeds that flag no
    /// goals fall back to the tick score for every shot.
    pub fn banked_xg(&self, stats: &HockeyStats, priors: &HockeyPriors) -> f64 {
        let flagged = stats.shots.iter().any(|s| s.is_goal);
        let (mut home_goals, mut away_goals) = if flagged {
            (0i64, 0i64)
        } else {
            (stats.home_goals as i64, stats.away_goals as i64)
        };
        let mut banked = 0.0;
        let mut previous: Option<&ShotEvent> = None;

        for shot in &stats.shots {
            let lead = match shot.team {
                TeamSide::Home => home_goals - away_goals,
                TeamSide::Away => away_goals - home_goals,
            };
            banked += self.shot_xg(shot, previous, lead, priors);

            if shot.is_goal {
                match shot.team {
                    TeamSide::Home => home_goals += 1,
                    TeamSide::Away => away_goals += 1,
                }
            }
            previous = Some(shot);
        }
        banked
    }

    /// Weight on live xG; grows with shots, never reaches the prior floor
    pub fn trust(&self, shots: usize) -> f64 {
        let n = shots as f64;
        let raw = safe_div(n, n + self.config.trust_half_shots, 0.0);
        raw.min(1.0 - self.config.prior_weight_floor).max(0.0)
    }

    pub fn volatility(&self, remaining: f64) -> f64 {
        let cfg = &self.config;
        let bounds = VolatilityBounds {
            decay_min: cfg.decay_min,
            decay_max: cfg.decay_max,
            min: cfg.volatility_min,
            max: cfg.volatility_max,
        };
        let decay = time_decay(safe_div(remaining, cfg.regulation_minutes, 0.0), &bounds);
        clamped_volatility(cfg.base_volatility, 1.0, decay, &bounds)
    }
}

impl SportModel for HockeyModel {
    type Stats = HockeyStats;
    type Priors = HockeyPriors;

    fn sport(&self) -> Sport {
        Sport::Hockey
    }

    fn check_stats(
        &self,
        tick: &Tick<HockeyStats>,
        previous: Option<&HockeyStats>,
    ) -> Result<(), ValidationError> {
        let stats = &tick.stats;
        let clock = tick.elapsed_minutes;

        let mut last = f64::NEG_INFINITY;
        for (index, shot) in stats.shots.iter().enumerate() {
            let elapsed = shot.elapsed_minutes;
            if !elapsed.is_finite() || elapsed < 0.0 {
                return Err(ValidationError::InvalidShot { index, elapsed });
            }
            if elapsed < last {
                return Err(ValidationError::ShotsUnordered { index, elapsed });
            }
            if elapsed > clock {
                return Err(ValidationError::ShotAfterClock {
                    index,
                    elapsed,
                    clock,
                });
            }
            last = elapsed;
        }

        // unflagged feeds are scored from the tick score instead
        if stats.shots.iter().any(|s| s.is_goal) {
            for (team, side) in [("home", TeamSide::Home), ("away", TeamSide::Away)] {
                let flagged = stats
                    .shots
                    .iter()
                    .filter(|s| s.is_goal && s.team == side)
                    .count() as u32;
                let goals = stats.goals(side);
                if flagged != goals {
                    return Err(ValidationError::GoalFlagsMismatch {
                        team,
                        flagged,
                        goals,
                    });
                }
            }
        }

        if let Some(prev) = previous {
            check_monotonic("home", "goals", prev.home_goals, stats.home_goals)?;
            check_monotonic("away", "goals", prev.away_goals, stats.away_goals)?;

            // accepted shots are history: the new list may only append
            let rewritten = prev
                .shots
                .iter()
                .enumerate()
                .find(|(i, shot)| stats.shots.get(*i) != Some(*shot));
            if let Some((index, _)) = rewritten {
                return Err(ValidationError::ShotHistoryRewritten { index });
            }
        }
        Ok(())
    }

    fn project(&self, tick: &Tick<HockeyStats>, priors: &HockeyPriors) -> Projection {
        let cfg = &self.config;
        let stats = &tick.stats;
        let elapsed = tick.elapsed_minutes;
        let remaining = tick.remaining_minutes.max(0.0);

        let shots = stats.shots.len();
        let goals = stats.home_goals as f64 + stats.away_goals as f64;

        let shot_prior = priors
            .shot_rate
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(cfg.default_shot_rate);
        let pace = PaceBlender::new(cfg.regulation_minutes).estimate(
            shots as f64,
            elapsed,
            remaining,
            shot_prior,
        );

        let anchor = self.anchor_rate(priors);
        let banked = self.banked_xg(stats, priors);
        let observed = if elapsed > 0.0 {
            safe_div(banked, elapsed, anchor)
        } else {
            anchor
        };
        let trust = self.trust(shots);
        let rate = blend(observed, anchor, trust);

        let remaining_goals = remaining * rate;
        let raw = goals + remaining_goals;

        let mut overlays = Vec::new();
        let tied = stats.home_goals == stats.away_goals;
        if let Some(delta) = overlay::tied_game_decay(cfg, remaining, tied, remaining_goals) {
            overlays.push(Overlay::new(OverlayKind::TiedGameDecay, delta));
        }
        if let Some(side) = stats.goalie_pulled {
            let deficit = stats.goals(side.opponent()) as i64 - stats.goals(side) as i64;
            if let Some(bonus) = overlay::empty_net_bonus(cfg, remaining, deficit) {
                overlays.push(Overlay::new(OverlayKind::EmptyNet, bonus));
            }
        }

        let fair_value = raw + overlays.iter().map(|o| o.value).sum::<f64>();

        Projection {
            current_score: goals,
            possessions: shots as f64,
            blend_weight: trust,
            blended_pace: pace.blended_pace,
            remaining_possessions: pace.remaining,
            anchor_rate: anchor,
            structural_rate: observed,
            projected_rate: rate,
            luck_gap: banked - goals,
            lineup_adjustment: 0.0,
            raw_projection: raw,
            overlays,
            volatility: self.volatility(remaining),
            confidence: trust,
            fair_value,
        }
    }

    fn closing_total(&self, priors: &HockeyPriors) -> Option<f64> {
        priors.closing_total
    }
}
