//! Basketball total-points model
//!
//! ```text
//! box score ──► possessions ──► blended pace ──► remaining possessions
//!                    │                                   │
//!   priors ──► anchor PPP ──┐                            ▼
//!                           ├─► projected PPP ──► raw projection ──► overlays
//!   luck gap ─► structural ─┘        ▲
//!                             lineup adjustment
//! ```

use serde::{Deserialize, Serialize};

use super::edge::{clamped_volatility, time_decay, VolatilityBounds};
use super::overlay;
use super::pace::{PaceBlender, PossessionEstimator};
use super::traits::SportModel;
use super::validator::{check_made, check_monotonic};
use crate::common::errors::ValidationError;
use crate::common::math::{blend, safe_div};
use crate::common::types::{Overlay, OverlayKind, Projection, Sport, Tick};
use crate::config::models::BasketballConfig;

/// Cumulative box score for one team
///
/// `fga`/`fgm` include three-point attempts/makes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamBox {
    pub fga: u32,
    pub fgm: u32,
    pub fg3a: u32,
    pub fg3m: u32,
    pub fta: u32,
    pub tov: u32,
    pub orb: u32,
    pub points: u32,
    /// Sum of the ratings of the five players on court
    #[serde(default)]
    pub on_court_rating: Option<f64>,
}

impl TeamBox {
    pub fn fg2a(&self) -> u32 {
        self.fga.saturating_sub(self.fg3a)
    }

    pub fn fg2m(&self) -> u32 {
        self.fgm.saturating_sub(self.fg3m)
    }
}

/// Basketball tick statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasketballStats {
    pub home: TeamBox,
    pub away: TeamBox,
}

impl BasketballStats {
    pub fn combined_points(&self) -> f64 {
        self.home.points as f64 + self.away.points as f64
    }

    /// Home minus away
    pub fn margin(&self) -> f64 {
        self.home.points as f64 - self.away.points as f64
    }
}

/// Pace and efficiency multipliers for one blowout state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlowoutDelta {
    pub pace: f64,
    pub ppp: f64,
}

/// A team's mined behavior when leading or trailing big late
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlowoutProfile {
    #[serde(default)]
    pub leading: Option<BlowoutDelta>,
    #[serde(default)]
    pub trailing: Option<BlowoutDelta>,
}

/// Per-team pregame expectations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamPriors {
    #[serde(default)]
    pub expected_three_pct: Option<f64>,
    #[serde(default)]
    pub expected_two_pct: Option<f64>,
    /// Baseline lineup rating the on-court sum is measured against
    #[serde(default)]
    pub lineup_rating: Option<f64>,
    #[serde(default)]
    pub blowout: Option<BlowoutProfile>,
}

/// Basketball pregame priors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasketballPriors {
    /// Closing market total
    #[serde(default)]
    pub closing_total: Option<f64>,
    /// Expected possessions per 48 minutes
    #[serde(default)]
    pub pace: Option<f64>,
    #[serde(default)]
    pub home: TeamPriors,
    #[serde(default)]
    pub away: TeamPriors,
}

/// Basketball model
#[derive(Debug, Clone, Default)]
pub struct BasketballModel {
    config: BasketballConfig,
}

impl BasketballModel {
    pub fn new(config: BasketballConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BasketballConfig {
        &self.config
    }

    /// Pace prior, falling back to the league default when absent
    pub fn pace_prior(&self, priors: &BasketballPriors) -> f64 {
        priors
            .pace
            .filter(|p| p.is_finite() && *p > 0.0)
            .unwrap_or(self.config.default_pace)
    }

    /// Combined points per possession implied by the closing line
    pub fn anchor_ppp(&self, priors: &BasketballPriors) -> f64 {
        let fallback = self.config.fallback_anchor_ppp;
        match (priors.closing_total, priors.pace) {
            (Some(total), Some(pace)) if pace > 0.0 => safe_div(total, pace, fallback),
            (Some(total), None) => safe_div(total, self.config.default_pace, fallback),
            _ => fallback,
        }
    }

    /// Points a team "should" have scored minus what it did, from shot mix
    pub fn luck_gap(&self, team: &TeamBox, priors: &TeamPriors) -> f64 {
        let three_pct = priors.expected_three_pct.unwrap_or(self.config.default_three_pct);
        let two_pct = priors.expected_two_pct.unwrap_or(self.config.default_two_pct);

        let expected_3pm = team.fg3a as f64 * three_pct;
        let expected_2pm = team.fg2a() as f64 * two_pct;

        3.0 * (expected_3pm - team.fg3m as f64) + 2.0 * (expected_2pm - team.fg2m() as f64)
    }

    /// Game-level lineup shift in points per possession
    pub fn lineup_adjustment(&self, stats: &BasketballStats, priors: &BasketballPriors) -> f64 {
        let team = |b: &TeamBox, p: &TeamPriors| match (b.on_court_rating, p.lineup_rating) {
            (Some(on_court), Some(baseline)) => {
                safe_div(on_court - baseline, self.config.lineup_scale, 0.0)
            }
            _ => 0.0,
        };
        let mean = (team(&stats.home, &priors.home) + team(&stats.away, &priors.away)) / 2.0;
        mean * self.config.lineup_weight
    }

    /// Clamped standard deviation of the remaining total
    pub fn volatility(&self, stats: &BasketballStats, remaining_possessions: f64) -> f64 {
        let cfg = &self.config;
        let bounds = VolatilityBounds {
            decay_min: cfg.decay_min,
            decay_max: cfg.decay_max,
            min: cfg.volatility_min,
            max: cfg.volatility_max,
        };

        let three_rate = safe_div(
            stats.home.fg3a as f64 + stats.away.fg3a as f64,
            stats.home.fga as f64 + stats.away.fga as f64,
            0.0,
        );
        let multiplier = if three_rate > cfg.three_rate_threshold {
            cfg.high_three_multiplier
        } else {
            1.0
        };
        let decay = time_decay(
            safe_div(remaining_possessions, cfg.reference_possessions, 0.0),
            &bounds,
        );

        clamped_volatility(cfg.base_volatility, multiplier, decay, &bounds)
    }

    fn check_team(
        team: &'static str,
        current: &TeamBox,
        previous: Option<&TeamBox>,
    ) -> Result<(), ValidationError> {
        check_made(team, "FGM", current.fgm, current.fga)?;
        check_made(team, "3PA", current.fg3a, current.fga)?;
        check_made(team, "3PM", current.fg3m, current.fg3a)?;
        check_made(team, "3PM/FGM", current.fg3m, current.fgm)?;

        if let Some(prev) = previous {
            check_monotonic(team, "FGA", prev.fga, current.fga)?;
            check_monotonic(team, "FGM", prev.fgm, current.fgm)?;
            check_monotonic(team, "3PA", prev.fg3a, current.fg3a)?;
            check_monotonic(team, "3PM", prev.fg3m, current.fg3m)?;
            check_monotonic(team, "FTA", prev.fta, current.fta)?;
            check_monotonic(team, "TOV", prev.tov, current.tov)?;
            check_monotonic(team, "ORB", prev.orb, current.orb)?;
            check_monotonic(team, "PTS", prev.points, current.points)?;
        }
        Ok(())
    }
}

impl SportModel for BasketballModel {
    type Stats = BasketballStats;
    type Priors = BasketballPriors;

    fn sport(&self) -> Sport {
        Sport::Basketball
    }

    fn check_stats(
        &self,
        tick: &Tick<BasketballStats>,
        previous: Option<&BasketballStats>,
    ) -> Result<(), ValidationError> {
        let stats = &tick.stats;
        Self::check_team("home", &stats.home, previous.map(|p| &p.home))?;
        Self::check_team("away", &stats.away, previous.map(|p| &p.away))?;
        Ok(())
    }

    fn project(&self, tick: &Tick<BasketballStats>, priors: &BasketballPriors) -> Projection {
        let cfg = &self.config;
        let stats = &tick.stats;
        let elapsed = tick.elapsed_minutes;
        let remaining = tick.remaining_minutes;

        let estimator = PossessionEstimator::new(cfg.fta_possession_factor);
        let home_poss = estimator.team(&stats.home);
        let away_poss = estimator.team(&stats.away);
        let possessions = (home_poss + away_poss) / 2.0;

        let pace = PaceBlender::new(cfg.regulation_minutes).estimate(
            possessions,
            elapsed,
            remaining,
            self.pace_prior(priors),
        );

        let anchor = self.anchor_ppp(priors);
        let home_gap = self.luck_gap(&stats.home, &priors.home);
        let away_gap = self.luck_gap(&stats.away, &priors.away);

        // per-team PPP; a team without possessions takes its share of the anchor
        let home_rate = safe_div(stats.home.points as f64 + home_gap, home_poss, anchor / 2.0);
        let away_rate = safe_div(stats.away.points as f64 + away_gap, away_poss, anchor / 2.0);
        // game rate is the sum of the team rates (twice their average), the
        // same combined points per possession the anchor is quoted in
        let structural = home_rate + away_rate;

        let projected = blend(structural, anchor, pace.weight);
        let lineup = self.lineup_adjustment(stats, priors);

        let current = stats.combined_points();
        let remaining_points = pace.remaining * (projected + lineup);
        let raw = current + remaining_points;

        let margin = stats.margin();
        let mut overlays = Vec::new();
        if let Some(ev) = overlay::foul_strategy_ev(cfg, remaining, margin) {
            overlays.push(Overlay::new(OverlayKind::FoulStrategy, ev));
        }
        if let Some(ev) = overlay::overtime_ev(cfg, remaining, margin, projected, pace.blended_pace)
        {
            overlays.push(Overlay::new(OverlayKind::Overtime, ev));
        }
        if let Some(adj) = overlay::blowout_adjustment(
            cfg,
            elapsed,
            margin,
            remaining_points,
            priors.home.blowout.as_ref(),
            priors.away.blowout.as_ref(),
        ) {
            overlays.push(Overlay::new(OverlayKind::Blowout, adj));
        }

        let fair_value = raw + overlays.iter().map(|o| o.value).sum::<f64>();

        Projection {
            current_score: current,
            possessions,
            blend_weight: pace.weight,
            blended_pace: pace.blended_pace,
            remaining_possessions: pace.remaining,
            anchor_rate: anchor,
            structural_rate: structural,
            projected_rate: projected,
            luck_gap: home_gap + away_gap,
            lineup_adjustment: lineup,
            raw_projection: raw,
            overlays,
            volatility: self.volatility(stats, pace.remaining),
            confidence: pace.weight,
            fair_value,
        }
    }

    fn closing_total(&self, priors: &BasketballPriors) -> Option<f64> {
        priors.closing_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tick(elapsed: f64, stats: BasketballStats) -> Tick<BasketballStats> {
        Tick {
            game_id: "nba-1".to_string(),
            tick_id: 1,
            sequence: 1,
            captured_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            elapsed_minutes: elapsed,
            remaining_minutes: 48.0 - elapsed,
            period: 1,
            clock: String::new(),
            live_market_total: None,
            stats,
        }
    }

    fn priors() -> BasketballPriors {
        BasketballPriors {
            closing_total: Some(220.0),
            pace: Some(100.0),
            ..BasketballPriors::default()
        }
    }

    #[test]
    fn test_anchor_ppp() {
        let model = BasketballModel::default();
        assert!((model.anchor_ppp(&priors()) - 2.2).abs() < 1e-12);

        let zero_pace = BasketballPriors {
            pace: Some(0.0),
            ..priors()
        };
        assert_eq!(model.anchor_ppp(&zero_pace), 2.0);
        assert_eq!(model.anchor_ppp(&BasketballPriors::default()), 2.0);
    }

    #[test]
    fn test_luck_gap_sign() {
        let model = BasketballModel::default();
        let cold = TeamBox {
            fga: 20,
            fgm: 5,
            fg3a: 10,
            fg3m: 0,
            ..TeamBox::default()
        };
        // expected 3.6 threes and 5.3 twos, made 0 and 5
        let gap = model.luck_gap(&cold, &TeamPriors::default());
        assert!((gap - (3.0 * 3.6 + 2.0 * 0.3)).abs() < 1e-9);
    }

    #[test]
    fn test_tipoff_equals_anchor() {
        let model = BasketballModel::default();
        let projection = model.project(&tick(0.0, BasketballStats::default()), &priors());

        assert_eq!(projection.blend_weight, 0.0);
        assert_eq!(projection.projected_rate, projection.anchor_rate);
        assert!((projection.fair_value - 220.0).abs() < 1e-9);
    }

    #[test]
    fn test_lineup_adjustment_average() {
        let model = BasketballModel::default();
        let stats = BasketballStats {
            home: TeamBox {
                on_court_rating: Some(560.0),
                ..TeamBox::default()
            },
            away: TeamBox {
                on_court_rating: Some(530.0),
                ..TeamBox::default()
            },
        };
        let mut p = priors();
        p.home.lineup_rating = Some(540.0);
        p.away.lineup_rating = Some(540.0);

        // (0.2 + -0.1) / 2
        assert!((model.lineup_adjustment(&stats, &p) - 0.05).abs() < 1e-12);

        p.away.lineup_rating = None;
        assert!((model.lineup_adjustment(&stats, &p) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_makes_over_attempts() {
        let model = BasketballModel::default();
        let stats = BasketballStats {
            home: TeamBox {
                fga: 10,
                fgm: 11,
                ..TeamBox::default()
            },
            ..BasketballStats::default()
        };
        assert!(matches!(
            model.check_stats(&tick(10.0, stats), None),
            Err(ValidationError::CountsInconsistent { field: "FGM", .. })
        ));
    }

    #[test]
    fn test_high_three_rate_raises_volatility() {
        let model = BasketballModel::default();
        let balanced = BasketballStats {
            home: TeamBox {
                fga: 40,
                fg3a: 12,
                ..TeamBox::default()
            },
            away: TeamBox {
                fga: 40,
                fg3a: 12,
                ..TeamBox::default()
            },
        };
        let bombing = BasketballStats {
            home: TeamBox {
                fga: 40,
                fg3a: 25,
                ..TeamBox::default()
            },
            away: TeamBox {
                fga: 40,
                fg3a: 25,
                ..TeamBox::default()
            },
        };
        assert!(model.volatility(&bombing, 50.0) > model.volatility(&balanced, 50.0));
    }
}
