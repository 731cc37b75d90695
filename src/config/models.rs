//! Sport model coefficients
//!
//! Every tunable constant of the two models lives here and is handed to the
//! model at construction. Defaults are the production coefficients; a
//! config file or `APP__BASKETBALL__*` / `APP__HOCKEY__*` variables override
//! them per season.

use serde::{Deserialize, Serialize};

use crate::common::errors::{EngineError, Result};

/// Basketball total-points model coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasketballConfig {
    /// Regulation game length in minutes
    pub regulation_minutes: f64,
    /// Free-throw attempts per possession-ending trip
    pub fta_possession_factor: f64,
    /// Pace prior used when the priors carry none
    pub default_pace: f64,
    /// Anchor PPP used when the pace prior is zero or the closing total missing
    pub fallback_anchor_ppp: f64,
    /// League expected three-point percentage
    pub default_three_pct: f64,
    /// League expected two-point percentage
    pub default_two_pct: f64,

    /// Divisor turning lineup rating deltas into PPP
    pub lineup_scale: f64,
    /// Weight on the lineup feature (pending stakeholder confirmation)
    pub lineup_weight: f64,

    /// Foul-strategy window in remaining minutes
    pub foul_window_minutes: f64,
    /// Smallest margin at which the trailing team fouls
    pub foul_min_margin: f64,
    /// Largest margin at which the trailing team fouls
    pub foul_max_margin: f64,
    /// Points generated at full foul-strategy probability
    pub foul_points: f64,
    /// Upper bound on foul-strategy EV
    pub foul_ev_cap: f64,

    /// Overtime window in remaining minutes
    pub overtime_window_minutes: f64,
    /// Largest margin for which overtime EV applies
    pub overtime_max_margin: f64,
    /// Probability of overtime from a tied game inside the window
    pub overtime_tie_probability: f64,
    /// Overtime period length in minutes
    pub overtime_minutes: f64,
    /// Upper bound on overtime EV
    pub overtime_ev_cap: f64,

    /// Margin at which the blowout adjustment kicks in
    pub blowout_margin: f64,
    /// Game minute from which the blowout adjustment may apply
    pub blowout_start_minute: f64,
    /// League leading-team pace multiplier
    pub blowout_leading_pace: f64,
    /// League leading-team PPP multiplier
    pub blowout_leading_ppp: f64,
    /// League trailing-team pace multiplier
    pub blowout_trailing_pace: f64,
    /// League trailing-team PPP multiplier
    pub blowout_trailing_ppp: f64,
    /// Lower clamp on any blowout multiplier
    pub blowout_multiplier_min: f64,
    /// Upper clamp on any blowout multiplier
    pub blowout_multiplier_max: f64,

    /// Full-game standard deviation of the total
    pub base_volatility: f64,
    /// Combined 3PA/FGA above which the game is high-variance
    pub three_rate_threshold: f64,
    /// Volatility multiplier for a high-variance shot profile
    pub high_three_multiplier: f64,
    /// Possessions at which the time decay equals 1
    pub reference_possessions: f64,
    pub decay_min: f64,
    pub decay_max: f64,
    pub volatility_min: f64,
    pub volatility_max: f64,
}

impl Default for BasketballConfig {
    fn default() -> Self {
        Self {
            regulation_minutes: 48.0,
            fta_possession_factor: 0.44,
            default_pace: 100.0,
            fallback_anchor_ppp: 2.0,
            default_three_pct: 0.36,
            default_two_pct: 0.53,

            lineup_scale: 100.0,
            lineup_weight: 1.0,

            foul_window_minutes: 2.0,
            foul_min_margin: 1.0,
            foul_max_margin: 6.0,
            foul_points: 6.0,
            foul_ev_cap: 6.0,

            overtime_window_minutes: 3.0,
            overtime_max_margin: 3.0,
            overtime_tie_probability: 0.45,
            overtime_minutes: 5.0,
            overtime_ev_cap: 12.0,

            blowout_margin: 15.0,
            blowout_start_minute: 36.0,
            blowout_leading_pace: 0.97,
            blowout_leading_ppp: 0.97,
            blowout_trailing_pace: 0.98,
            blowout_trailing_ppp: 0.99,
            blowout_multiplier_min: 0.8,
            blowout_multiplier_max: 1.2,

            base_volatility: 14.0,
            three_rate_threshold: 0.42,
            high_three_multiplier: 1.15,
            reference_possessions: 100.0,
            decay_min: 0.15,
            decay_max: 1.0,
            volatility_min: 2.0,
            volatility_max: 20.0,
        }
    }
}

impl BasketballConfig {
    /// Reject coefficient sets that would break a documented bound
    pub fn validate(&self) -> Result<()> {
        positive("basketball.regulation_minutes", self.regulation_minutes)?;
        positive("basketball.default_pace", self.default_pace)?;
        positive("basketball.lineup_scale", self.lineup_scale)?;
        positive("basketball.foul_window_minutes", self.foul_window_minutes)?;
        positive("basketball.reference_possessions", self.reference_possessions)?;
        ordered("basketball.foul margins", self.foul_min_margin, self.foul_max_margin)?;
        ordered("basketball.decay", self.decay_min, self.decay_max)?;
        ordered("basketball.volatility", self.volatility_min, self.volatility_max)?;
        ordered(
            "basketball.blowout multipliers",
            self.blowout_multiplier_min,
            self.blowout_multiplier_max,
        )?;
        probability("basketball.default_three_pct", self.default_three_pct)?;
        probability("basketball.default_two_pct", self.default_two_pct)?;
        probability("basketball.overtime_tie_probability", self.overtime_tie_probability)?;
        Ok(())
    }
}

/// Hockey expected-goals model coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HockeyConfig {
    /// Regulation game length in minutes
    pub regulation_minutes: f64,
    /// Combined shots per 60 used when the priors carry none
    pub default_shot_rate: f64,
    /// Closing total used when the priors carry none
    pub default_total: f64,

    pub base_xg_even: f64,
    pub base_xg_power_play: f64,
    pub base_xg_short_handed: f64,

    pub goalie_elite: f64,
    pub goalie_average: f64,
    pub goalie_weak: f64,

    pub breakaway_multiplier: f64,
    pub rebound_multiplier: f64,
    /// Max gap between same-team shots for a rebound, in minutes
    pub rebound_window_minutes: f64,
    pub deflection_multiplier: f64,
    pub slap_shot_multiplier: f64,

    /// Minute after which the defensive shell applies
    pub shell_start_minute: f64,
    pub shell_leading_multiplier: f64,
    pub shell_trailing_multiplier: f64,

    /// Lower clamp on any per-shot multiplier
    pub multiplier_min: f64,
    /// Upper clamp on any per-shot multiplier
    pub multiplier_max: f64,
    /// Hard cap on a single shot's xG
    pub xg_cap: f64,

    /// Shot count at which live data earns half the trust
    pub trust_half_shots: f64,
    /// Minimum weight always left on the pregame prior
    pub prior_weight_floor: f64,

    pub tied_decay_window_minutes: f64,
    pub tied_decay_multiplier: f64,

    pub empty_net_window_minutes: f64,
    pub empty_net_one_goal_bonus: f64,
    pub empty_net_two_goal_bonus: f64,

    pub base_volatility: f64,
    pub decay_min: f64,
    pub decay_max: f64,
    pub volatility_min: f64,
    pub volatility_max: f64,
}

impl Default for HockeyConfig {
    fn default() -> Self {
        Self {
            regulation_minutes: 60.0,
            default_shot_rate: 60.0,
            default_total: 6.0,

            base_xg_even: 0.075,
            base_xg_power_play: 0.115,
            base_xg_short_handed: 0.06,

            goalie_elite: 0.85,
            goalie_average: 1.0,
            goalie_weak: 1.15,

            breakaway_multiplier: 3.0,
            rebound_multiplier: 2.2,
            rebound_window_minutes: 0.05,
            deflection_multiplier: 1.6,
            slap_shot_multiplier: 0.7,

            shell_start_minute: 50.0,
            shell_leading_multiplier: 0.85,
            shell_trailing_multiplier: 1.05,

            multiplier_min: 0.1,
            multiplier_max: 5.0,
            xg_cap: 0.6,

            trust_half_shots: 40.0,
            prior_weight_floor: 0.2,

            tied_decay_window_minutes: 5.0,
            tied_decay_multiplier: 0.8,

            empty_net_window_minutes: 2.5,
            empty_net_one_goal_bonus: 0.55,
            empty_net_two_goal_bonus: 0.35,

            base_volatility: 1.7,
            decay_min: 0.15,
            decay_max: 1.0,
            volatility_min: 0.3,
            volatility_max: 2.5,
        }
    }
}

impl HockeyConfig {
    /// Reject coefficient sets that would break a documented bound
    pub fn validate(&self) -> Result<()> {
        positive("hockey.regulation_minutes", self.regulation_minutes)?;
        positive("hockey.default_shot_rate", self.default_shot_rate)?;
        positive("hockey.trust_half_shots", self.trust_half_shots)?;
        positive("hockey.xg_cap", self.xg_cap)?;
        ordered("hockey.multipliers", self.multiplier_min, self.multiplier_max)?;
        ordered("hockey.decay", self.decay_min, self.decay_max)?;
        ordered("hockey.volatility", self.volatility_min, self.volatility_max)?;
        probability("hockey.prior_weight_floor", self.prior_weight_floor)?;
        if self.prior_weight_floor <= 0.0 {
            return Err(EngineError::Configuration(
                "hockey.prior_weight_floor must leave weight on the prior".to_string(),
            ));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::Configuration(format!("{name} must be positive, got {value}")))
    }
}

fn ordered(name: &str, lo: f64, hi: f64) -> Result<()> {
    if lo.is_finite() && hi.is_finite() && lo <= hi {
        Ok(())
    } else {
        Err(EngineError::Configuration(format!("{name}: bounds [{lo}, {hi}] out of order")))
    }
}

fn probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::Configuration(format!("{name} must lie in [0, 1], got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(BasketballConfig::default().validate().is_ok());
        assert!(HockeyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let config = BasketballConfig {
            volatility_min: 25.0,
            ..BasketballConfig::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::Configuration(_))));
    }

    #[test]
    fn test_zero_prior_floor_rejected() {
        let config = HockeyConfig {
            prior_weight_floor: 0.0,
            ..HockeyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: BasketballConfig =
            serde_json::from_str(r#"{"lineup_weight": 0.5}"#).unwrap();
        assert_eq!(config.lineup_weight, 0.5);
        assert_eq!(config.regulation_minutes, 48.0);
    }
}
