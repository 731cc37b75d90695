//! Endgame situational overlays
//!
//! Each function returns `Some(value)` only when its activation window is
//! open; the value is added to the raw projection.

use super::basketball::{BlowoutDelta, BlowoutProfile};
use crate::common::math::{clamp, unit};
use crate::config::models::{BasketballConfig, HockeyConfig};

/// Extra points generated by a trailing team fouling on purpose
///
/// Grows as time runs out and as the margin shrinks toward one possession.
pub fn foul_strategy_ev(cfg: &BasketballConfig, remaining: f64, margin: f64) -> Option<f64> {
    let margin = margin.abs();
    let in_window = remaining > 0.0 && remaining < cfg.foul_window_minutes;
    let in_band = margin >= cfg.foul_min_margin && margin <= cfg.foul_max_margin;
    if !in_window || !in_band {
        return None;
    }

    let time_factor = 1.0 - remaining / cfg.foul_window_minutes;
    let margin_factor = (cfg.foul_max_margin - margin + 1.0)
        / (cfg.foul_max_margin - cfg.foul_min_margin + 1.0);
    let probability = unit(time_factor * margin_factor);

    Some(clamp(cfg.foul_points * probability, 0.0, cfg.foul_ev_cap))
}

/// Expected overtime scoring weighted by the chance regulation ends tied
pub fn overtime_ev(
    cfg: &BasketballConfig,
    remaining: f64,
    margin: f64,
    projected_rate: f64,
    blended_pace: f64,
) -> Option<f64> {
    let margin = margin.abs();
    if remaining > cfg.overtime_window_minutes || margin > cfg.overtime_max_margin {
        return None;
    }

    let probability = if remaining <= 0.0 {
        if margin == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        unit(cfg.overtime_tie_probability * (1.0 - margin / (cfg.overtime_max_margin + 1.0)))
    };

    let overtime_points =
        projected_rate * blended_pace * (cfg.overtime_minutes / cfg.regulation_minutes);
    Some(clamp(probability * overtime_points, 0.0, cfg.overtime_ev_cap))
}

/// Pace/efficiency drift once a game is out of reach
///
/// `home_margin` is home score minus away score. Each team's own blowout
/// profile is used for its state; league defaults fill the gaps.
pub fn blowout_adjustment(
    cfg: &BasketballConfig,
    elapsed: f64,
    home_margin: f64,
    remaining_points: f64,
    home: Option<&BlowoutProfile>,
    away: Option<&BlowoutProfile>,
) -> Option<f64> {
    if elapsed < cfg.blowout_start_minute || home_margin.abs() < cfg.blowout_margin {
        return None;
    }

    let (leader, trailer) = if home_margin > 0.0 { (home, away) } else { (away, home) };
    let leading = leader.and_then(|p| p.leading).unwrap_or(BlowoutDelta {
        pace: cfg.blowout_leading_pace,
        ppp: cfg.blowout_leading_ppp,
    });
    let trailing = trailer.and_then(|p| p.trailing).unwrap_or(BlowoutDelta {
        pace: cfg.blowout_trailing_pace,
        ppp: cfg.blowout_trailing_ppp,
    });

    let bounded = |m: f64| clamp(m, cfg.blowout_multiplier_min, cfg.blowout_multiplier_max);
    let factor = (bounded(leading.pace) * bounded(leading.ppp)
        + bounded(trailing.pace) * bounded(trailing.ppp))
        / 2.0;

    Some(remaining_points * (factor - 1.0))
}

/// Late tied hockey games play for overtime; returns the (negative) delta
pub fn tied_game_decay(
    cfg: &HockeyConfig,
    remaining: f64,
    tied: bool,
    remaining_goals: f64,
) -> Option<f64> {
    if !tied || remaining <= 0.0 || remaining > cfg.tied_decay_window_minutes {
        return None;
    }
    Some(remaining_goals * (cfg.tied_decay_multiplier - 1.0))
}

/// Bonus xG once the trailing team has pulled its goalie
///
/// `deficit` is how many goals the pulling team trails by.
pub fn empty_net_bonus(cfg: &HockeyConfig, remaining: f64, deficit: i64) -> Option<f64> {
    if remaining <= 0.0 || remaining > cfg.empty_net_window_minutes {
        return None;
    }
    match deficit {
        1 => Some(cfg.empty_net_one_goal_bonus),
        2 => Some(cfg.empty_net_two_goal_bonus),
        _ => None,
    }
}
