//! Common test utilities and fixtures

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;

use live_projection::common::types::{TeamSide, Tick};
use live_projection::model::{
    BasketballPriors, BasketballStats, HockeyPriors, HockeyStats, ShotEvent, Strength, TeamBox,
    TeamPriors,
};
use live_projection::store::GameRecord;

pub const NBA_GAME: &str = "0022500123";
pub const NHL_GAME: &str = "2025020456";

/// Fixed capture time so digests are stable across runs
pub fn captured_at(sequence: u64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_760_000_000 + sequence as i64 * 15, 0)
        .single()
        .expect("valid timestamp")
}

pub fn basketball_tick(
    sequence: u64,
    elapsed: f64,
    stats: BasketballStats,
) -> Tick<BasketballStats> {
    Tick {
        game_id: NBA_GAME.to_string(),
        tick_id: 1000 + sequence as i64,
        sequence,
        captured_at: captured_at(sequence),
        elapsed_minutes: elapsed,
        remaining_minutes: 48.0 - elapsed,
        period: ((elapsed / 12.0).floor() as u8 + 1).min(4),
        clock: String::new(),
        live_market_total: None,
        stats,
    }
}

/// Halftime box score with a known projection
pub fn golden_stats() -> BasketballStats {
    BasketballStats {
        home: TeamBox {
            fga: 40,
            fgm: 18,
            fg3a: 15,
            fg3m: 6,
            fta: 10,
            tov: 6,
            orb: 5,
            points: 46,
            on_court_rating: None,
        },
        away: TeamBox {
            fga: 41,
            fgm: 17,
            fg3a: 14,
            fg3m: 5,
            fta: 12,
            tov: 7,
            orb: 6,
            points: 44,
            on_court_rating: None,
        },
    }
}

pub static GOLDEN_PRIORS: Lazy<BasketballPriors> = Lazy::new(|| {
    let team = TeamPriors {
        expected_three_pct: Some(0.36),
        expected_two_pct: Some(0.52),
        lineup_rating: None,
        blowout: None,
    };
    BasketballPriors {
        closing_total: Some(220.0),
        pace: Some(100.0),
        home: team.clone(),
        away: team,
    }
});

pub fn golden_tick() -> Tick<BasketballStats> {
    basketball_tick(1, 24.0, golden_stats())
}

/// Box score growing linearly with `step`; always internally consistent
pub fn box_at(step: u32) -> BasketballStats {
    BasketballStats {
        home: TeamBox {
            fga: 10 * step,
            fgm: 4 * step,
            fg3a: 3 * step,
            fg3m: step,
            fta: 2 * step,
            tov: step,
            orb: step,
            points: 10 * step,
            on_court_rating: None,
        },
        away: TeamBox {
            fga: 9 * step,
            fgm: 4 * step,
            fg3a: 4 * step,
            fg3m: step,
            fta: 3 * step,
            tov: step,
            orb: step,
            points: 11 * step,
            on_court_rating: None,
        },
    }
}

/// A full basketball game of `ticks` evenly spaced updates
pub fn basketball_game(ticks: u32) -> GameRecord<BasketballStats, BasketballPriors> {
    let ticks = (1..=ticks)
        .map(|i| {
            let elapsed = 48.0 * i as f64 / ticks as f64;
            let mut tick = basketball_tick(i as u64, elapsed, box_at(i));
            tick.live_market_total = Some(221.5 - i as f64 * 0.5);
            tick
        })
        .collect();

    GameRecord {
        game_id: NBA_GAME.to_string(),
        priors: GOLDEN_PRIORS.clone(),
        ticks,
        snapshots: Vec::new(),
    }
}

pub fn shot(team: TeamSide, elapsed: f64, description: &str) -> ShotEvent {
    ShotEvent {
        team,
        elapsed_minutes: elapsed,
        strength: Strength::Even,
        description: description.to_string(),
        is_goal: false,
    }
}

pub fn goal(team: TeamSide, elapsed: f64, description: &str) -> ShotEvent {
    ShotEvent {
        is_goal: true,
        ..shot(team, elapsed, description)
    }
}

pub fn hockey_tick(sequence: u64, elapsed: f64, stats: HockeyStats) -> Tick<HockeyStats> {
    Tick {
        game_id: NHL_GAME.to_string(),
        tick_id: 5000 + sequence as i64,
        sequence,
        captured_at: captured_at(sequence),
        elapsed_minutes: elapsed,
        remaining_minutes: 60.0 - elapsed,
        period: ((elapsed / 20.0).floor() as u8 + 1).min(3),
        clock: String::new(),
        live_market_total: Some(6.0),
        stats,
    }
}

pub fn hockey_priors() -> HockeyPriors {
    HockeyPriors {
        closing_total: Some(6.0),
        shot_rate: Some(60.0),
        ..HockeyPriors::default()
    }
}

/// Stats after the first `n` shots of a scripted game
pub fn hockey_stats_after(n: usize) -> HockeyStats {
    let script = vec![
        shot(TeamSide::Home, 2.0, "Wrist Shot"),
        shot(TeamSide::Away, 4.5, "Slap Shot"),
        goal(TeamSide::Home, 7.0, "Breakaway, Wrist Shot"),
        shot(TeamSide::Away, 11.0, "Tip-In"),
        shot(TeamSide::Away, 11.02, "Wrist Shot"),
        goal(TeamSide::Away, 19.5, "Snap Shot"),
        shot(TeamSide::Home, 24.0, "Backhand"),
        shot(TeamSide::Home, 31.0, "Deflected"),
        goal(TeamSide::Home, 38.0, "Wrist Shot"),
        shot(TeamSide::Away, 45.0, "Slap Shot"),
    ];
    let shots: Vec<ShotEvent> = script.into_iter().take(n).collect();
    let home_goals = shots
        .iter()
        .filter(|s| s.is_goal && s.team == TeamSide::Home)
        .count() as u32;
    let away_goals = shots
        .iter()
        .filter(|s| s.is_goal && s.team == TeamSide::Away)
        .count() as u32;

    HockeyStats {
        home_goals,
        away_goals,
        goalie_pulled: None,
        shots,
    }
}

pub fn hockey_game() -> GameRecord<HockeyStats, HockeyPriors> {
    let checkpoints = [(1u64, 5.0, 2usize), (2, 15.0, 5), (3, 30.0, 7), (4, 46.0, 10)];
    let ticks = checkpoints
        .iter()
        .map(|&(seq, elapsed, shots)| hockey_tick(seq, elapsed, hockey_stats_after(shots)))
        .collect();

    GameRecord {
        game_id: NHL_GAME.to_string(),
        priors: hockey_priors(),
        ticks,
        snapshots: Vec::new(),
    }
}
