//! Behavioural properties of the projection pipeline for both sports
//!
//! Run with:
//! ```
//! cargo test --test pipeline_properties
//! ```

mod common;

use common::*;
use live_projection::common::types::{OverlayKind, TeamSide};
use live_projection::model::hockey::ShotContext;
use live_projection::model::{
    BasketballModel, BasketballStats, GamePipeline, HockeyModel, HockeyStats, SportModel, TeamBox,
};
use live_projection::{EngineError, ValidationError};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const EPS: f64 = 1e-9;

fn basketball_pipeline() -> GamePipeline<BasketballModel> {
    GamePipeline::new(
        Arc::new(BasketballModel::default()),
        NBA_GAME,
        GOLDEN_PRIORS.clone(),
    )
}

fn hockey_pipeline() -> GamePipeline<HockeyModel> {
    GamePipeline::new(Arc::new(HockeyModel::default()), NHL_GAME, hockey_priors())
}

/// Box score with the given points, other counts plausible
fn scored(home_points: u32, away_points: u32) -> BasketballStats {
    let team = |points: u32| TeamBox {
        fga: 85,
        fgm: 40,
        fg3a: 30,
        fg3m: 11,
        fta: 20,
        tov: 13,
        orb: 10,
        points,
        on_court_rating: None,
    };
    BasketballStats {
        home: team(home_points),
        away: team(away_points),
    }
}

// ============================================================================
// Basketball
// ============================================================================

#[test_log::test]
fn test_golden_halftime_fixture() {
    let snapshot = basketball_pipeline().process(&golden_tick()).unwrap();
    let p = &snapshot.projection;

    assert!((p.possessions - 46.34).abs() < EPS);
    assert!((p.blend_weight - 0.5).abs() < EPS);
    assert!((p.blended_pace - 96.34).abs() < 1e-6);
    assert!((p.remaining_possessions - 48.17).abs() < 1e-6);
    assert!((p.luck_gap - 4.4).abs() < 1e-6);
    assert!((p.structural_rate - 2.037_079_690_213_704_7).abs() < 1e-6);
    assert!((p.fair_value - 192.050_064_338_797_1).abs() < 1e-6);
    assert!(p.overlays.is_empty());
    assert!((p.volatility - 9.716_645_511_697_955).abs() < 1e-6);

    assert_eq!(snapshot.market_line, Some(220.0));
    assert!((snapshot.edge_z - -2.876_500_498_814_507_5).abs() < 1e-6);
}

#[test]
fn test_same_tick_same_output() {
    let a = basketball_pipeline().process(&golden_tick()).unwrap();
    let b = basketball_pipeline().process(&golden_tick()).unwrap();

    assert!((a.fair_value() - b.fair_value()).abs() < EPS);
    assert!((a.edge_z - b.edge_z).abs() < EPS);
    assert_eq!(a.input_digest, b.input_digest);
}

#[test]
fn test_tipoff_uses_prior_only() {
    let tick = basketball_tick(1, 0.0, BasketballStats::default());
    let snapshot = basketball_pipeline().process(&tick).unwrap();
    let p = &snapshot.projection;

    assert_eq!(p.blend_weight, 0.0);
    assert_eq!(p.blended_pace, 100.0);
    assert!((p.remaining_possessions - 100.0).abs() < EPS);
    assert!((p.fair_value - 220.0).abs() < EPS);
    assert!(snapshot.edge_z.abs() < EPS);
}

#[test]
fn test_final_buzzer_equals_score() {
    let tick = basketball_tick(1, 48.0, scored(118, 104));
    let snapshot = basketball_pipeline().process(&tick).unwrap();
    let p = &snapshot.projection;

    assert_eq!(p.blend_weight, 1.0);
    assert_eq!(p.remaining_possessions, 0.0);
    assert!((p.fair_value - 222.0).abs() < EPS);
    assert!(p.overlay(OverlayKind::FoulStrategy).is_none());
    assert!(p.overlay(OverlayKind::Overtime).is_none());
}

#[test]
fn test_tied_at_buzzer_adds_overtime() {
    let tick = basketball_tick(1, 48.0, scored(110, 110));
    let snapshot = basketball_pipeline().process(&tick).unwrap();

    let ev = snapshot.projection.overlay(OverlayKind::Overtime).unwrap();
    assert!(ev > 0.0);
    assert!(ev <= 12.0);
    assert!((snapshot.fair_value() - (220.0 + ev)).abs() < EPS);
}

#[test]
fn test_volatility_clamped_for_all_threes() {
    let model = BasketballModel::default();
    let team = TeamBox {
        fga: 60,
        fgm: 30,
        fg3a: 60,
        fg3m: 30,
        points: 90,
        ..TeamBox::default()
    };
    let stats = BasketballStats {
        home: team.clone(),
        away: team,
    };

    for elapsed in [1.0, 12.0, 24.0, 40.0, 47.9, 48.0] {
        let tick = basketball_tick(1, elapsed, stats.clone());
        let p = model.project(&tick, &GOLDEN_PRIORS);
        assert!(p.volatility.is_finite());
        assert!(p.volatility >= 2.0 && p.volatility <= 20.0, "{}", p.volatility);
        assert!(p.fair_value.is_finite());
    }
}

#[test]
fn test_remaining_possessions_never_increase() {
    let record = basketball_game(12);
    let mut pipeline = basketball_pipeline();

    let mut last = f64::INFINITY;
    for tick in &record.ticks {
        let snapshot = pipeline.process(tick).unwrap();
        let remaining = snapshot.projection.remaining_possessions;
        assert!(remaining <= last + EPS, "{} > {}", remaining, last);
        last = remaining;
    }
    assert_eq!(last, 0.0);
}

#[test]
fn test_edge_sign_follows_market() {
    let mut below = golden_tick();
    below.live_market_total = Some(180.0);
    let over = basketball_pipeline().process(&below).unwrap();
    assert_eq!(over.market_line, Some(180.0));
    assert!(over.edge_z > 0.0);

    let mut above = golden_tick();
    above.live_market_total = Some(205.0);
    let under = basketball_pipeline().process(&above).unwrap();
    assert!(under.edge_z < 0.0);
}

#[test]
fn test_foul_overlay_only_in_window() {
    let late = basketball_tick(1, 47.0, scored(103, 100));
    let p = basketball_pipeline().process(&late).unwrap().projection;
    let ev = p.overlay(OverlayKind::FoulStrategy).unwrap();
    assert!(ev > 0.0 && ev <= 6.0);

    let early = basketball_tick(1, 43.0, scored(103, 100));
    let p = basketball_pipeline().process(&early).unwrap().projection;
    assert!(p.overlay(OverlayKind::FoulStrategy).is_none());
}

#[test]
fn test_blowout_slows_remaining_scoring() {
    let tick = basketball_tick(1, 40.0, scored(110, 80));
    let p = basketball_pipeline().process(&tick).unwrap().projection;

    let adj = p.overlay(OverlayKind::Blowout).unwrap();
    assert!(adj < 0.0);
    assert!((p.fair_value - (p.raw_projection + adj)).abs() < EPS);
}

#[test]
fn test_malformed_box_rejected() {
    let mut stats = golden_stats();
    stats.away.fg3m = 20;
    let err = basketball_pipeline()
        .process(&basketball_tick(1, 24.0, stats))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::CountsInconsistent { team: "away", .. })
    ));
}

#[test]
fn test_counts_must_not_decrease() {
    let mut pipeline = basketball_pipeline();
    pipeline.process(&basketball_tick(1, 20.0, box_at(5))).unwrap();

    let err = pipeline
        .process(&basketball_tick(2, 22.0, box_at(4)))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::CountDecreased { .. })
    ));
    assert_eq!(pipeline.last_sequence(), Some(1));
}

#[test]
fn test_elapsed_must_not_regress() {
    let mut pipeline = basketball_pipeline();
    pipeline.process(&basketball_tick(1, 20.0, box_at(5))).unwrap();

    let err = pipeline
        .process(&basketball_tick(2, 18.0, box_at(5)))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::ElapsedRegressed { .. })
    ));
}

// ============================================================================
// Hockey
// ============================================================================

#[test]
fn test_breakaway_beats_slap_shot() {
    let model = HockeyModel::default();
    let breakaway_slap = shot(TeamSide::Home, 10.0, "Breakaway Slap Shot");

    assert_eq!(model.context(&breakaway_slap, None), ShotContext::Breakaway);
    let xg = model.shot_xg(&breakaway_slap, None, 0, &hockey_priors());
    assert!((xg - 0.075 * 3.0).abs() < EPS);
}

#[test]
fn test_rebound_needs_same_team_quickly() {
    let model = HockeyModel::default();
    let first = shot(TeamSide::Away, 11.0, "Wrist Shot");
    let quick = shot(TeamSide::Away, 11.02, "Slap Shot");
    let other_team = shot(TeamSide::Home, 11.02, "Wrist Shot");
    let late = shot(TeamSide::Away, 12.0, "Wrist Shot");

    assert_eq!(model.context(&quick, Some(&first)), ShotContext::Rebound);
    assert_eq!(model.context(&other_team, Some(&first)), ShotContext::Standard);
    assert_eq!(model.context(&late, Some(&first)), ShotContext::Standard);
}

#[test]
fn test_hockey_puck_drop_matches_closing_total() {
    let tick = hockey_tick(1, 0.0, HockeyStats::default());
    let snapshot = hockey_pipeline().process(&tick).unwrap();
    let p = &snapshot.projection;

    assert!((p.fair_value - 6.0).abs() < EPS);
    assert!((p.remaining_possessions - 60.0).abs() < EPS);
    assert_eq!(p.confidence, 0.0);
    assert!(snapshot.edge_z.abs() < EPS);
}

#[test]
fn test_hockey_trust_grows_with_shots() {
    let mut pipeline = hockey_pipeline();
    let mut last_trust = -1.0;
    for tick in &hockey_game().ticks {
        let p = pipeline.process(tick).unwrap().projection;
        assert!(p.confidence > last_trust);
        assert!(p.confidence <= 0.8);
        assert!(p.volatility >= 0.3 && p.volatility <= 2.5);
        last_trust = p.confidence;
    }
}

#[test]
fn test_empty_net_bonus_for_one_goal_deficit() {
    let mut stats = hockey_stats_after(6);
    // 1-1 after six shots; make it 2-1 away with home pulled
    stats.shots.push(goal(TeamSide::Away, 40.0, "Wrist Shot"));
    stats.away_goals = 2;
    stats.goalie_pulled = Some(TeamSide::Home);

    let tick = hockey_tick(1, 58.0, stats);
    let p = hockey_pipeline().process(&tick).unwrap().projection;
    assert_eq!(p.overlay(OverlayKind::EmptyNet), Some(0.55));
    assert!(p.overlay(OverlayKind::TiedGameDecay).is_none());
}

#[test]
fn test_late_tie_decays_remaining_goals() {
    let stats = hockey_stats_after(6);
    assert_eq!(stats.home_goals, stats.away_goals);

    let tick = hockey_tick(1, 57.0, stats);
    let p = hockey_pipeline().process(&tick).unwrap().projection;
    let delta = p.overlay(OverlayKind::TiedGameDecay).unwrap();
    assert!(delta < 0.0);
    assert!(p.fair_value < p.raw_projection);
}

#[test]
fn test_unordered_shots_rejected() {
    let mut stats = hockey_stats_after(4);
    stats.shots.swap(1, 2);
    let err = hockey_pipeline()
        .process(&hockey_tick(1, 12.0, stats))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::ShotsUnordered { index: 2, .. })
    ));
}

#[test]
fn test_future_shot_rejected() {
    let stats = HockeyStats {
        shots: vec![shot(TeamSide::Home, 55.0, "Breakaway")],
        ..HockeyStats::default()
    };
    let mut pipeline = hockey_pipeline();
    let err = pipeline.process(&hockey_tick(1, 10.0, stats)).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::ShotAfterClock { index: 0, .. })
    ));
    assert_eq!(pipeline.last_sequence(), None);
}

#[test]
fn test_rewritten_shot_history_rejected() {
    let mut pipeline = hockey_pipeline();
    pipeline
        .process(&hockey_tick(1, 10.0, hockey_stats_after(2)))
        .unwrap();

    let rewritten = HockeyStats {
        shots: vec![shot(TeamSide::Away, 1.0, "Wrist Shot")],
        ..HockeyStats::default()
    };
    let err = pipeline
        .process(&hockey_tick(2, 11.0, rewritten))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::ShotHistoryRewritten { index: 0 })
    ));
    assert_eq!(pipeline.last_sequence(), Some(1));
}

#[test]
fn test_unflagged_late_leader_projects_lower() {
    let shots = vec![
        shot(TeamSide::Home, 52.0, "Wrist Shot"),
        shot(TeamSide::Home, 55.0, "Wrist Shot"),
    ];
    let leading = HockeyStats {
        home_goals: 2,
        shots: shots.clone(),
        ..HockeyStats::default()
    };
    let tied = HockeyStats {
        shots,
        ..HockeyStats::default()
    };

    let led = hockey_pipeline()
        .process(&hockey_tick(1, 56.0, leading))
        .unwrap()
        .projection;
    let level = hockey_pipeline()
        .process(&hockey_tick(1, 56.0, tied))
        .unwrap()
        .projection;
    // same shots, so the gap is the dampened xG rate alone
    assert!(led.structural_rate < level.structural_rate);
}
