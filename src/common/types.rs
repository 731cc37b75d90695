//! Core domain types shared by both sport models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sport identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Basketball,
    Hockey,
}

impl Sport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Basketball => "basketball",
            Sport::Hockey => "hockey",
        }
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sport {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basketball" | "nba" => Ok(Sport::Basketball),
            "hockey" | "nhl" => Ok(Sport::Hockey),
            other => Err(format!("unknown sport: {other}")),
        }
    }
}

/// Home or away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opponent(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        }
    }
}

/// Immutable in-game snapshot for one game
///
/// Produced by the ingestion collaborator once per polling cycle. `stats`
/// carries the sport-specific cumulative counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick<S> {
    /// Game identifier
    pub game_id: String,
    /// Tick identifier (persistence key together with `game_id`)
    pub tick_id: i64,
    /// Monotonic delivery sequence for ordering and duplicate detection
    pub sequence: u64,
    /// When the ingestion layer captured this snapshot
    pub captured_at: DateTime<Utc>,
    /// Game minutes played
    pub elapsed_minutes: f64,
    /// Game minutes left in regulation (or the current overtime)
    pub remaining_minutes: f64,
    /// Period number (1-based)
    pub period: u8,
    /// Display clock within the period, e.g. "05:42"
    #[serde(default)]
    pub clock: String,
    /// Live market total quoted at capture time
    #[serde(default)]
    pub live_market_total: Option<f64>,
    /// Sport-specific cumulative statistics
    pub stats: S,
}

/// Situational correction applied on top of the raw projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    /// Trailing team fouling intentionally in the final minutes
    FoulStrategy,
    /// Expected extra scoring from a tied regulation
    Overtime,
    /// Garbage-time pace/efficiency drift in a lopsided game
    Blowout,
    /// Tied hockey game playing for overtime
    TiedGameDecay,
    /// Goalie pulled for an extra attacker
    EmptyNet,
}

/// An active overlay and its contribution to the fair value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub kind: OverlayKind,
    pub value: f64,
}

impl Overlay {
    pub fn new(kind: OverlayKind, value: f64) -> Self {
        Self { kind, value }
    }
}

/// Every intermediate quantity a sport model produces for one tick
///
/// Field meanings are shared across sports. Hockey reports shots for
/// `possessions`, expected remaining shots for `remaining_possessions`,
/// xG per minute for the rates and `banked xG - goals` for `luck_gap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Combined score at the tick
    pub current_score: f64,
    /// Live possession (or shot) count
    pub possessions: f64,
    /// Weight given to live data versus the pregame prior
    pub blend_weight: f64,
    /// Pace after blending live and prior
    pub blended_pace: f64,
    /// Possessions (or shots) expected in the remaining time
    pub remaining_possessions: f64,
    /// Pregame scoring rate derived from the closing line
    pub anchor_rate: f64,
    /// Luck-corrected live scoring rate
    pub structural_rate: f64,
    /// Rate used for the projection after blending
    pub projected_rate: f64,
    /// Points (or goals) attributable to shooting luck
    pub luck_gap: f64,
    /// Lineup strength shift added to the projected rate
    pub lineup_adjustment: f64,
    /// Projection before overlays
    pub raw_projection: f64,
    /// Active overlays
    pub overlays: Vec<Overlay>,
    /// Clamped standard deviation used for the edge
    pub volatility: f64,
    /// Trust in live data, 0..1
    pub confidence: f64,
    /// Raw projection plus overlays
    pub fair_value: f64,
}

impl Projection {
    /// Sum of all overlay contributions
    pub fn overlay_total(&self) -> f64 {
        self.overlays.iter().map(|o| o.value).sum()
    }

    /// Look up an active overlay by kind
    pub fn overlay(&self, kind: OverlayKind) -> Option<f64> {
        self.overlays.iter().find(|o| o.kind == kind).map(|o| o.value)
    }
}

/// Persisted projection for a single tick
///
/// Write-once; keyed by `(game_id, tick_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSnapshot {
    pub game_id: String,
    pub tick_id: i64,
    pub sequence: u64,
    pub sport: Sport,
    pub elapsed_minutes: f64,
    pub remaining_minutes: f64,
    /// Model intermediates and fair value
    pub projection: Projection,
    /// Market line the edge was measured against
    pub market_line: Option<f64>,
    /// `(fair - market) / volatility`; positive favors the over
    pub edge_z: f64,
    /// SHA-256 of the tick and priors that produced this snapshot
    pub input_digest: String,
}

impl ProjectionSnapshot {
    pub fn fair_value(&self) -> f64 {
        self.projection.fair_value
    }
}
