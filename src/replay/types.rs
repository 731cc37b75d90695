use serde::{Deserialize, Serialize};

use crate::common::types::ProjectionSnapshot;

fn default_tolerance() -> f64 {
    1e-9
}

/// What to replay and how strictly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayRequest {
    pub game_id: String,
    /// Compare against persisted snapshots; otherwise only recompute
    #[serde(default = "default_verify")]
    pub verify_against_stored: bool,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_verify() -> bool {
    true
}

impl ReplayRequest {
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            verify_against_stored: true,
            tolerance: default_tolerance(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn recompute_only(mut self) -> Self {
        self.verify_against_stored = false;
        self
    }
}

/// Snapshot fields compared during replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayField {
    FairValue,
    EdgeZ,
    RemainingPossessions,
    LuckGap,
    StructuralRate,
}

impl ReplayField {
    pub const ALL: [ReplayField; 5] = [
        ReplayField::FairValue,
        ReplayField::EdgeZ,
        ReplayField::RemainingPossessions,
        ReplayField::LuckGap,
        ReplayField::StructuralRate,
    ];

    pub fn read(&self, snapshot: &ProjectionSnapshot) -> f64 {
        let p = &snapshot.projection;
        match self {
            ReplayField::FairValue => p.fair_value,
            ReplayField::EdgeZ => snapshot.edge_z,
            ReplayField::RemainingPossessions => p.remaining_possessions,
            ReplayField::LuckGap => p.luck_gap,
            ReplayField::StructuralRate => p.structural_rate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplayField::FairValue => "fair_value",
            ReplayField::EdgeZ => "edge_z",
            ReplayField::RemainingPossessions => "remaining_possessions",
            ReplayField::LuckGap => "luck_gap",
            ReplayField::StructuralRate => "structural_rate",
        }
    }
}

impl std::fmt::Display for ReplayField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    pub tick_id: i64,
    pub field: ReplayField,
    pub stored: f64,
    pub recomputed: f64,
    pub diff: f64,
}

/// A tick the validator turned away during replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedTick {
    pub tick_id: i64,
    pub sequence: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub first_tick: Option<i64>,
    pub last_tick: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    pub game_id: String,
    /// Ticks in the stored history, rejected ones included
    pub tick_count: usize,
    pub is_deterministic: bool,
    pub mismatches: Vec<Mismatch>,
    pub summary: ReplaySummary,
    pub rejected_ticks: Vec<RejectedTick>,
    /// Ticks whose recomputed input digest differs from the stored one
    pub input_drift: Vec<i64>,
    /// Accepted ticks with no persisted snapshot
    pub unmatched_ticks: Vec<i64>,
    /// Persisted snapshots whose tick was rejected or is missing from history
    pub orphaned_snapshots: Vec<i64>,
}
