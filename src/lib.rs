//! Live Projection Library
//!
//! Deterministic in-game fair-value projections for basketball totals and
//! hockey expected goals, with a replay harness that proves historical
//! snapshots can be recomputed exactly.

pub mod common;
pub mod config;
pub mod live;
pub mod model;
pub mod replay;
pub mod store;

// Re-export commonly used types
pub use common::errors::{EngineError, Result, ValidationError};
pub use common::traits::GameStore;
pub use common::types::{
    Overlay, OverlayKind, Projection, ProjectionSnapshot, Sport, TeamSide, Tick,
};
pub use config::types::AppConfig;

// Model types
pub use model::{
    BasketballModel, BasketballPriors, BasketballStats, EdgeScorer, GamePipeline, HockeyModel,
    HockeyPriors, HockeyStats, SportModel, TickValidator,
};

pub use live::{LivePoller, PollSummary};
pub use replay::{ReplayReport, ReplayRequest, ReplayVerifier};
pub use store::{GameRecord, MemoryStore, PostgresStore};
