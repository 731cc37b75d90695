//! Error types for the projection engine

use thiserror::Error;

/// Result type alias using our EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Tick rejected at the validator boundary
    #[error("Tick validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Database errors from the persistence collaborator
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No tick history exists for the game
    #[error("Game not found: {0}")]
    GameNotFound(String),

    /// No pregame priors exist for the game
    #[error("Pregame priors not found for game: {0}")]
    PriorsNotFound(String),

    /// Snapshots are write-once
    #[error("Snapshot already persisted for game {game_id} tick {tick_id}")]
    SnapshotExists { game_id: String, tick_id: i64 },

    /// Upstream store could not be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Whether the caller may retry the operation that produced this error.
    ///
    /// The engine itself never retries; this only classifies the failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Database(_) | EngineError::StoreUnavailable(_))
    }
}

/// Reasons a tick is rejected before it reaches numeric code
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Tick belongs to a different game than the pipeline
    #[error("tick for game {got} delivered to pipeline for game {expected}")]
    GameMismatch { expected: String, got: String },

    /// Elapsed or remaining time is negative or not a finite number
    #[error("invalid clock: elapsed={elapsed}, remaining={remaining}")]
    InvalidClock { elapsed: f64, remaining: f64 },

    /// Live market line is present but not finite
    #[error("non-finite market total: {0}")]
    InvalidMarket(f64),

    /// Makes exceed attempts (or a split exceeds its total)
    #[error("{team} {field}: {made} exceeds {attempted}")]
    CountsInconsistent {
        team: &'static str,
        field: &'static str,
        made: u32,
        attempted: u32,
    },

    /// A cumulative count went backwards relative to the last accepted tick
    #[error("{team} {field} decreased from {previous} to {current}")]
    CountDecreased {
        team: &'static str,
        field: &'static str,
        previous: u32,
        current: u32,
    },

    /// Shot records are not ordered by elapsed time
    #[error("shot {index} at {elapsed} precedes the previous shot")]
    ShotsUnordered { index: usize, elapsed: f64 },

    /// Shot record has a bad timestamp
    #[error("shot {index} has invalid elapsed time {elapsed}")]
    InvalidShot { index: usize, elapsed: f64 },

    /// Shot is stamped later than the tick's game clock
    #[error("shot {index} at {elapsed} is after the tick clock {clock}")]
    ShotAfterClock { index: usize, elapsed: f64, clock: f64 },

    /// Earlier shots were changed or dropped instead of appended to
    #[error("shot history rewritten at shot {index}")]
    ShotHistoryRewritten { index: usize },

    /// Goal-flagged shots disagree with the tick's score
    #[error("{team} has {flagged} goal-flagged shots but {goals} goals")]
    GoalFlagsMismatch {
        team: &'static str,
        flagged: u32,
        goals: u32,
    },

    /// Duplicate or stale delivery
    #[error("stale tick: sequence {got} is not after {last}")]
    StaleSequence { last: u64, got: u64 },

    /// Elapsed time moved backwards
    #[error("elapsed time went backwards: {got} after {last}")]
    ElapsedRegressed { last: f64, got: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(EngineError::StoreUnavailable("timeout".into()).is_retryable());
        assert!(EngineError::Database(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(!EngineError::GameNotFound("g1".into()).is_retryable());

        let err: EngineError = ValidationError::StaleSequence { last: 3, got: 3 }.into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_validation_message() {
        let err = ValidationError::CountsInconsistent {
            team: "home",
            field: "3PM",
            made: 7,
            attempted: 6,
        };
        assert_eq!(err.to_string(), "home 3PM: 7 exceeds 6");
    }
}
