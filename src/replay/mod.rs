//! Deterministic replay of stored game history

pub mod types;
pub mod verifier;

pub use types::{Mismatch, RejectedTick, ReplayField, ReplayReport, ReplayRequest, ReplaySummary};
pub use verifier::{replay_history, verify_determinism, ReplayRun, ReplayVerifier};
