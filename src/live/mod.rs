//! Outer polling loop for in-progress games

pub mod poller;

pub use poller::{CycleStats, LivePoller, PollSummary};
