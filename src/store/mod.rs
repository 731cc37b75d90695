//! Persistence adapters for the [`GameStore`](crate::common::traits::GameStore) trait

pub mod memory;
pub mod postgres;

pub use memory::{GameRecord, MemoryStore};
pub use postgres::PostgresStore;
