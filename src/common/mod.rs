//! Shared types, errors and traits

pub mod errors;
pub mod math;
pub mod traits;
pub mod types;
