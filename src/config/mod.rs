//! Configuration loading and model coefficients

pub mod loader;
pub mod models;
pub mod types;
