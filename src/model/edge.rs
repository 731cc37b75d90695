//! Volatility clamping and edge scoring

use crate::common::math::{clamp, safe_div};

/// Bounds for a volatility model
#[derive(Debug, Clone, Copy)]
pub struct VolatilityBounds {
    pub decay_min: f64,
    pub decay_max: f64,
    pub min: f64,
    pub max: f64,
}

/// Square-root time decay, clamped
///
/// `ratio` is remaining volume over a reference volume (possessions or
/// minutes).
pub fn time_decay(ratio: f64, bounds: &VolatilityBounds) -> f64 {
    clamp(ratio.max(0.0).sqrt(), bounds.decay_min, bounds.decay_max)
}

/// `clamp(base * multiplier * decay, min, max)`
pub fn clamped_volatility(base: f64, multiplier: f64, decay: f64, bounds: &VolatilityBounds) -> f64 {
    clamp(base * multiplier * decay, bounds.min, bounds.max)
}

/// Edge scorer
///
/// Positive edge means the model favors the higher side of the market line.
pub struct EdgeScorer;

impl EdgeScorer {
    /// Pick the live line, falling back to the closing line
    pub fn market_line(live: Option<f64>, closing: Option<f64>) -> Option<f64> {
        live.or(closing).filter(|m| m.is_finite())
    }

    /// `(fair - market) / volatility`, 0 without a market or a usable volatility
    pub fn edge_z(fair_value: f64, market: Option<f64>, volatility: f64) -> f64 {
        match market {
            Some(line) => safe_div(fair_value - line, volatility, 0.0),
            None => 0.0,
        }
    }
}
