//! Guarded arithmetic shared by every model stage

/// Divide, returning `fallback` when the result would not be finite.
#[inline]
pub fn safe_div(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return fallback;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Clamp into `[lo, hi]`; NaN collapses to `lo`.
#[inline]
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        return lo;
    }
    value.max(lo).min(hi)
}

/// Clamp into the unit interval, used for every blend weight.
#[inline]
pub fn unit(value: f64) -> f64 {
    clamp(value, 0.0, 1.0)
}

/// Linear blend: `live * w + prior * (1 - w)`.
#[inline]
pub fn blend(live: f64, prior: f64, weight: f64) -> f64 {
    let w = unit(weight);
    live * w + prior * (1.0 - w)
}
