use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::common::errors::ValidationError;
use crate::common::types::{Projection, Sport, Tick};

/// Sport strategy plugged into the generic pipeline
///
/// A model turns one validated tick plus the game's pregame priors into a
/// [`Projection`]. The pipeline owns ordering, validation bookkeeping, edge
/// scoring and snapshot assembly, so two sports cannot drift apart in any
/// of those steps.
///
/// # Implementation Notes
///
/// - `project` must be a pure function of its arguments: no clock, no
///   randomness, no state carried between calls
/// - Coefficients come from the model's config value, never globals
/// - Missing priors resolve to config fallbacks; never panic on sparse data
///
/// # Example
///
/// ```ignore
/// struct ConstantModel;
///
/// impl SportModel for ConstantModel {
///     type Stats = u32;
///     type Priors = f64;
///
///     fn sport(&self) -> Sport { Sport::Basketball }
///
///     fn check_stats(&self, _: &Tick<u32>, _: Option<&u32>) -> Result<(), ValidationError> {
///         Ok(())
///     }
///
///     fn project(&self, tick: &Tick<u32>, total: &f64) -> Projection {
///         // ...
///     }
///
///     fn closing_total(&self, total: &f64) -> Option<f64> { Some(*total) }
/// }
/// ```
pub trait SportModel: Send + Sync {
    /// Cumulative per-tick statistics
    type Stats: Clone + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Pregame priors, immutable for a game's lifetime
    type Priors: Clone + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Which sport this model scores
    fn sport(&self) -> Sport;

    /// Sport-specific tick checks
    ///
    /// # Arguments
    /// * `tick` - The incoming tick; its clock bounds the stats it carries
    /// * `previous` - Statistics of the last accepted tick, if any
    fn check_stats(
        &self,
        tick: &Tick<Self::Stats>,
        previous: Option<&Self::Stats>,
    ) -> Result<(), ValidationError>;

    /// Project the final combined score for one tick
    fn project(&self, tick: &Tick<Self::Stats>, priors: &Self::Priors) -> Projection;

    /// Closing market total, used when a tick carries no live line
    fn closing_total(&self, priors: &Self::Priors) -> Option<f64>;
}
