//! Projection model: one generic pipeline, one strategy per sport
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 GamePipeline<M: SportModel>                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Tick arrives                                               │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  TickValidator  ── stale / malformed ──► rejected           │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  M::project()                                               │
//! │    possessions → pace blend → rate → prior anchor           │
//! │    → raw projection → endgame overlays → volatility         │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  EdgeScorer  → ProjectionSnapshot                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`SportModel`]: Strategy trait implemented by each sport
//! - [`BasketballModel`]: Points-per-possession total model
//! - [`HockeyModel`]: Expected-goals total model
//! - [`GamePipeline`]: Per-game validation, projection and edge scoring
//! - [`TickValidator`]: Boundary checks and the sequence guard
//!
//! # Example
//!
//! ```ignore
//! let model = Arc::new(BasketballModel::new(config.basketball.clone()));
//! let mut pipeline = GamePipeline::new(model, "0022500123", priors);
//!
//! for tick in ticks {
//!     match pipeline.process(&tick) {
//!         Ok(snapshot) => store.save_snapshot(&snapshot).await?,
//!         Err(EngineError::Validation(e)) => warn!("skipping tick: {}", e),
//!         Err(e) => return Err(e),
//!     }
//! }
//! ```

pub mod basketball;
pub mod edge;
pub mod hockey;
pub mod overlay;
pub mod pace;
pub mod pipeline;
mod traits;
pub mod validator;

pub use basketball::{
    BasketballModel, BasketballPriors, BasketballStats, BlowoutDelta, BlowoutProfile, TeamBox,
    TeamPriors,
};
pub use edge::EdgeScorer;
pub use hockey::{GoalieTier, HockeyModel, HockeyPriors, HockeyStats, ShotEvent, Strength};
pub use pace::{PaceBlender, PaceEstimate, PossessionEstimator};
pub use pipeline::GamePipeline;
pub use traits::SportModel;
pub use validator::TickValidator;
