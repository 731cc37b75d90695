//! Tick boundary validation
//!
//! Rejects malformed, duplicate and stale ticks before they reach numeric
//! code. A rejection never mutates the validator, so a bad delivery cannot
//! disturb the ordering state for the ticks that follow it.

use crate::common::errors::ValidationError;
use crate::common::types::Tick;

#[derive(Debug, Clone)]
struct Accepted<S> {
    sequence: u64,
    elapsed: f64,
    stats: S,
}

/// Ordering guard and sanity checks for one game's ticks
#[derive(Debug, Clone)]
pub struct TickValidator<S> {
    game_id: String,
    last: Option<Accepted<S>>,
}

impl<S: Clone> TickValidator<S> {
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            last: None,
        }
    }

    /// Sequence of the last accepted tick
    pub fn last_sequence(&self) -> Option<u64> {
        self.last.as_ref().map(|a| a.sequence)
    }

    /// Check a tick and, if it passes, record it as the latest accepted
    ///
    /// `check_stats` receives the incoming tick and the stats of the last
    /// accepted tick so the sport can enforce monotonic cumulative counts.
    pub fn admit<F>(&mut self, tick: &Tick<S>, check_stats: F) -> Result<(), ValidationError>
    where
        F: FnOnce(&Tick<S>, Option<&S>) -> Result<(), ValidationError>,
    {
        if tick.game_id != self.game_id {
            return Err(ValidationError::GameMismatch {
                expected: self.game_id.clone(),
                got: tick.game_id.clone(),
            });
        }

        let elapsed = tick.elapsed_minutes;
        let remaining = tick.remaining_minutes;
        if !elapsed.is_finite() || !remaining.is_finite() || elapsed < 0.0 || remaining < 0.0 {
            return Err(ValidationError::InvalidClock { elapsed, remaining });
        }

        if let Some(market) = tick.live_market_total {
            if !market.is_finite() {
                return Err(ValidationError::InvalidMarket(market));
            }
        }

        if let Some(last) = &self.last {
            if tick.sequence <= last.sequence {
                return Err(ValidationError::StaleSequence {
                    last: last.sequence,
                    got: tick.sequence,
                });
            }
            if elapsed < last.elapsed {
                return Err(ValidationError::ElapsedRegressed {
                    last: last.elapsed,
                    got: elapsed,
                });
            }
        }

        check_stats(tick, self.last.as_ref().map(|a| &a.stats))?;

        self.last = Some(Accepted {
            sequence: tick.sequence,
            elapsed,
            stats: tick.stats.clone(),
        });
        Ok(())
    }
}

/// `made <= attempted`
pub(crate) fn check_made(
    team: &'static str,
    field: &'static str,
    made: u32,
    attempted: u32,
) -> Result<(), ValidationError> {
    if made > attempted {
        return Err(ValidationError::CountsInconsistent {
            team,
            field,
            made,
            attempted,
        });
    }
    Ok(())
}

/// Cumulative count must not go backwards
pub(crate) fn check_monotonic(
    team: &'static str,
    field: &'static str,
    previous: u32,
    current: u32,
) -> Result<(), ValidationError> {
    if current < previous {
        return Err(ValidationError::CountDecreased {
            team,
            field,
            previous,
            current,
        });
    }
    Ok(())
}
