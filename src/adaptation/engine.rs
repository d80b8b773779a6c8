//! Comfort-driven parameter adaptation.
//!
//! Rewrites a user's timing parameters for one mode from their recent
//! comfort ratings and lung-capacity trend. The rule table is fixed:
//! step sizes and clamp bounds are shared by both trigger strategies so
//! that switching backends never changes the magnitude of an adjustment,
//! only when one fires.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::breathing::types::{ComfortRating, Mode, Timings};
use crate::storage::store::{BreathingStore, StoreError};

/// How many recent rated sessions feed the trend counters.
const RATING_WINDOW: usize = 5;
/// How many recent metric samples feed the averages.
const METRIC_WINDOW: usize = 5;
/// Lighter ratings in the window required before easing up.
const EASE_UP_LIGHTER_MIN: usize = 3;
/// Heavy ratings in the window that force a back-off.
const BACK_OFF_HEAVY_MIN: usize = 2;
/// Both metric averages must clear this before easing up.
const METRIC_GATE: f64 = 0.7;

/// Trigger strictness for parameter adaptation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationStrategy {
    /// Ease up only on a sustained lighter trend backed by metric
    /// averages. The default for the durable backend.
    #[default]
    MetricGated,
    /// React to each rating on its own. Used by the offline fallback,
    /// where no metric history is assumed.
    SingleEvent,
}

/// Applies the adaptation rule table against a store.
pub struct AdaptationEngine {
    strategy: AdaptationStrategy,
}

impl AdaptationEngine {
    /// Create an engine with the given trigger strategy.
    pub fn new(strategy: AdaptationStrategy) -> Self {
        Self { strategy }
    }

    /// The configured trigger strategy.
    pub fn strategy(&self) -> AdaptationStrategy {
        self.strategy
    }

    /// Adapt the parameters for (user, mode) after a rating was written.
    ///
    /// The rating window already includes the rating that triggered this
    /// call. Returns whether a parameter write occurred; no write happens
    /// when no field changes value.
    pub fn adapt<S: BreathingStore>(
        &self,
        store: &mut S,
        user_id: Uuid,
        mode: Mode,
        latest_rating: ComfortRating,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let Some(parameters) = store.parameters(user_id, mode)? else {
            // Nothing to adapt until the row has been seeded
            return Ok(false);
        };

        let (ease_up, back_off) = match self.strategy {
            AdaptationStrategy::SingleEvent => (
                latest_rating == ComfortRating::Lighter,
                latest_rating == ComfortRating::Heavy,
            ),
            AdaptationStrategy::MetricGated => {
                let ratings = store.recent_ratings(user_id, mode, RATING_WINDOW)?;
                let lighter_count = ratings
                    .iter()
                    .filter(|r| **r == ComfortRating::Lighter)
                    .count();
                let heavy_count = ratings
                    .iter()
                    .filter(|r| **r == ComfortRating::Heavy)
                    .count();

                // Missing averages count as zero and keep the gate shut
                let averages = store
                    .metric_averages(user_id, METRIC_WINDOW)?
                    .unwrap_or_default();

                let ease_up = lighter_count >= EASE_UP_LIGHTER_MIN
                    && latest_rating == ComfortRating::Lighter
                    && averages.inhale_depth > METRIC_GATE
                    && averages.exhale_control > METRIC_GATE;
                let back_off =
                    heavy_count >= BACK_OFF_HEAVY_MIN || latest_rating == ComfortRating::Heavy;

                (ease_up, back_off)
            }
        };

        let current = parameters.timings();
        let adjusted = adjust(mode, current, ease_up, back_off);

        if adjusted == current {
            return Ok(false);
        }

        tracing::debug!(
            user = %user_id,
            mode = %mode,
            rating = %latest_rating,
            ease_up,
            back_off,
            "Adapting breathing parameters"
        );

        store.update_timings(user_id, mode, adjusted, now)?;

        Ok(true)
    }
}

/// Apply the ease-up and back-off deltas for a mode.
///
/// Both branches may fire in one call; each field is clamped
/// independently after all adjustments.
pub fn adjust(mode: Mode, timings: Timings, ease_up: bool, back_off: bool) -> Timings {
    let mut inhale = timings.inhale_seconds;
    let mut exhale = timings.exhale_seconds;
    let mut pause = timings.pause_seconds;

    if ease_up {
        match mode {
            Mode::Daily | Mode::Silent => {
                // Longer inhale and exhale for better lung capacity
                inhale = (inhale + 0.3).min(7.0);
                exhale = (exhale + 0.3).min(9.0);
            }
            Mode::Reset => {
                // Extend the hold for better breath control
                pause = (pause + 0.15).min(3.0);
                inhale = (inhale + 0.2).min(5.0);
            }
        }
    }

    if back_off {
        match mode {
            Mode::Daily | Mode::Silent => {
                exhale = (exhale - 0.3).max(4.0);
                inhale = (inhale - 0.2).max(3.5);
            }
            Mode::Reset => {
                pause = (pause - 0.15).max(0.5);
            }
        }
    }

    Timings {
        inhale_seconds: inhale,
        exhale_seconds: exhale,
        pause_seconds: pause,
    }
}
