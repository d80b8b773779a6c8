//! Lung-capacity scoring and difficulty tiers.

use crate::breathing::types::DifficultyLevel;
use crate::storage::store::MetricAverages;

/// Neutral fallbacks used before any metric samples exist.
const DEFAULT_INHALE_DEPTH: f64 = 0.5;
const DEFAULT_EXHALE_CONTROL: f64 = 0.5;
const DEFAULT_BREATH_HOLD_SECONDS: f64 = 10.0;

/// Score recent metric averages on a 0-100 scale.
///
/// Inhale depth and exhale control weigh 30 points each; breath hold,
/// normalized against a one-minute reference, weighs 40.
pub fn capacity_score(averages: Option<MetricAverages>) -> f64 {
    let averages = averages.unwrap_or(MetricAverages {
        inhale_depth: DEFAULT_INHALE_DEPTH,
        exhale_control: DEFAULT_EXHALE_CONTROL,
        breath_hold_seconds: DEFAULT_BREATH_HOLD_SECONDS,
    });

    let score = averages.inhale_depth * 30.0
        + averages.exhale_control * 30.0
        + (averages.breath_hold_seconds / 60.0) * 40.0;

    score.clamp(0.0, 100.0)
}

/// Difficulty tier for a capacity score and streak length.
pub fn difficulty_for(capacity: f64, streak_days: u32) -> DifficultyLevel {
    if capacity >= 75.0 && streak_days >= 14 {
        DifficultyLevel::Advanced
    } else if capacity >= 60.0 && streak_days >= 7 {
        DifficultyLevel::Intermediate
    } else {
        DifficultyLevel::Beginner
    }
}
