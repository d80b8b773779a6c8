//! Breathing protocol type definitions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Breathing protocol mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Daily practice: balanced inhale/exhale, no pause.
    Daily,
    /// Quick reset: long exhale with a held pause.
    Reset,
    /// Silent practice: daily timing without audio cues.
    Silent,
}

impl Mode {
    /// All known modes, in display order.
    pub const ALL: [Mode; 3] = [Mode::Daily, Mode::Reset, Mode::Silent];

    /// Stable lowercase name used in storage and transport.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Daily => "daily",
            Mode::Reset => "reset",
            Mode::Silent => "silent",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Mode::Daily),
            "reset" => Ok(Mode::Reset),
            "silent" => Ok(Mode::Silent),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

/// Post-session self-report of perceived breathing ease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComfortRating {
    /// The session felt easier than expected.
    Lighter,
    /// The session felt about right.
    Neutral,
    /// The session felt strained.
    Heavy,
}

impl ComfortRating {
    /// Stable lowercase name used in storage and transport.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComfortRating::Lighter => "lighter",
            ComfortRating::Neutral => "neutral",
            ComfortRating::Heavy => "heavy",
        }
    }
}

impl std::fmt::Display for ComfortRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComfortRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lighter" => Ok(ComfortRating::Lighter),
            "neutral" => Ok(ComfortRating::Neutral),
            "heavy" => Ok(ComfortRating::Heavy),
            other => Err(format!("unknown comfort rating: {}", other)),
        }
    }
}

/// Training difficulty tier derived from capacity score and streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    /// Starting tier.
    #[default]
    Beginner,
    /// Capacity >= 60 with a week-long streak.
    Intermediate,
    /// Capacity >= 75 with a two-week streak.
    Advanced,
}

impl DifficultyLevel {
    /// Stable lowercase name used in storage and transport.
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(DifficultyLevel::Beginner),
            "intermediate" => Ok(DifficultyLevel::Intermediate),
            "advanced" => Ok(DifficultyLevel::Advanced),
            other => Err(format!("unknown difficulty level: {}", other)),
        }
    }
}

/// The mutable timing fields of a parameter row.
///
/// Extracted as a small copy type so the adaptation rules can be applied
/// and compared without touching the row's identity or timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    /// Inhale phase length in seconds.
    pub inhale_seconds: f64,
    /// Exhale phase length in seconds.
    pub exhale_seconds: f64,
    /// Hold between exhale and the next inhale, in seconds.
    pub pause_seconds: f64,
}

/// Per-(user, mode) breathing timing parameters.
///
/// Seeded from the mode defaults on first request, then mutated only by
/// the adaptation engine. Never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathingParameters {
    /// Owning user.
    pub user_id: Uuid,
    /// Protocol mode this row belongs to.
    pub mode: Mode,
    /// Inhale phase length in seconds.
    pub inhale_seconds: f64,
    /// Exhale phase length in seconds.
    pub exhale_seconds: f64,
    /// Hold between exhale and the next inhale, in seconds.
    pub pause_seconds: f64,
    /// Default session length in seconds.
    pub total_duration_seconds: u32,
    /// When the row was seeded.
    pub created_at: DateTime<Utc>,
    /// Last adaptation write.
    pub updated_at: DateTime<Utc>,
}

impl BreathingParameters {
    /// The mutable timing fields as a value.
    pub fn timings(&self) -> Timings {
        Timings {
            inhale_seconds: self.inhale_seconds,
            exhale_seconds: self.exhale_seconds,
            pause_seconds: self.pause_seconds,
        }
    }
}

/// One breathing session attempt.
///
/// `completed` and `comfort_rating` are orthogonal flags: a session may
/// be rated before, after, or never relative to completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Store-assigned increasing id.
    pub id: i64,
    /// Owning user.
    pub user_id: Uuid,
    /// Protocol mode the session was started in.
    pub mode: Mode,
    /// Duration bound at creation: custom override or the parameter default.
    pub duration_seconds: u32,
    /// Whether the session ran to completion. Set once, idempotent.
    pub completed: bool,
    /// Post-session comfort self-report. Re-rating overwrites.
    pub comfort_rating: Option<ComfortRating>,
    /// When the session was started.
    pub created_at: DateTime<Utc>,
    /// Last flag write.
    pub updated_at: DateTime<Utc>,
}

/// Raw lung-capacity measurements reported alongside a rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LungCapacitySample {
    /// Longest breath hold during the session, in seconds.
    pub max_breath_hold_seconds: f64,
    /// Mean inhale depth, 0..=1.
    pub average_inhale_depth: f64,
    /// Mean exhale control, 0..=1.
    pub average_exhale_control: f64,
    /// Overall comfort, 0..=1.
    pub comfort_level: f64,
    /// Breaths per minute, when the client measured it.
    pub respiratory_rate: Option<f64>,
}

impl LungCapacitySample {
    /// Synthesize a sample from a comfort rating alone.
    ///
    /// Used by clients without measurement hardware so the progress
    /// dashboard still has data to average over.
    pub fn from_rating(rating: ComfortRating) -> Self {
        let (hold, depth, control, comfort) = match rating {
            ComfortRating::Lighter => (35.0, 0.8, 0.78, 0.75),
            ComfortRating::Neutral => (30.0, 0.7, 0.7, 0.65),
            ComfortRating::Heavy => (25.0, 0.6, 0.6, 0.55),
        };

        Self {
            max_breath_hold_seconds: hold,
            average_inhale_depth: depth,
            average_exhale_control: control,
            comfort_level: comfort,
            respiratory_rate: None,
        }
    }
}

/// A stored lung-capacity sample, keyed by (session, created_at).
///
/// Append-only: contributes to rolling averages, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LungCapacityMetric {
    /// Session the sample was taken from.
    pub session_id: i64,
    /// Longest breath hold during the session, in seconds.
    pub max_breath_hold_seconds: f64,
    /// Mean inhale depth, 0..=1.
    pub average_inhale_depth: f64,
    /// Mean exhale control, 0..=1.
    pub average_exhale_control: f64,
    /// Overall comfort, 0..=1.
    pub comfort_level: f64,
    /// Breaths per minute, when the client measured it.
    pub respiratory_rate: Option<f64>,
    /// When the sample was recorded.
    pub created_at: DateTime<Utc>,
}

impl LungCapacityMetric {
    /// Build a stored metric from a raw sample.
    pub fn from_sample(
        session_id: i64,
        sample: &LungCapacitySample,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            max_breath_hold_seconds: sample.max_breath_hold_seconds,
            average_inhale_depth: sample.average_inhale_depth,
            average_exhale_control: sample.average_exhale_control,
            comfort_level: sample.comfort_level,
            respiratory_rate: sample.respiratory_rate,
            created_at,
        }
    }
}

/// Rolling per-user progress summary.
///
/// Recomputed wholesale by the analytics aggregator on every completed
/// session; `baseline_lung_capacity` is fixed by the first recompute and
/// never overwritten afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressAnalytics {
    /// Owning user.
    pub user_id: Uuid,
    /// First computed capacity score; fixed once set.
    pub baseline_lung_capacity: Option<f64>,
    /// Latest capacity score, 0..=100.
    pub current_lung_capacity: f64,
    /// Percent change of current over baseline.
    pub capacity_improvement_percent: f64,
    /// Whole minutes across all completed sessions.
    pub total_training_minutes: u32,
    /// Consecutive calendar days with a completed session, ending today.
    pub consecutive_days_streak: u32,
    /// Longest streak ever observed. Monotonically non-decreasing.
    pub best_streak: u32,
    /// Derived difficulty tier.
    pub difficulty_level: DifficultyLevel,
    /// Calendar date of the last completion-triggered recompute.
    pub last_session_date: Option<NaiveDate>,
    /// Last recompute time.
    pub updated_at: DateTime<Utc>,
}

impl ProgressAnalytics {
    /// Fresh record for a user with no history.
    pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            baseline_lung_capacity: None,
            current_lung_capacity: 0.0,
            capacity_improvement_percent: 0.0,
            total_training_minutes: 0,
            consecutive_days_streak: 0,
            best_streak: 0,
            difficulty_level: DifficultyLevel::Beginner,
            last_session_date: None,
            updated_at: now,
        }
    }
}

/// Partial session update, mirroring the transport PATCH payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionUpdate {
    /// Mark the session completed. `Some(false)` is accepted and ignored;
    /// completion cannot be revoked.
    pub completed: Option<bool>,
    /// Set or overwrite the comfort rating.
    pub comfort_rating: Option<ComfortRating>,
    /// Append a lung-capacity sample for the session.
    pub lung_capacity: Option<LungCapacitySample>,
}

impl SessionUpdate {
    /// True when no recognized field is present.
    pub fn is_empty(&self) -> bool {
        self.completed.is_none() && self.comfort_rating.is_none() && self.lung_capacity.is_none()
    }
}
