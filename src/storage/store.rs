//! Storage interface shared by the durable and offline backends.
//!
//! The session manager and both engines are written against
//! [`BreathingStore`] only; the backend is chosen at composition time.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::breathing::config::ModeDefaults;
use crate::breathing::types::{
    BreathingParameters, ComfortRating, LungCapacityMetric, LungCapacitySample, Mode,
    ProgressAnalytics, Session, Timings,
};

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to connect to store: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

/// Rolling averages over a window of recent lung-capacity samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricAverages {
    /// Mean of `average_inhale_depth` over the window.
    pub inhale_depth: f64,
    /// Mean of `average_exhale_control` over the window.
    pub exhale_control: f64,
    /// Mean of `max_breath_hold_seconds` over the window.
    pub breath_hold_seconds: f64,
}

/// Persistence operations behind the session lifecycle.
///
/// Reads take `&self`, writes `&mut self`; the design assumes at most one
/// in-flight mutating request per user and provides no transactional
/// isolation across read-modify-write sequences.
pub trait BreathingStore {
    /// The parameter row for (user, mode), if one has been seeded.
    fn parameters(
        &self,
        user_id: Uuid,
        mode: Mode,
    ) -> Result<Option<BreathingParameters>, StoreError>;

    /// Create the parameter row for (user, mode) from the mode defaults.
    fn seed_parameters(
        &mut self,
        user_id: Uuid,
        mode: Mode,
        defaults: ModeDefaults,
        now: DateTime<Utc>,
    ) -> Result<BreathingParameters, StoreError>;

    /// Overwrite the timing fields of an existing parameter row.
    fn update_timings(
        &mut self,
        user_id: Uuid,
        mode: Mode,
        timings: Timings,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Append a session in the Created state and return its id.
    fn insert_session(
        &mut self,
        user_id: Uuid,
        mode: Mode,
        duration_seconds: u32,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    /// A session by id, scoped to its owner.
    fn session(&self, session_id: i64, user_id: Uuid) -> Result<Option<Session>, StoreError>;

    /// Up to `limit` sessions for a user, newest first.
    fn recent_sessions(&self, user_id: Uuid, limit: usize) -> Result<Vec<Session>, StoreError>;

    /// All completed sessions for a user, newest first.
    fn completed_sessions(&self, user_id: Uuid) -> Result<Vec<Session>, StoreError>;

    /// Set `completed = true`. Idempotent.
    fn mark_completed(
        &mut self,
        session_id: i64,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Set or overwrite the comfort rating.
    fn set_comfort_rating(
        &mut self,
        session_id: i64,
        user_id: Uuid,
        rating: ComfortRating,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Ratings of the most recent `limit` rated sessions for (user, mode),
    /// newest first.
    fn recent_ratings(
        &self,
        user_id: Uuid,
        mode: Mode,
        limit: usize,
    ) -> Result<Vec<ComfortRating>, StoreError>;

    /// Append a lung-capacity sample for a session.
    fn insert_metric(
        &mut self,
        user_id: Uuid,
        session_id: i64,
        sample: &LungCapacitySample,
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Averages over the `limit` most recent samples for a user, or `None`
    /// when no samples exist yet.
    fn metric_averages(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Option<MetricAverages>, StoreError>;

    /// The `limit` most recent samples for a user, newest first.
    fn recent_metrics(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<LungCapacityMetric>, StoreError>;

    /// The analytics record for a user, if initialized.
    fn analytics(&self, user_id: Uuid) -> Result<Option<ProgressAnalytics>, StoreError>;

    /// Persist an analytics record, creating it when absent.
    ///
    /// `baseline_lung_capacity` follows COALESCE semantics: once a stored
    /// record carries a baseline, later saves never overwrite it.
    fn save_analytics(&mut self, analytics: &ProgressAnalytics) -> Result<(), StoreError>;
}
