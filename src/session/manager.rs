//! Session lifecycle management.
//!
//! The single entry point for callers: resolves parameters, creates and
//! finalizes sessions, and triggers adaptation and analytics. Written
//! against [`BreathingStore`] only; the backend and adaptation strategy
//! are chosen at composition time.

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::adaptation::engine::{AdaptationEngine, AdaptationStrategy};
use crate::analytics::aggregator::{ProgressAggregator, ProgressReport};
use crate::breathing::config::BreathingConfig;
use crate::breathing::types::{
    BreathingParameters, ComfortRating, LungCapacitySample, Mode, Session, SessionUpdate,
};
use crate::storage::store::{BreathingStore, StoreError};

/// Default history page size.
const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Manages breathing sessions from creation to completion.
pub struct SessionManager<S: BreathingStore> {
    store: S,
    config: BreathingConfig,
    adaptation: AdaptationEngine,
}

impl<S: BreathingStore> SessionManager<S> {
    /// Create a manager with the default (metric-gated) adaptation strategy.
    pub fn new(store: S, config: BreathingConfig) -> Self {
        Self::with_strategy(store, config, AdaptationStrategy::default())
    }

    /// Create a manager with an explicit adaptation strategy.
    pub fn with_strategy(
        store: S,
        config: BreathingConfig,
        strategy: AdaptationStrategy,
    ) -> Self {
        Self {
            store,
            config,
            adaptation: AdaptationEngine::new(strategy),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The parameters for (user, mode), seeding from the mode defaults on
    /// first request.
    pub fn parameters(
        &mut self,
        user_id: Uuid,
        mode: Mode,
    ) -> Result<BreathingParameters, SessionError> {
        if let Some(parameters) = self.store.parameters(user_id, mode)? {
            return Ok(parameters);
        }

        let defaults = self.config.defaults_for(mode);
        tracing::info!(user = %user_id, mode = %mode, "Seeding breathing parameters from defaults");

        Ok(self
            .store
            .seed_parameters(user_id, mode, defaults, Utc::now())?)
    }

    /// Like [`Self::parameters`], but resolving the mode from its
    /// transport name. An unknown name is a `NotFound`.
    pub fn parameters_by_name(
        &mut self,
        user_id: Uuid,
        mode: &str,
    ) -> Result<BreathingParameters, SessionError> {
        let mode = mode
            .parse::<Mode>()
            .map_err(|_| SessionError::NotFound(format!("Mode {}", mode)))?;

        self.parameters(user_id, mode)
    }

    /// Start a session and return its id.
    ///
    /// The effective duration is the custom override when positive, else
    /// the mode's current `total_duration_seconds` (the parameter row if
    /// seeded, the injected defaults otherwise). The parameter lookup is
    /// read-only: starting a session never seeds a row.
    pub fn create_session(
        &mut self,
        user_id: Uuid,
        mode: Mode,
        custom_duration_seconds: Option<u32>,
    ) -> Result<i64, SessionError> {
        let default_duration = match self.store.parameters(user_id, mode)? {
            Some(parameters) => parameters.total_duration_seconds,
            None => self.config.defaults_for(mode).total_duration_seconds,
        };

        let duration = match custom_duration_seconds {
            Some(duration) if duration > 0 => duration,
            _ => default_duration,
        };

        let id = self
            .store
            .insert_session(user_id, mode, duration, Utc::now())?;

        Ok(id)
    }

    /// Mark a session completed and recompute the user's progress.
    ///
    /// Completing an already-completed session is a no-op, not an error;
    /// the analytics recompute still runs.
    pub fn complete_session(&mut self, session_id: i64, user_id: Uuid) -> Result<(), SessionError> {
        self.owned_session(session_id, user_id)?;

        self.store.mark_completed(session_id, user_id, Utc::now())?;
        self.recompute_progress(user_id);

        Ok(())
    }

    /// Record a comfort rating (and optional lung-capacity sample), then
    /// adapt the mode's parameters.
    pub fn rate_session(
        &mut self,
        session_id: i64,
        user_id: Uuid,
        rating: ComfortRating,
        sample: Option<LungCapacitySample>,
    ) -> Result<(), SessionError> {
        let session = self.owned_session(session_id, user_id)?;
        let now = Utc::now();

        self.store
            .set_comfort_rating(session_id, user_id, rating, now)?;

        if let Some(sample) = sample {
            self.store
                .insert_metric(user_id, session_id, &sample, now)?;
        }

        self.adapt_parameters(user_id, session.mode, rating);

        Ok(())
    }

    /// Like [`Self::rate_session`], but resolving the rating from its
    /// transport name. An unknown name is an `InvalidArgument`.
    pub fn rate_session_by_name(
        &mut self,
        session_id: i64,
        user_id: Uuid,
        rating: &str,
        sample: Option<LungCapacitySample>,
    ) -> Result<(), SessionError> {
        let rating = rating
            .parse::<ComfortRating>()
            .map_err(SessionError::InvalidArgument)?;

        self.rate_session(session_id, user_id, rating, sample)
    }

    /// Apply a partial update, mirroring the transport PATCH payload.
    ///
    /// Flag writes happen first, then the metric append, then the engine
    /// follow-ups. An update with no recognized field is rejected.
    pub fn update_session(
        &mut self,
        session_id: i64,
        user_id: Uuid,
        update: SessionUpdate,
    ) -> Result<(), SessionError> {
        if update.is_empty() {
            return Err(SessionError::InvalidArgument(
                "no updates provided".to_string(),
            ));
        }

        let session = self.owned_session(session_id, user_id)?;
        let now = Utc::now();

        if update.completed == Some(true) {
            self.store.mark_completed(session_id, user_id, now)?;
        }

        if let Some(rating) = update.comfort_rating {
            self.store
                .set_comfort_rating(session_id, user_id, rating, now)?;
        }

        if let Some(sample) = update.lung_capacity {
            self.store
                .insert_metric(user_id, session_id, &sample, now)?;
        }

        if let Some(rating) = update.comfort_rating {
            self.adapt_parameters(user_id, session.mode, rating);
        }

        if update.completed == Some(true) {
            self.recompute_progress(user_id);
        }

        Ok(())
    }

    /// Session history for a user, newest first.
    pub fn recent_sessions(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<Session>, SessionError> {
        Ok(self
            .store
            .recent_sessions(user_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))?)
    }

    /// The user's progress summary with recent metric samples.
    pub fn progress(&mut self, user_id: Uuid) -> Result<ProgressReport, SessionError> {
        Ok(ProgressAggregator::report(
            &mut self.store,
            user_id,
            Utc::now(),
        )?)
    }

    /// Fetch a session and enforce ownership.
    fn owned_session(&self, session_id: i64, user_id: Uuid) -> Result<Session, SessionError> {
        self.store
            .session(session_id, user_id)?
            .ok_or_else(|| SessionError::NotFound(format!("Session {}", session_id)))
    }

    /// Best-effort adaptation follow-up. A failure here is reported but
    /// never rolls back the rating that was already written.
    fn adapt_parameters(&mut self, user_id: Uuid, mode: Mode, rating: ComfortRating) {
        if let Err(e) = self
            .adaptation
            .adapt(&mut self.store, user_id, mode, rating, Utc::now())
        {
            tracing::warn!(user = %user_id, mode = %mode, error = %e, "Parameter adaptation failed");
        }
    }

    /// Best-effort analytics follow-up, same contract as adaptation.
    fn recompute_progress(&mut self, user_id: Uuid) {
        let now = Utc::now();
        if let Err(e) =
            ProgressAggregator::recompute(&mut self.store, user_id, now.date_naive(), now)
        {
            tracing::warn!(user = %user_id, error = %e, "Progress recompute failed");
        }
    }
}

/// Errors surfaced by session lifecycle operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
