//! Offline single-profile store with JSON write-through.
//!
//! The in-memory fallback used when no durable backend is available.
//! State lives in plain structs and, when opened against a file, is
//! rewritten as JSON after every mutation. The store tracks a single
//! profile: user ids are recorded on rows but not used as a lookup key,
//! matching the implicit-user semantics of the offline client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::breathing::config::ModeDefaults;
use crate::breathing::types::{
    BreathingParameters, ComfortRating, LungCapacityMetric, LungCapacitySample, Mode,
    ProgressAnalytics, Session, Timings,
};
use crate::storage::store::{BreathingStore, MetricAverages, StoreError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct LocalState {
    parameters: Vec<BreathingParameters>,
    sessions: Vec<Session>,
    metrics: Vec<LungCapacityMetric>,
    analytics: Option<ProgressAnalytics>,
}

/// File-backed implementation of [`BreathingStore`] for offline use.
pub struct LocalStore {
    state: LocalState,
    path: Option<PathBuf>,
}

impl LocalStore {
    /// Create a store with no file backing. State dies with the value.
    pub fn in_memory() -> Self {
        Self {
            state: LocalState::default(),
            path: None,
        }
    }

    /// Open a store against a JSON file, loading existing state if present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let state = if path.exists() {
            let content =
                std::fs::read_to_string(&path).map_err(|e| StoreError::IoError(e.to_string()))?;
            serde_json::from_str(&content)
                .map_err(|e| StoreError::DeserializationError(e.to_string()))?
        } else {
            LocalState::default()
        };

        Ok(Self {
            state,
            path: Some(path),
        })
    }

    /// Default store location in the platform data directory.
    pub fn default_path() -> PathBuf {
        crate::breathing::config::get_data_dir().join("offline_store.json")
    }

    fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(&self.state)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| StoreError::IoError(e.to_string()))?;

        Ok(())
    }

    fn next_session_id(&self) -> i64 {
        self.state.sessions.last().map(|s| s.id + 1).unwrap_or(1)
    }
}

impl BreathingStore for LocalStore {
    fn parameters(
        &self,
        _user_id: Uuid,
        mode: Mode,
    ) -> Result<Option<BreathingParameters>, StoreError> {
        Ok(self
            .state
            .parameters
            .iter()
            .find(|p| p.mode == mode)
            .cloned())
    }

    fn seed_parameters(
        &mut self,
        user_id: Uuid,
        mode: Mode,
        defaults: ModeDefaults,
        now: DateTime<Utc>,
    ) -> Result<BreathingParameters, StoreError> {
        let parameters = BreathingParameters {
            user_id,
            mode,
            inhale_seconds: defaults.inhale_seconds,
            exhale_seconds: defaults.exhale_seconds,
            pause_seconds: defaults.pause_seconds,
            total_duration_seconds: defaults.total_duration_seconds,
            created_at: now,
            updated_at: now,
        };

        self.state.parameters.push(parameters.clone());
        self.persist()?;

        Ok(parameters)
    }

    fn update_timings(
        &mut self,
        _user_id: Uuid,
        mode: Mode,
        timings: Timings,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if let Some(p) = self.state.parameters.iter_mut().find(|p| p.mode == mode) {
            p.inhale_seconds = timings.inhale_seconds;
            p.exhale_seconds = timings.exhale_seconds;
            p.pause_seconds = timings.pause_seconds;
            p.updated_at = now;
            self.persist()?;
        }

        Ok(())
    }

    fn insert_session(
        &mut self,
        user_id: Uuid,
        mode: Mode,
        duration_seconds: u32,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let id = self.next_session_id();

        self.state.sessions.push(Session {
            id,
            user_id,
            mode,
            duration_seconds,
            completed: false,
            comfort_rating: None,
            created_at,
            updated_at: created_at,
        });
        self.persist()?;

        Ok(id)
    }

    fn session(&self, session_id: i64, _user_id: Uuid) -> Result<Option<Session>, StoreError> {
        Ok(self
            .state
            .sessions
            .iter()
            .find(|s| s.id == session_id)
            .cloned())
    }

    fn recent_sessions(&self, _user_id: Uuid, limit: usize) -> Result<Vec<Session>, StoreError> {
        Ok(self
            .state
            .sessions
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    fn completed_sessions(&self, _user_id: Uuid) -> Result<Vec<Session>, StoreError> {
        Ok(self
            .state
            .sessions
            .iter()
            .rev()
            .filter(|s| s.completed)
            .cloned()
            .collect())
    }

    fn mark_completed(
        &mut self,
        session_id: i64,
        _user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if let Some(s) = self
            .state
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
        {
            s.completed = true;
            s.updated_at = now;
            self.persist()?;
        }

        Ok(())
    }

    fn set_comfort_rating(
        &mut self,
        session_id: i64,
        _user_id: Uuid,
        rating: ComfortRating,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if let Some(s) = self
            .state
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
        {
            s.comfort_rating = Some(rating);
            s.updated_at = now;
            self.persist()?;
        }

        Ok(())
    }

    fn recent_ratings(
        &self,
        _user_id: Uuid,
        mode: Mode,
        limit: usize,
    ) -> Result<Vec<ComfortRating>, StoreError> {
        Ok(self
            .state
            .sessions
            .iter()
            .rev()
            .filter(|s| s.mode == mode)
            .filter_map(|s| s.comfort_rating)
            .take(limit)
            .collect())
    }

    fn insert_metric(
        &mut self,
        _user_id: Uuid,
        session_id: i64,
        sample: &LungCapacitySample,
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.state
            .metrics
            .push(LungCapacityMetric::from_sample(session_id, sample, created_at));
        self.persist()?;

        Ok(())
    }

    fn metric_averages(
        &self,
        _user_id: Uuid,
        limit: usize,
    ) -> Result<Option<MetricAverages>, StoreError> {
        let window: Vec<&LungCapacityMetric> =
            self.state.metrics.iter().rev().take(limit).collect();

        if window.is_empty() {
            return Ok(None);
        }

        let count = window.len() as f64;
        Ok(Some(MetricAverages {
            inhale_depth: window.iter().map(|m| m.average_inhale_depth).sum::<f64>() / count,
            exhale_control: window
                .iter()
                .map(|m| m.average_exhale_control)
                .sum::<f64>()
                / count,
            breath_hold_seconds: window
                .iter()
                .map(|m| m.max_breath_hold_seconds)
                .sum::<f64>()
                / count,
        }))
    }

    fn recent_metrics(
        &self,
        _user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<LungCapacityMetric>, StoreError> {
        Ok(self
            .state
            .metrics
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    fn analytics(&self, _user_id: Uuid) -> Result<Option<ProgressAnalytics>, StoreError> {
        Ok(self.state.analytics.clone())
    }

    fn save_analytics(&mut self, analytics: &ProgressAnalytics) -> Result<(), StoreError> {
        let mut record = analytics.clone();

        // Baseline follows COALESCE semantics: the stored value wins
        if let Some(existing) = self
            .state
            .analytics
            .as_ref()
            .and_then(|a| a.baseline_lung_capacity)
        {
            record.baseline_lung_capacity = Some(existing);
        }

        self.state.analytics = Some(record);
        self.persist()?;

        Ok(())
    }
}
