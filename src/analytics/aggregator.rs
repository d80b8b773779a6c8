//! Progress analytics recomputation.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use crate::analytics::capacity::{capacity_score, difficulty_for};
use crate::analytics::streak::consecutive_days;
use crate::breathing::types::{LungCapacityMetric, ProgressAnalytics};
use crate::storage::store::{BreathingStore, StoreError};

/// How many recent metric samples feed the capacity score.
const CAPACITY_METRIC_WINDOW: usize = 10;
/// How many recent samples a progress report carries.
const REPORT_METRIC_LIMIT: usize = 10;

/// Analytics record plus the recent samples it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    /// The per-user summary record.
    pub analytics: ProgressAnalytics,
    /// The most recent lung-capacity samples, newest first.
    pub recent_metrics: Vec<LungCapacityMetric>,
}

/// Recomputes the per-user progress summary from full history.
///
/// Every invocation rebuilds the whole record rather than patching it
/// incrementally; history sizes are small enough that O(history) per
/// completed session is the simpler correct choice.
pub struct ProgressAggregator;

impl ProgressAggregator {
    /// Rebuild and persist the analytics record for a user.
    ///
    /// `today` anchors the streak walk; callers pass the current UTC
    /// date outside of tests.
    pub fn recompute<S: BreathingStore>(
        store: &mut S,
        user_id: Uuid,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<ProgressAnalytics, StoreError> {
        let completed = store.completed_sessions(user_id)?;

        let total_seconds: u64 = completed.iter().map(|s| u64::from(s.duration_seconds)).sum();
        let total_training_minutes = (total_seconds / 60) as u32;

        let averages = store.metric_averages(user_id, CAPACITY_METRIC_WINDOW)?;
        let current_lung_capacity = capacity_score(averages);

        let previous = store.analytics(user_id)?;

        // The first computed score becomes the baseline and stays fixed
        let baseline = previous
            .as_ref()
            .and_then(|a| a.baseline_lung_capacity)
            .unwrap_or(current_lung_capacity);

        let capacity_improvement_percent = if baseline > 0.0 {
            (current_lung_capacity - baseline) / baseline * 100.0
        } else {
            0.0
        };

        let active_dates: HashSet<NaiveDate> = completed
            .iter()
            .map(|s| s.created_at.date_naive())
            .collect();
        let consecutive_days_streak = consecutive_days(&active_dates, today);

        let best_streak = previous
            .as_ref()
            .map(|a| a.best_streak)
            .unwrap_or(0)
            .max(consecutive_days_streak);

        let difficulty_level = difficulty_for(current_lung_capacity, consecutive_days_streak);

        let analytics = ProgressAnalytics {
            user_id,
            baseline_lung_capacity: Some(baseline),
            current_lung_capacity,
            capacity_improvement_percent,
            total_training_minutes,
            consecutive_days_streak,
            best_streak,
            difficulty_level,
            last_session_date: Some(today),
            updated_at: now,
        };

        store.save_analytics(&analytics)?;

        Ok(analytics)
    }

    /// The current analytics record with its recent samples, creating a
    /// fresh beginner record on first read.
    pub fn report<S: BreathingStore>(
        store: &mut S,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<ProgressReport, StoreError> {
        let analytics = match store.analytics(user_id)? {
            Some(analytics) => analytics,
            None => {
                let fresh = ProgressAnalytics::new(user_id, now);
                store.save_analytics(&fresh)?;
                fresh
            }
        };

        let recent_metrics = store.recent_metrics(user_id, REPORT_METRIC_LIMIT)?;

        Ok(ProgressReport {
            analytics,
            recent_metrics,
        })
    }
}
