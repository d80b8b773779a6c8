//! Durable store backed by SQLite, keyed by real user id.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::breathing::config::ModeDefaults;
use crate::breathing::types::{
    BreathingParameters, ComfortRating, DifficultyLevel, LungCapacityMetric, LungCapacitySample,
    Mode, ProgressAnalytics, Session, Timings,
};
use crate::storage::database::Database;
use crate::storage::store::{BreathingStore, MetricAverages, StoreError};

/// SQLite-backed implementation of [`BreathingStore`].
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    pub fn open(path: &std::path::PathBuf) -> Result<Self, StoreError> {
        Ok(Self {
            db: Database::open(path)?,
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            db: Database::open_in_memory()?,
        })
    }

    /// Wrap an already-opened database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl BreathingStore for SqliteStore {
    fn parameters(
        &self,
        user_id: Uuid,
        mode: Mode,
    ) -> Result<Option<BreathingParameters>, StoreError> {
        let result = self.db.connection().query_row(
            "SELECT inhale_seconds, exhale_seconds, pause_seconds, total_duration_seconds,
             created_at, updated_at
             FROM breathing_parameters WHERE user_id = ?1 AND mode = ?2",
            params![user_id.to_string(), mode.as_str()],
            |row| {
                Ok(ParameterRow {
                    inhale_seconds: row.get(0)?,
                    exhale_seconds: row.get(1)?,
                    pause_seconds: row.get(2)?,
                    total_duration_seconds: row.get(3)?,
                    created_at: row.get(4)?,
                    updated_at: row.get(5)?,
                })
            },
        );

        match result {
            Ok(row) => Ok(Some(row.into_parameters(user_id, mode)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::QueryFailed(e.to_string())),
        }
    }

    fn seed_parameters(
        &mut self,
        user_id: Uuid,
        mode: Mode,
        defaults: ModeDefaults,
        now: DateTime<Utc>,
    ) -> Result<BreathingParameters, StoreError> {
        self.db
            .connection()
            .execute(
                "INSERT INTO breathing_parameters
                 (user_id, mode, inhale_seconds, exhale_seconds, pause_seconds,
                  total_duration_seconds, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    user_id.to_string(),
                    mode.as_str(),
                    defaults.inhale_seconds,
                    defaults.exhale_seconds,
                    defaults.pause_seconds,
                    defaults.total_duration_seconds,
                    now.to_rfc3339(),
                ],
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(BreathingParameters {
            user_id,
            mode,
            inhale_seconds: defaults.inhale_seconds,
            exhale_seconds: defaults.exhale_seconds,
            pause_seconds: defaults.pause_seconds,
            total_duration_seconds: defaults.total_duration_seconds,
            created_at: now,
            updated_at: now,
        })
    }

    fn update_timings(
        &mut self,
        user_id: Uuid,
        mode: Mode,
        timings: Timings,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.db
            .connection()
            .execute(
                "UPDATE breathing_parameters
                 SET inhale_seconds = ?3, exhale_seconds = ?4, pause_seconds = ?5, updated_at = ?6
                 WHERE user_id = ?1 AND mode = ?2",
                params![
                    user_id.to_string(),
                    mode.as_str(),
                    timings.inhale_seconds,
                    timings.exhale_seconds,
                    timings.pause_seconds,
                    now.to_rfc3339(),
                ],
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn insert_session(
        &mut self,
        user_id: Uuid,
        mode: Mode,
        duration_seconds: u32,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.db
            .connection()
            .execute(
                "INSERT INTO breathing_sessions
                 (user_id, mode, duration_seconds, completed, comfort_rating, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 0, NULL, ?4, ?4)",
                params![
                    user_id.to_string(),
                    mode.as_str(),
                    duration_seconds,
                    created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(self.db.connection().last_insert_rowid())
    }

    fn session(&self, session_id: i64, user_id: Uuid) -> Result<Option<Session>, StoreError> {
        let result = self.db.connection().query_row(
            "SELECT id, mode, duration_seconds, completed, comfort_rating, created_at, updated_at
             FROM breathing_sessions WHERE id = ?1 AND user_id = ?2",
            params![session_id, user_id.to_string()],
            session_row,
        );

        match result {
            Ok(row) => Ok(Some(row.into_session(user_id)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::QueryFailed(e.to_string())),
        }
    }

    fn recent_sessions(&self, user_id: Uuid, limit: usize) -> Result<Vec<Session>, StoreError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(
                "SELECT id, mode, duration_seconds, completed, comfort_rating, created_at, updated_at
                 FROM breathing_sessions WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT ?2",
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id.to_string(), limit as i64], session_row)
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let mut sessions = Vec::new();
        for row in rows {
            let row = row.map_err(|e| StoreError::QueryFailed(e.to_string()))?;
            sessions.push(row.into_session(user_id)?);
        }

        Ok(sessions)
    }

    fn completed_sessions(&self, user_id: Uuid) -> Result<Vec<Session>, StoreError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(
                "SELECT id, mode, duration_seconds, completed, comfort_rating, created_at, updated_at
                 FROM breathing_sessions WHERE user_id = ?1 AND completed = 1
                 ORDER BY created_at DESC, id DESC",
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id.to_string()], session_row)
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let mut sessions = Vec::new();
        for row in rows {
            let row = row.map_err(|e| StoreError::QueryFailed(e.to_string()))?;
            sessions.push(row.into_session(user_id)?);
        }

        Ok(sessions)
    }

    fn mark_completed(
        &mut self,
        session_id: i64,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.db
            .connection()
            .execute(
                "UPDATE breathing_sessions SET completed = 1, updated_at = ?3
                 WHERE id = ?1 AND user_id = ?2",
                params![session_id, user_id.to_string(), now.to_rfc3339()],
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn set_comfort_rating(
        &mut self,
        session_id: i64,
        user_id: Uuid,
        rating: ComfortRating,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.db
            .connection()
            .execute(
                "UPDATE breathing_sessions SET comfort_rating = ?3, updated_at = ?4
                 WHERE id = ?1 AND user_id = ?2",
                params![
                    session_id,
                    user_id.to_string(),
                    rating.as_str(),
                    now.to_rfc3339(),
                ],
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn recent_ratings(
        &self,
        user_id: Uuid,
        mode: Mode,
        limit: usize,
    ) -> Result<Vec<ComfortRating>, StoreError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(
                "SELECT comfort_rating FROM breathing_sessions
                 WHERE user_id = ?1 AND mode = ?2 AND comfort_rating IS NOT NULL
                 ORDER BY created_at DESC, id DESC LIMIT ?3",
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![user_id.to_string(), mode.as_str(), limit as i64],
                |row| row.get::<_, String>(0),
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let mut ratings = Vec::new();
        for row in rows {
            let name = row.map_err(|e| StoreError::QueryFailed(e.to_string()))?;
            ratings.push(parse_rating(&name)?);
        }

        Ok(ratings)
    }

    fn insert_metric(
        &mut self,
        user_id: Uuid,
        session_id: i64,
        sample: &LungCapacitySample,
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.db
            .connection()
            .execute(
                "INSERT INTO lung_capacity_metrics
                 (user_id, session_id, max_breath_hold_seconds, average_inhale_depth,
                  average_exhale_control, comfort_level, respiratory_rate, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    user_id.to_string(),
                    session_id,
                    sample.max_breath_hold_seconds,
                    sample.average_inhale_depth,
                    sample.average_exhale_control,
                    sample.comfort_level,
                    sample.respiratory_rate,
                    created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn metric_averages(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Option<MetricAverages>, StoreError> {
        let result: (Option<f64>, Option<f64>, Option<f64>) = self
            .db
            .connection()
            .query_row(
                "SELECT AVG(average_inhale_depth), AVG(average_exhale_control),
                        AVG(max_breath_hold_seconds)
                 FROM (SELECT average_inhale_depth, average_exhale_control, max_breath_hold_seconds
                       FROM lung_capacity_metrics WHERE user_id = ?1
                       ORDER BY created_at DESC, id DESC LIMIT ?2)",
                params![user_id.to_string(), limit as i64],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        match result {
            (Some(inhale_depth), Some(exhale_control), Some(breath_hold_seconds)) => {
                Ok(Some(MetricAverages {
                    inhale_depth,
                    exhale_control,
                    breath_hold_seconds,
                }))
            }
            _ => Ok(None),
        }
    }

    fn recent_metrics(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<LungCapacityMetric>, StoreError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(
                "SELECT session_id, max_breath_hold_seconds, average_inhale_depth,
                        average_exhale_control, comfort_level, respiratory_rate, created_at
                 FROM lung_capacity_metrics WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT ?2",
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id.to_string(), limit as i64], |row| {
                Ok(MetricRow {
                    session_id: row.get(0)?,
                    max_breath_hold_seconds: row.get(1)?,
                    average_inhale_depth: row.get(2)?,
                    average_exhale_control: row.get(3)?,
                    comfort_level: row.get(4)?,
                    respiratory_rate: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        let mut metrics = Vec::new();
        for row in rows {
            let row = row.map_err(|e| StoreError::QueryFailed(e.to_string()))?;
            metrics.push(row.into_metric()?);
        }

        Ok(metrics)
    }

    fn analytics(&self, user_id: Uuid) -> Result<Option<ProgressAnalytics>, StoreError> {
        let result = self.db.connection().query_row(
            "SELECT baseline_lung_capacity, current_lung_capacity, capacity_improvement_percent,
                    total_training_minutes, consecutive_days_streak, best_streak,
                    difficulty_level, last_session_date, updated_at
             FROM user_progress_analytics WHERE user_id = ?1",
            params![user_id.to_string()],
            |row| {
                Ok(AnalyticsRow {
                    baseline_lung_capacity: row.get(0)?,
                    current_lung_capacity: row.get(1)?,
                    capacity_improvement_percent: row.get(2)?,
                    total_training_minutes: row.get(3)?,
                    consecutive_days_streak: row.get(4)?,
                    best_streak: row.get(5)?,
                    difficulty_level: row.get(6)?,
                    last_session_date: row.get(7)?,
                    updated_at: row.get(8)?,
                })
            },
        );

        match result {
            Ok(row) => Ok(Some(row.into_analytics(user_id)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::QueryFailed(e.to_string())),
        }
    }

    fn save_analytics(&mut self, analytics: &ProgressAnalytics) -> Result<(), StoreError> {
        self.db
            .connection()
            .execute(
                "INSERT INTO user_progress_analytics
                 (user_id, baseline_lung_capacity, current_lung_capacity,
                  capacity_improvement_percent, total_training_minutes,
                  consecutive_days_streak, best_streak, difficulty_level,
                  last_session_date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
                 ON CONFLICT(user_id) DO UPDATE SET
                     baseline_lung_capacity =
                         COALESCE(user_progress_analytics.baseline_lung_capacity,
                                  excluded.baseline_lung_capacity),
                     current_lung_capacity = excluded.current_lung_capacity,
                     capacity_improvement_percent = excluded.capacity_improvement_percent,
                     total_training_minutes = excluded.total_training_minutes,
                     consecutive_days_streak = excluded.consecutive_days_streak,
                     best_streak = excluded.best_streak,
                     difficulty_level = excluded.difficulty_level,
                     last_session_date = excluded.last_session_date,
                     updated_at = excluded.updated_at",
                params![
                    analytics.user_id.to_string(),
                    analytics.baseline_lung_capacity,
                    analytics.current_lung_capacity,
                    analytics.capacity_improvement_percent,
                    analytics.total_training_minutes,
                    analytics.consecutive_days_streak,
                    analytics.best_streak,
                    analytics.difficulty_level.as_str(),
                    analytics.last_session_date.map(|d| d.to_string()),
                    analytics.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(())
    }
}

/// Intermediate struct for reading parameter rows from the database.
struct ParameterRow {
    inhale_seconds: f64,
    exhale_seconds: f64,
    pause_seconds: f64,
    total_duration_seconds: u32,
    created_at: String,
    updated_at: String,
}

impl ParameterRow {
    fn into_parameters(
        self,
        user_id: Uuid,
        mode: Mode,
    ) -> Result<BreathingParameters, StoreError> {
        Ok(BreathingParameters {
            user_id,
            mode,
            inhale_seconds: self.inhale_seconds,
            exhale_seconds: self.exhale_seconds,
            pause_seconds: self.pause_seconds,
            total_duration_seconds: self.total_duration_seconds,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Intermediate struct for reading session rows from the database.
struct SessionRow {
    id: i64,
    mode: String,
    duration_seconds: u32,
    completed: bool,
    comfort_rating: Option<String>,
    created_at: String,
    updated_at: String,
}

fn session_row(row: &rusqlite::Row) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        id: row.get(0)?,
        mode: row.get(1)?,
        duration_seconds: row.get(2)?,
        completed: row.get(3)?,
        comfort_rating: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl SessionRow {
    fn into_session(self, user_id: Uuid) -> Result<Session, StoreError> {
        let mode = self
            .mode
            .parse::<Mode>()
            .map_err(StoreError::DeserializationError)?;

        let comfort_rating = match self.comfort_rating {
            Some(name) => Some(parse_rating(&name)?),
            None => None,
        };

        Ok(Session {
            id: self.id,
            user_id,
            mode,
            duration_seconds: self.duration_seconds,
            completed: self.completed,
            comfort_rating,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Intermediate struct for reading metric rows from the database.
struct MetricRow {
    session_id: i64,
    max_breath_hold_seconds: f64,
    average_inhale_depth: f64,
    average_exhale_control: f64,
    comfort_level: f64,
    respiratory_rate: Option<f64>,
    created_at: String,
}

impl MetricRow {
    fn into_metric(self) -> Result<LungCapacityMetric, StoreError> {
        Ok(LungCapacityMetric {
            session_id: self.session_id,
            max_breath_hold_seconds: self.max_breath_hold_seconds,
            average_inhale_depth: self.average_inhale_depth,
            average_exhale_control: self.average_exhale_control,
            comfort_level: self.comfort_level,
            respiratory_rate: self.respiratory_rate,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

/// Intermediate struct for reading analytics rows from the database.
struct AnalyticsRow {
    baseline_lung_capacity: Option<f64>,
    current_lung_capacity: f64,
    capacity_improvement_percent: f64,
    total_training_minutes: u32,
    consecutive_days_streak: u32,
    best_streak: u32,
    difficulty_level: String,
    last_session_date: Option<String>,
    updated_at: String,
}

impl AnalyticsRow {
    fn into_analytics(self, user_id: Uuid) -> Result<ProgressAnalytics, StoreError> {
        let difficulty_level = self
            .difficulty_level
            .parse::<DifficultyLevel>()
            .map_err(StoreError::DeserializationError)?;

        let last_session_date = self
            .last_session_date
            .map(|s| s.parse::<NaiveDate>())
            .transpose()
            .map_err(|e| {
                StoreError::DeserializationError(format!("Invalid session date: {}", e))
            })?;

        Ok(ProgressAnalytics {
            user_id,
            baseline_lung_capacity: self.baseline_lung_capacity,
            current_lung_capacity: self.current_lung_capacity,
            capacity_improvement_percent: self.capacity_improvement_percent,
            total_training_minutes: self.total_training_minutes,
            consecutive_days_streak: self.consecutive_days_streak,
            best_streak: self.best_streak,
            difficulty_level,
            last_session_date,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::DeserializationError(format!("Invalid timestamp: {}", e)))
}

fn parse_rating(name: &str) -> Result<ComfortRating, StoreError> {
    name.parse::<ComfortRating>()
        .map_err(StoreError::DeserializationError)
}
