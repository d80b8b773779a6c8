//! Database schema definitions for BreathFlow.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- Per-user breathing parameters table
CREATE TABLE IF NOT EXISTS breathing_parameters (
    user_id TEXT NOT NULL,
    mode TEXT NOT NULL,
    inhale_seconds REAL NOT NULL,
    exhale_seconds REAL NOT NULL,
    pause_seconds REAL NOT NULL,
    total_duration_seconds INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (user_id, mode)
);

-- Breathing sessions table
CREATE TABLE IF NOT EXISTS breathing_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    mode TEXT NOT NULL,
    duration_seconds INTEGER NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    comfort_rating TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON breathing_sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_sessions_user_mode ON breathing_sessions(user_id, mode);
CREATE INDEX IF NOT EXISTS idx_sessions_created_at ON breathing_sessions(created_at);

-- Lung capacity metrics table
CREATE TABLE IF NOT EXISTS lung_capacity_metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    session_id INTEGER NOT NULL REFERENCES breathing_sessions(id),
    max_breath_hold_seconds REAL NOT NULL,
    average_inhale_depth REAL NOT NULL,
    average_exhale_control REAL NOT NULL,
    comfort_level REAL NOT NULL,
    respiratory_rate REAL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_metrics_user_id ON lung_capacity_metrics(user_id);
CREATE INDEX IF NOT EXISTS idx_metrics_session_id ON lung_capacity_metrics(session_id);

-- Per-user progress analytics table
CREATE TABLE IF NOT EXISTS user_progress_analytics (
    user_id TEXT PRIMARY KEY,
    baseline_lung_capacity REAL,
    current_lung_capacity REAL NOT NULL DEFAULT 0,
    capacity_improvement_percent REAL NOT NULL DEFAULT 0,
    total_training_minutes INTEGER NOT NULL DEFAULT 0,
    consecutive_days_streak INTEGER NOT NULL DEFAULT 0,
    best_streak INTEGER NOT NULL DEFAULT 0,
    difficulty_level TEXT NOT NULL DEFAULT 'beginner',
    last_session_date TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// SQL for schema version tracking (migrations)
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;
