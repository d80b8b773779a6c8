//! Unit tests for progress analytics: streaks, baseline fixation, and
//! lifecycle idempotence.

use breathflow::{
    BreathingConfig, BreathingStore, ComfortRating, DifficultyLevel, LungCapacitySample, Mode,
    ProgressAggregator, SessionManager, SqliteStore,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

fn noon_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(12, 0, 0).unwrap().and_utc()
}

fn complete_session_on(store: &mut SqliteStore, user: Uuid, at: DateTime<Utc>) {
    let id = store.insert_session(user, Mode::Daily, 360, at).unwrap();
    store.mark_completed(id, user, at).unwrap();
}

#[test]
fn test_streak_counts_consecutive_days() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let user = Uuid::new_v4();
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

    // Completed sessions today and yesterday, none the day before
    complete_session_on(&mut store, user, noon_utc(today));
    complete_session_on(&mut store, user, noon_utc(today - Duration::days(1)));

    let analytics =
        ProgressAggregator::recompute(&mut store, user, today, noon_utc(today)).unwrap();
    assert_eq!(analytics.consecutive_days_streak, 2);
}

#[test]
fn test_streak_stops_at_gap() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let user = Uuid::new_v4();
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

    // Completed sessions today and two days ago; yesterday is a gap
    complete_session_on(&mut store, user, noon_utc(today));
    complete_session_on(&mut store, user, noon_utc(today - Duration::days(2)));

    let analytics =
        ProgressAggregator::recompute(&mut store, user, today, noon_utc(today)).unwrap();
    assert_eq!(analytics.consecutive_days_streak, 1);
}

#[test]
fn test_streak_is_zero_without_todays_session() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let user = Uuid::new_v4();
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

    complete_session_on(&mut store, user, noon_utc(today - Duration::days(1)));

    let analytics =
        ProgressAggregator::recompute(&mut store, user, today, noon_utc(today)).unwrap();
    assert_eq!(analytics.consecutive_days_streak, 0);
}

#[test]
fn test_uncompleted_sessions_do_not_count() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let user = Uuid::new_v4();
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

    store
        .insert_session(user, Mode::Daily, 360, noon_utc(today))
        .unwrap();

    let analytics =
        ProgressAggregator::recompute(&mut store, user, today, noon_utc(today)).unwrap();
    assert_eq!(analytics.consecutive_days_streak, 0);
    assert_eq!(analytics.total_training_minutes, 0);
}

#[test]
fn test_training_minutes_floor_of_total_seconds() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let user = Uuid::new_v4();
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    let at = noon_utc(today);

    for duration in [90, 45] {
        let id = store.insert_session(user, Mode::Daily, duration, at).unwrap();
        store.mark_completed(id, user, at).unwrap();
    }

    // 135 seconds floors to 2 minutes
    let analytics = ProgressAggregator::recompute(&mut store, user, today, at).unwrap();
    assert_eq!(analytics.total_training_minutes, 2);
}

#[test]
fn test_complete_session_is_idempotent() {
    let store = SqliteStore::open_in_memory().unwrap();
    let mut manager = SessionManager::new(store, BreathingConfig::default());
    let user = Uuid::new_v4();

    let id = manager.create_session(user, Mode::Daily, None).unwrap();
    manager.complete_session(id, user).unwrap();
    manager.complete_session(id, user).unwrap();

    let session = manager.store().session(id, user).unwrap().unwrap();
    assert!(session.completed);
}

#[test]
fn test_fresh_user_progress_is_beginner() {
    let store = SqliteStore::open_in_memory().unwrap();
    let mut manager = SessionManager::new(store, BreathingConfig::default());
    let user = Uuid::new_v4();

    let report = manager.progress(user).unwrap();

    assert_eq!(report.analytics.difficulty_level, DifficultyLevel::Beginner);
    assert_eq!(report.analytics.consecutive_days_streak, 0);
    assert_eq!(report.analytics.total_training_minutes, 0);
    assert!(report.recent_metrics.is_empty());
}

#[test]
fn test_baseline_is_fixed_after_first_completion() {
    let store = SqliteStore::open_in_memory().unwrap();
    let mut manager = SessionManager::new(store, BreathingConfig::default());
    let user = Uuid::new_v4();

    let id = manager.create_session(user, Mode::Daily, None).unwrap();
    manager.complete_session(id, user).unwrap();

    let baseline = manager
        .progress(user)
        .unwrap()
        .analytics
        .baseline_lung_capacity
        .expect("Baseline should be set after first completion");

    // Strong samples raise the current score on later recomputes
    let sample = LungCapacitySample {
        max_breath_hold_seconds: 55.0,
        average_inhale_depth: 0.95,
        average_exhale_control: 0.95,
        comfort_level: 0.9,
        respiratory_rate: Some(6.0),
    };
    let next = manager.create_session(user, Mode::Daily, None).unwrap();
    manager
        .rate_session(next, user, ComfortRating::Lighter, Some(sample))
        .unwrap();
    manager.complete_session(next, user).unwrap();

    let analytics = manager.progress(user).unwrap().analytics;
    assert_eq!(analytics.baseline_lung_capacity, Some(baseline));
    assert!(analytics.current_lung_capacity > baseline);
    assert!(analytics.capacity_improvement_percent > 0.0);
}
