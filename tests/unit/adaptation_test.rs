//! Unit tests for the adaptation rule table driven through the manager.

use breathflow::{
    AdaptationStrategy, BreathingConfig, ComfortRating, LocalStore, LungCapacitySample, Mode,
    SessionManager, SqliteStore,
};
use uuid::Uuid;

fn single_event_manager() -> SessionManager<LocalStore> {
    SessionManager::with_strategy(
        LocalStore::in_memory(),
        BreathingConfig::default(),
        AdaptationStrategy::SingleEvent,
    )
}

fn metric_gated_manager() -> SessionManager<SqliteStore> {
    let store = SqliteStore::open_in_memory().expect("Failed to open store");
    SessionManager::with_strategy(
        store,
        BreathingConfig::default(),
        AdaptationStrategy::MetricGated,
    )
}

fn strong_sample() -> LungCapacitySample {
    LungCapacitySample {
        max_breath_hold_seconds: 35.0,
        average_inhale_depth: 0.8,
        average_exhale_control: 0.8,
        comfort_level: 0.8,
        respiratory_rate: None,
    }
}

#[test]
fn test_single_event_lighter_extends_daily_timing() {
    let mut manager = single_event_manager();
    let user = Uuid::new_v4();

    manager.parameters(user, Mode::Daily).unwrap();
    let id = manager.create_session(user, Mode::Daily, None).unwrap();
    manager
        .rate_session(id, user, ComfortRating::Lighter, None)
        .unwrap();

    let parameters = manager.parameters(user, Mode::Daily).unwrap();
    assert!((parameters.inhale_seconds - 4.3).abs() < 1e-9);
    assert!((parameters.exhale_seconds - 6.3).abs() < 1e-9);
    assert_eq!(parameters.pause_seconds, 0.0);
}

#[test]
fn test_single_event_neutral_changes_nothing() {
    let mut manager = single_event_manager();
    let user = Uuid::new_v4();

    manager.parameters(user, Mode::Daily).unwrap();
    let id = manager.create_session(user, Mode::Daily, None).unwrap();
    manager
        .rate_session(id, user, ComfortRating::Neutral, None)
        .unwrap();

    let parameters = manager.parameters(user, Mode::Daily).unwrap();
    assert_eq!(parameters.inhale_seconds, 4.0);
    assert_eq!(parameters.exhale_seconds, 6.0);
}

#[test]
fn test_repeated_lighter_ratings_respect_caps() {
    let mut manager = single_event_manager();
    let user = Uuid::new_v4();

    manager.parameters(user, Mode::Daily).unwrap();
    for _ in 0..20 {
        let id = manager.create_session(user, Mode::Daily, None).unwrap();
        manager
            .rate_session(id, user, ComfortRating::Lighter, None)
            .unwrap();

        let parameters = manager.parameters(user, Mode::Daily).unwrap();
        assert!(parameters.inhale_seconds <= 7.0);
        assert!(parameters.exhale_seconds <= 9.0);
    }

    let parameters = manager.parameters(user, Mode::Daily).unwrap();
    assert_eq!(parameters.inhale_seconds, 7.0);
    assert_eq!(parameters.exhale_seconds, 9.0);
}

#[test]
fn test_repeated_heavy_ratings_respect_floors() {
    let mut manager = single_event_manager();
    let user = Uuid::new_v4();

    manager.parameters(user, Mode::Daily).unwrap();
    for _ in 0..20 {
        let id = manager.create_session(user, Mode::Daily, None).unwrap();
        manager
            .rate_session(id, user, ComfortRating::Heavy, None)
            .unwrap();

        let parameters = manager.parameters(user, Mode::Daily).unwrap();
        assert!(parameters.exhale_seconds >= 4.0);
        assert!(parameters.inhale_seconds >= 3.5);
    }

    let parameters = manager.parameters(user, Mode::Daily).unwrap();
    assert_eq!(parameters.exhale_seconds, 4.0);
    assert_eq!(parameters.inhale_seconds, 3.5);

    // Reset mode floors its pause
    manager.parameters(user, Mode::Reset).unwrap();
    for _ in 0..20 {
        let id = manager.create_session(user, Mode::Reset, None).unwrap();
        manager
            .rate_session(id, user, ComfortRating::Heavy, None)
            .unwrap();
    }
    let parameters = manager.parameters(user, Mode::Reset).unwrap();
    assert_eq!(parameters.pause_seconds, 0.5);
}

#[test]
fn test_metric_gated_reset_eases_on_third_lighter() {
    let mut manager = metric_gated_manager();
    let user = Uuid::new_v4();

    let before = manager.parameters(user, Mode::Reset).unwrap();

    for round in 1..=3 {
        let id = manager.create_session(user, Mode::Reset, None).unwrap();
        manager
            .rate_session(id, user, ComfortRating::Lighter, Some(strong_sample()))
            .unwrap();

        let parameters = manager.parameters(user, Mode::Reset).unwrap();
        if round < 3 {
            // The lighter trend is not sustained yet
            assert_eq!(parameters.pause_seconds, before.pause_seconds);
            assert_eq!(parameters.inhale_seconds, before.inhale_seconds);
        }
    }

    let parameters = manager.parameters(user, Mode::Reset).unwrap();
    assert!((parameters.pause_seconds - (before.pause_seconds + 0.15)).abs() < 1e-9);
    assert!((parameters.inhale_seconds - (before.inhale_seconds + 0.2)).abs() < 1e-9);
    // Reset ease-up never touches the exhale
    assert_eq!(parameters.exhale_seconds, before.exhale_seconds);
}

#[test]
fn test_metric_gated_lighter_without_metrics_stays_shut() {
    let mut manager = metric_gated_manager();
    let user = Uuid::new_v4();

    manager.parameters(user, Mode::Daily).unwrap();
    for _ in 0..4 {
        let id = manager.create_session(user, Mode::Daily, None).unwrap();
        manager
            .rate_session(id, user, ComfortRating::Lighter, None)
            .unwrap();
    }

    // Sustained lighter trend, but no metric history to back it
    let parameters = manager.parameters(user, Mode::Daily).unwrap();
    assert_eq!(parameters.inhale_seconds, 4.0);
    assert_eq!(parameters.exhale_seconds, 6.0);
}

#[test]
fn test_metric_gated_single_heavy_backs_off_immediately() {
    let mut manager = metric_gated_manager();
    let user = Uuid::new_v4();

    manager.parameters(user, Mode::Daily).unwrap();
    let id = manager.create_session(user, Mode::Daily, None).unwrap();
    manager
        .rate_session(id, user, ComfortRating::Heavy, None)
        .unwrap();

    let parameters = manager.parameters(user, Mode::Daily).unwrap();
    assert!((parameters.exhale_seconds - 5.7).abs() < 1e-9);
    assert!((parameters.inhale_seconds - 3.8).abs() < 1e-9);
}

#[test]
fn test_adaptation_is_scoped_to_the_rated_mode() {
    let mut manager = single_event_manager();
    let user = Uuid::new_v4();

    manager.parameters(user, Mode::Daily).unwrap();
    manager.parameters(user, Mode::Silent).unwrap();

    let id = manager.create_session(user, Mode::Daily, None).unwrap();
    manager
        .rate_session(id, user, ComfortRating::Lighter, None)
        .unwrap();

    // Silent shares daily's rule table but keeps its own row
    let silent = manager.parameters(user, Mode::Silent).unwrap();
    assert_eq!(silent.inhale_seconds, 4.0);
    assert_eq!(silent.exhale_seconds, 6.0);
}
