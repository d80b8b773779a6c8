//! Unit tests for parameter resolution and session duration binding.

use breathflow::{BreathingConfig, BreathingStore, Mode, SessionError, SessionManager, SqliteStore};
use uuid::Uuid;

fn manager() -> SessionManager<SqliteStore> {
    let store = SqliteStore::open_in_memory().expect("Failed to open store");
    SessionManager::new(store, BreathingConfig::default())
}

#[test]
fn test_fresh_user_gets_documented_defaults() {
    let mut manager = manager();
    let user = Uuid::new_v4();

    let daily = manager.parameters(user, Mode::Daily).unwrap();
    assert_eq!(daily.inhale_seconds, 4.0);
    assert_eq!(daily.exhale_seconds, 6.0);
    assert_eq!(daily.pause_seconds, 0.0);
    assert_eq!(daily.total_duration_seconds, 360);

    let reset = manager.parameters(user, Mode::Reset).unwrap();
    assert_eq!(reset.inhale_seconds, 4.0);
    assert_eq!(reset.exhale_seconds, 8.0);
    assert_eq!(reset.pause_seconds, 2.0);
    assert_eq!(reset.total_duration_seconds, 60);

    let silent = manager.parameters(user, Mode::Silent).unwrap();
    assert_eq!(silent.inhale_seconds, 4.0);
    assert_eq!(silent.exhale_seconds, 6.0);
    assert_eq!(silent.total_duration_seconds, 360);
}

#[test]
fn test_second_call_returns_seeded_row() {
    let mut manager = manager();
    let user = Uuid::new_v4();

    let first = manager.parameters(user, Mode::Daily).unwrap();
    let second = manager.parameters(user, Mode::Daily).unwrap();

    assert_eq!(second.inhale_seconds, first.inhale_seconds);
    assert_eq!(second.exhale_seconds, first.exhale_seconds);
    assert_eq!(second.pause_seconds, first.pause_seconds);
    assert_eq!(second.total_duration_seconds, first.total_duration_seconds);
    assert_eq!(second.created_at, first.created_at);
}

#[test]
fn test_parameters_are_per_user() {
    let mut manager = manager();
    let first_user = Uuid::new_v4();
    let second_user = Uuid::new_v4();

    manager.parameters(first_user, Mode::Daily).unwrap();
    let other = manager.parameters(second_user, Mode::Daily).unwrap();

    assert_eq!(other.user_id, second_user);
    assert_eq!(other.inhale_seconds, 4.0);
}

#[test]
fn test_unknown_mode_name_is_not_found() {
    let mut manager = manager();
    let user = Uuid::new_v4();

    let result = manager.parameters_by_name(user, "box");
    assert!(matches!(result, Err(SessionError::NotFound(_))));

    // Known names resolve
    let daily = manager.parameters_by_name(user, "daily").unwrap();
    assert_eq!(daily.mode, Mode::Daily);
}

#[test]
fn test_session_duration_uses_parameter_default() {
    let mut manager = manager();
    let user = Uuid::new_v4();

    let id = manager.create_session(user, Mode::Daily, None).unwrap();
    let session = manager.store().session(id, user).unwrap().unwrap();

    assert_eq!(session.duration_seconds, 360);
    assert!(!session.completed);
    assert!(session.comfort_rating.is_none());
}

#[test]
fn test_session_duration_uses_custom_override() {
    let mut manager = manager();
    let user = Uuid::new_v4();

    let id = manager.create_session(user, Mode::Daily, Some(120)).unwrap();
    let session = manager.store().session(id, user).unwrap().unwrap();

    assert_eq!(session.duration_seconds, 120);
}

#[test]
fn test_zero_override_falls_back_to_default() {
    let mut manager = manager();
    let user = Uuid::new_v4();

    let id = manager.create_session(user, Mode::Reset, Some(0)).unwrap();
    let session = manager.store().session(id, user).unwrap().unwrap();

    assert_eq!(session.duration_seconds, 60);
}

#[test]
fn test_create_session_does_not_seed_parameters() {
    let mut manager = manager();
    let user = Uuid::new_v4();

    manager.create_session(user, Mode::Daily, None).unwrap();

    // The parameter lookup during creation is read-only
    assert!(manager
        .store()
        .parameters(user, Mode::Daily)
        .unwrap()
        .is_none());
}
