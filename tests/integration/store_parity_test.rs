//! Both backends must produce identical parameter trajectories under the
//! same strategy and input sequence.

use breathflow::{
    AdaptationStrategy, BreathingConfig, BreathingStore, ComfortRating, LocalStore, Mode,
    SessionManager, SqliteStore,
};
use uuid::Uuid;

fn drive<S: BreathingStore>(
    manager: &mut SessionManager<S>,
    user: Uuid,
    mode: Mode,
    ratings: &[ComfortRating],
) -> (f64, f64, f64) {
    manager.parameters(user, mode).unwrap();

    for rating in ratings {
        let id = manager.create_session(user, mode, None).unwrap();
        manager.rate_session(id, user, *rating, None).unwrap();
    }

    let parameters = manager.parameters(user, mode).unwrap();
    (
        parameters.inhale_seconds,
        parameters.exhale_seconds,
        parameters.pause_seconds,
    )
}

#[test]
fn test_single_event_trajectories_match() {
    let ratings = [
        ComfortRating::Lighter,
        ComfortRating::Lighter,
        ComfortRating::Heavy,
        ComfortRating::Neutral,
        ComfortRating::Lighter,
    ];
    let user = Uuid::new_v4();

    for mode in Mode::ALL {
        let mut local = SessionManager::with_strategy(
            LocalStore::in_memory(),
            BreathingConfig::default(),
            AdaptationStrategy::SingleEvent,
        );
        let mut durable = SessionManager::with_strategy(
            SqliteStore::open_in_memory().unwrap(),
            BreathingConfig::default(),
            AdaptationStrategy::SingleEvent,
        );

        let from_local = drive(&mut local, user, mode, &ratings);
        let from_durable = drive(&mut durable, user, mode, &ratings);

        assert_eq!(from_local, from_durable, "trajectory diverged for {}", mode);
    }
}

#[test]
fn test_metric_gated_trajectories_match() {
    // Without metric samples the gate never opens, so only back-off fires
    let ratings = [
        ComfortRating::Lighter,
        ComfortRating::Heavy,
        ComfortRating::Heavy,
        ComfortRating::Lighter,
    ];
    let user = Uuid::new_v4();

    for mode in Mode::ALL {
        let mut local = SessionManager::with_strategy(
            LocalStore::in_memory(),
            BreathingConfig::default(),
            AdaptationStrategy::MetricGated,
        );
        let mut durable = SessionManager::with_strategy(
            SqliteStore::open_in_memory().unwrap(),
            BreathingConfig::default(),
            AdaptationStrategy::MetricGated,
        );

        let from_local = drive(&mut local, user, mode, &ratings);
        let from_durable = drive(&mut durable, user, mode, &ratings);

        assert_eq!(from_local, from_durable, "trajectory diverged for {}", mode);
    }
}

#[test]
fn test_local_store_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("offline_store.json");
    let user = Uuid::new_v4();

    {
        let store = LocalStore::open(&path).unwrap();
        let mut manager = SessionManager::with_strategy(
            store,
            BreathingConfig::default(),
            AdaptationStrategy::SingleEvent,
        );

        manager.parameters(user, Mode::Daily).unwrap();
        let id = manager.create_session(user, Mode::Daily, None).unwrap();
        manager
            .rate_session(id, user, ComfortRating::Lighter, None)
            .unwrap();
        manager.complete_session(id, user).unwrap();
    }

    let store = LocalStore::open(&path).unwrap();
    let mut manager = SessionManager::new(store, BreathingConfig::default());

    // The adapted parameters and session flags were written through
    let parameters = manager.parameters(user, Mode::Daily).unwrap();
    assert!((parameters.inhale_seconds - 4.3).abs() < 1e-9);
    assert!((parameters.exhale_seconds - 6.3).abs() < 1e-9);

    let session = manager.store().session(1, user).unwrap().unwrap();
    assert!(session.completed);
    assert_eq!(session.comfort_rating, Some(ComfortRating::Lighter));

    let report = manager.progress(user).unwrap();
    assert_eq!(report.analytics.total_training_minutes, 6);
}
