//! Learned values and identities outlive the process that produced them.

use simdyna::{
    adapters::SqliteStore,
    app::{App, TrainingConfig},
    game::{DuelConfig, DuelGame},
    identifiers::Seat,
    pipeline::TrainingPipeline,
    ports::{Environment, IdentityStore, ValueStore},
};
use tempfile::TempDir;

fn short_training(games: usize, seed: u64) -> TrainingConfig {
    TrainingConfig::default()
        .with_games(games)
        .with_seed(seed)
        .with_duel(DuelConfig::default().with_max_turns(30))
}

#[test]
fn test_training_results_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("values.db");

    let (values, states, actions, all) = {
        let app = App::open(&path).unwrap();
        TrainingPipeline::new(short_training(10, 1), app.clone())
            .run()
            .unwrap();
        let store = app.store();
        (
            store.value_count(),
            store.state_count(),
            store.action_count(),
            store.load_all().unwrap(),
        )
    };
    assert!(values > 0);

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.value_count(), values);
    assert_eq!(store.state_count(), states);
    assert_eq!(store.action_count(), actions);
    assert_eq!(store.load_all().unwrap(), all);
}

#[test]
fn test_training_resumes_on_existing_store() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("values.db");

    let first = {
        let app = App::open(&path).unwrap();
        TrainingPipeline::new(short_training(5, 2), app)
            .run()
            .unwrap()
    };

    let app = App::open(&path).unwrap();
    let opening_before = {
        let game = DuelGame::new(DuelConfig::default(), app.catalog(), 0).unwrap();
        app.identity_codec()
            .state_id(&game.observe(Seat::new(0)))
            .unwrap()
    };
    let second = TrainingPipeline::new(short_training(5, 3), app.clone())
        .run()
        .unwrap();

    assert!(second.value_entries >= first.value_entries);
    // Identities are stable while the second run adds to the store.
    let game = DuelGame::new(DuelConfig::default(), app.catalog(), 0).unwrap();
    assert_eq!(
        app.identity_codec()
            .state_id(&game.observe(Seat::new(0)))
            .unwrap(),
        opening_before
    );
}

#[test]
fn test_first_seen_order_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("values.db");

    let recorded: Vec<_> = {
        let app = App::open(&path).unwrap();
        TrainingPipeline::new(short_training(3, 4), app.clone())
            .run()
            .unwrap();
        let store = app.store();
        (0..store.recorded_state_count())
            .map(|i| {
                let state = store.recorded_state(i).unwrap();
                (state, store.action_values(state))
            })
            .collect()
    };

    let store = SqliteStore::open(&path).unwrap();
    let reopened: Vec<_> = (0..store.recorded_state_count())
        .map(|i| {
            let state = store.recorded_state(i).unwrap();
            (state, store.action_values(state))
        })
        .collect();
    assert_eq!(reopened, recorded);
}
