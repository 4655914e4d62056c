//! MessagePack snapshots and CSV exports of a trained store.

use simdyna::{
    Error,
    adapters::{InMemoryStore, MsgPackSnapshotRepository},
    app::{App, TrainingConfig},
    game::DuelConfig,
    pipeline::TrainingPipeline,
    ports::{IdentityStore, SnapshotRepository, ValueStore},
    value::ValueSnapshot,
};
use tempfile::TempDir;

fn trained_app() -> App {
    let app = App::for_testing()
        .with_store(InMemoryStore::new())
        .with_default_seed(5)
        .build();
    let config = TrainingConfig::default()
        .with_games(4)
        .with_duel(DuelConfig::default().with_max_turns(25));
    TrainingPipeline::new(config, app.clone()).run().unwrap();
    app
}

#[test]
fn test_snapshot_restores_identical_store() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("values.msgpack");
    let app = trained_app();

    app.save_snapshot(&path).unwrap();
    let restored = app.load_snapshot(&path).unwrap();

    let store = app.store();
    assert_eq!(restored.value_count(), store.value_count());
    assert_eq!(restored.load_all().unwrap(), store.load_all().unwrap());
    for index in 0..store.recorded_state_count() {
        let state = store.recorded_state(index).unwrap();
        assert_eq!(restored.recorded_state(index), Some(state));
        assert_eq!(
            restored.state_encoding(state).unwrap(),
            store.state_encoding(state).unwrap()
        );
        assert_eq!(restored.action_values(state), store.action_values(state));
    }
}

#[test]
fn test_restored_store_keeps_allocating_fresh_ids() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("values.msgpack");
    let app = trained_app();
    app.save_snapshot(&path).unwrap();

    let snapshot = MsgPackSnapshotRepository::new().load(&path).unwrap();
    let restored = InMemoryStore::from_snapshot(&snapshot).unwrap();

    // Continue training on the restored store; nothing captured is lost.
    let before = restored.load_all().unwrap();
    let app = App::for_testing()
        .with_store(restored.clone())
        .with_default_seed(6)
        .build();
    let config = TrainingConfig::default()
        .with_games(2)
        .with_duel(DuelConfig::default().with_max_turns(25));
    TrainingPipeline::new(config, app).run().unwrap();

    for (state, actions) in before {
        for action in actions.keys() {
            assert!(restored.get(state, *action).is_some());
        }
    }
    let (state, encoding) = &snapshot.states[0];
    assert_eq!(restored.intern_state(encoding).unwrap(), *state);
}

#[test]
fn test_csv_export_has_row_per_value() {
    let app = trained_app();
    let snapshot = app.snapshot().unwrap();

    let mut buffer = Vec::new();
    snapshot.write_csv(&mut buffer).unwrap();

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["state_id", "state", "action_id", "action", "value"]
    );
    let rows = reader.records().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(rows.len(), app.store().value_count());
    assert!(rows.iter().all(|row| !row[1].is_empty() && !row[3].is_empty()));
}

#[test]
fn test_future_snapshot_version_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("future.msgpack");
    let mut snapshot = trained_app().snapshot().unwrap();
    snapshot.version = ValueSnapshot::VERSION + 1;

    let repository = MsgPackSnapshotRepository::new();
    repository.save(&snapshot, &path).unwrap();
    assert!(matches!(
        repository.load(&path),
        Err(Error::SerializationContext { .. })
    ));
}
