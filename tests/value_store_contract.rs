//! Behaviour every value store adapter must share.

mod common;

use simdyna::{
    codec::{ActionEncoding, StateEncoding},
    identifiers::{ActionId, StateId},
    model::{Action, CardCatalog, Target},
    ports::{IdentityStore, LearningStore, ValueStore},
};

use common::{state, stores, strike};

fn intern_state(store: &dyn LearningStore, turn: u32) -> StateId {
    let encoding = StateEncoding::encode(&state(turn, 10, &[0]), &CardCatalog::standard()).unwrap();
    store.intern_state(&encoding).unwrap()
}

fn intern_action(store: &dyn LearningStore, action: Action) -> ActionId {
    let encoding = ActionEncoding::encode(&action, &CardCatalog::standard()).unwrap();
    store.intern_action(&encoding).unwrap()
}

#[test]
fn test_empty_store_has_no_values() {
    for (name, store) in stores() {
        let s = intern_state(store.as_ref(), 1);
        let a = intern_action(store.as_ref(), Action::Pass);

        assert_eq!(store.get(s, a), None, "{name}");
        assert!(!store.has_any_value_for(s), "{name}");
        assert!(store.action_values(s).is_empty(), "{name}");
        assert_eq!(store.recorded_state_count(), 0, "{name}");
        assert_eq!(store.recorded_state(0), None, "{name}");
        assert_eq!(store.value_count(), 0, "{name}");
        assert!(store.load_all().unwrap().is_empty(), "{name}");
    }
}

#[test]
fn test_interning_is_idempotent() {
    for (name, store) in stores() {
        let first = intern_state(store.as_ref(), 5);
        assert_eq!(intern_state(store.as_ref(), 5), first, "{name}");
        let pass = intern_action(store.as_ref(), Action::Pass);
        assert_eq!(intern_action(store.as_ref(), Action::Pass), pass, "{name}");
        assert_eq!(store.state_count(), 1, "{name}");
        assert_eq!(store.action_count(), 1, "{name}");
    }
}

#[test]
fn test_upsert_overwrites_in_place() {
    for (name, store) in stores() {
        let s = intern_state(store.as_ref(), 1);
        let pass = intern_action(store.as_ref(), Action::Pass);
        let draw = intern_action(store.as_ref(), Action::Draw);
        let attack = intern_action(store.as_ref(), strike(Target::Left));

        store.upsert(s, pass, 1.0).unwrap();
        store.upsert(s, draw, 2.0).unwrap();
        store.upsert(s, attack, -4.0).unwrap();
        store.upsert(s, pass, 3.5).unwrap();

        assert_eq!(store.get(s, pass), Some(3.5), "{name}");
        assert_eq!(
            store.action_values(s),
            vec![(pass, 3.5), (draw, 2.0), (attack, -4.0)],
            "{name}: overwrite must keep first-seen order"
        );
        assert_eq!(store.value_count(), 3, "{name}");
        assert_eq!(store.recorded_state_count(), 1, "{name}");
    }
}

#[test]
fn test_recorded_states_in_first_seen_order() {
    for (name, store) in stores() {
        let early = intern_state(store.as_ref(), 1);
        let late = intern_state(store.as_ref(), 2);
        let never = intern_state(store.as_ref(), 3);
        let pass = intern_action(store.as_ref(), Action::Pass);

        store.upsert(late, pass, 1.0).unwrap();
        store.upsert(early, pass, 1.0).unwrap();
        store.upsert(late, pass, 2.0).unwrap();

        assert_eq!(store.recorded_state_count(), 2, "{name}");
        assert_eq!(store.recorded_state(0), Some(late), "{name}");
        assert_eq!(store.recorded_state(1), Some(early), "{name}");
        assert_eq!(store.recorded_state(2), None, "{name}");
        assert!(!store.has_any_value_for(never), "{name}");
    }
}

#[test]
fn test_load_all_matches_point_reads() {
    for (name, store) in stores() {
        let pass = intern_action(store.as_ref(), Action::Pass);
        let draw = intern_action(store.as_ref(), Action::Draw);
        let mut expected = Vec::new();
        for turn in 1..=4 {
            let s = intern_state(store.as_ref(), turn);
            let value = f64::from(turn) * 0.25;
            store.upsert(s, pass, value).unwrap();
            if turn % 2 == 0 {
                store.upsert(s, draw, -value).unwrap();
            }
            expected.push(s);
        }

        let all = store.load_all().unwrap();
        assert_eq!(all.len(), 4, "{name}");
        let entries: usize = all.values().map(|actions| actions.len()).sum();
        assert_eq!(entries, store.value_count(), "{name}");
        for s in expected {
            for (action, value) in &all[&s] {
                assert_eq!(store.get(s, *action), Some(*value), "{name}");
            }
        }
    }
}
