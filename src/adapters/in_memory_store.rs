//! In-memory learning store for testing.
//!
//! This adapter provides a pure in-memory implementation of the store ports,
//! enabling fast tests without any file system I/O.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::tables::IdentityTable;
use crate::{
    Result,
    codec::{ActionEncoding, StateEncoding},
    identifiers::{ActionId, StateId},
    ports::{IdentityStore, ValueMap, ValueStore},
    value::{ValueCache, ValueSnapshot},
};

#[derive(Debug, Default)]
struct Tables {
    states: IdentityTable<StateEncoding>,
    actions: IdentityTable<ActionEncoding>,
    values: ValueCache,
}

/// In-memory store.
///
/// # Examples
///
/// ```
/// use simdyna::adapters::InMemoryStore;
/// use simdyna::identifiers::{ActionId, StateId};
/// use simdyna::ports::ValueStore;
///
/// let store = InMemoryStore::new();
/// store.upsert(StateId::new(1), ActionId::new(1), 0.5)?;
/// assert_eq!(store.get(StateId::new(1), ActionId::new(1)), Some(0.5));
/// # Ok::<(), simdyna::Error>(())
/// ```
///
/// # Thread Safety
///
/// All tables sit behind one mutex, so allocate-or-reuse and
/// replace-or-insert are atomic. Clones share the same underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot, keeping every identity unchanged.
    pub fn from_snapshot(snapshot: &ValueSnapshot) -> Result<Self> {
        snapshot.check_version()?;
        let mut tables = Tables::default();
        for (id, encoding) in &snapshot.states {
            tables.states.insert(id.value(), encoding.clone());
        }
        for (id, encoding) in &snapshot.actions {
            tables.actions.insert(id.value(), *encoding);
        }
        for entry in &snapshot.values {
            tables.values.upsert(entry.state, entry.action, entry.value);
        }
        Ok(Self {
            tables: Arc::new(Mutex::new(tables)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityStore for InMemoryStore {
    fn intern_state(&self, encoding: &StateEncoding) -> Result<StateId> {
        let mut tables = self.lock();
        let id = match tables.states.lookup(encoding) {
            Some(id) => id,
            None => tables.states.allocate(encoding.clone()),
        };
        Ok(StateId::new(id))
    }

    fn intern_action(&self, encoding: &ActionEncoding) -> Result<ActionId> {
        let mut tables = self.lock();
        let id = match tables.actions.lookup(encoding) {
            Some(id) => id,
            None => tables.actions.allocate(*encoding),
        };
        Ok(ActionId::new(id))
    }

    fn state_encoding(&self, id: StateId) -> Result<Option<StateEncoding>> {
        Ok(self.lock().states.get(id.value()).cloned())
    }

    fn action_encoding(&self, id: ActionId) -> Result<Option<ActionEncoding>> {
        Ok(self.lock().actions.get(id.value()).copied())
    }

    fn state_count(&self) -> usize {
        self.lock().states.len()
    }

    fn action_count(&self) -> usize {
        self.lock().actions.len()
    }
}

impl ValueStore for InMemoryStore {
    fn get(&self, state: StateId, action: ActionId) -> Option<f64> {
        self.lock().values.get(state, action)
    }

    fn upsert(&self, state: StateId, action: ActionId, value: f64) -> Result<()> {
        self.lock().values.upsert(state, action, value);
        Ok(())
    }

    fn load_all(&self) -> Result<ValueMap> {
        Ok(self.lock().values.to_value_map())
    }

    fn has_any_value_for(&self, state: StateId) -> bool {
        self.lock().values.has_any(state)
    }

    fn action_values(&self, state: StateId) -> Vec<(ActionId, f64)> {
        self.lock().values.action_values(state)
    }

    fn recorded_state_count(&self) -> usize {
        self.lock().values.recorded_len()
    }

    fn recorded_state(&self, index: usize) -> Option<StateId> {
        self.lock().values.recorded_at(index)
    }

    fn value_count(&self) -> usize {
        self.lock().values.len()
    }
}
