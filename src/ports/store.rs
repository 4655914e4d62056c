//! Store ports for identities and learned values.
//!
//! Both traits take `&self`: implementations own their synchronization so a
//! single store handle can be shared by every agent of a run. The
//! allocate-or-reuse step of [`IdentityStore`] and the replace-or-insert step
//! of [`ValueStore::upsert`] must each be atomic per key.

use std::{collections::HashMap, sync::Arc};

use crate::{
    Result,
    codec::{ActionEncoding, StateEncoding},
    identifiers::{ActionId, StateId},
};

/// Every recorded value, grouped by state.
pub type ValueMap = HashMap<StateId, HashMap<ActionId, f64>>;

/// Durable mapping between canonical encodings and their identities.
pub trait IdentityStore: Send + Sync {
    /// Return the identity of `encoding`, allocating a new one if it has never
    /// been seen.
    fn intern_state(&self, encoding: &StateEncoding) -> Result<StateId>;

    /// Action counterpart of [`intern_state`](Self::intern_state).
    fn intern_action(&self, encoding: &ActionEncoding) -> Result<ActionId>;

    /// Encoding behind `id`, or `None` if the identity was never allocated.
    fn state_encoding(&self, id: StateId) -> Result<Option<StateEncoding>>;

    fn action_encoding(&self, id: ActionId) -> Result<Option<ActionEncoding>>;

    fn state_count(&self) -> usize;

    fn action_count(&self) -> usize;
}

/// Mapping from (state, action) to an estimated value.
///
/// Reads are served from an in-memory working copy; [`upsert`](Self::upsert)
/// writes through to the backing store before updating it.
pub trait ValueStore: Send + Sync {
    fn get(&self, state: StateId, action: ActionId) -> Option<f64>;

    /// Replace or insert a value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`](crate::Error::StoreUnavailable) if
    /// the durable write fails. The in-memory copy is left untouched then.
    fn upsert(&self, state: StateId, action: ActionId, value: f64) -> Result<()>;

    /// Read every value from the backing store.
    fn load_all(&self) -> Result<ValueMap>;

    /// True iff at least one action has a recorded value in `state`.
    fn has_any_value_for(&self, state: StateId) -> bool;

    /// Recorded `(action, value)` pairs of `state` in first-seen order.
    fn action_values(&self, state: StateId) -> Vec<(ActionId, f64)>;

    /// Number of states with at least one recorded value.
    fn recorded_state_count(&self) -> usize;

    /// The `index`-th recorded state, in first-seen order.
    fn recorded_state(&self, index: usize) -> Option<StateId>;

    /// Total number of value entries.
    fn value_count(&self) -> usize;
}

/// Everything a learning agent needs from its store.
pub trait LearningStore: IdentityStore + ValueStore {}

impl<T: IdentityStore + ValueStore> LearningStore for T {}

/// Handle injected into every agent of a run.
pub type SharedStore = Arc<dyn LearningStore>;
