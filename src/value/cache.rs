//! Insertion-ordered in-memory value table.

use std::collections::HashMap;

use crate::{
    identifiers::{ActionId, StateId},
    ports::ValueMap,
};

/// In-memory working copy of the value table.
///
/// Keeps actions of a state in first-seen order (the recommendation
/// tie-break depends on it) and states in the order they received their
/// first value (the similarity index samples from that list).
#[derive(Debug, Clone, Default)]
pub struct ValueCache {
    rows: HashMap<StateId, Vec<(ActionId, f64)>>,
    recorded: Vec<StateId>,
    entries: usize,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, state: StateId, action: ActionId) -> Option<f64> {
        self.rows
            .get(&state)?
            .iter()
            .find(|(candidate, _)| *candidate == action)
            .map(|(_, value)| *value)
    }

    /// Replace or insert. Returns `true` when the key was new.
    pub fn upsert(&mut self, state: StateId, action: ActionId, value: f64) -> bool {
        let row = self.rows.entry(state).or_insert_with(|| {
            self.recorded.push(state);
            Vec::new()
        });
        match row.iter_mut().find(|(candidate, _)| *candidate == action) {
            Some(entry) => {
                entry.1 = value;
                false
            }
            None => {
                row.push((action, value));
                self.entries += 1;
                true
            }
        }
    }

    pub fn has_any(&self, state: StateId) -> bool {
        self.rows.get(&state).is_some_and(|row| !row.is_empty())
    }

    pub fn action_values(&self, state: StateId) -> Vec<(ActionId, f64)> {
        self.rows.get(&state).cloned().unwrap_or_default()
    }

    pub fn recorded_len(&self) -> usize {
        self.recorded.len()
    }

    pub fn recorded_at(&self, index: usize) -> Option<StateId> {
        self.recorded.get(index).copied()
    }

    /// Number of value entries.
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// All entries, states in first-seen order, actions in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, ActionId, f64)> + '_ {
        self.recorded.iter().flat_map(move |state| {
            self.rows
                .get(state)
                .into_iter()
                .flatten()
                .map(move |(action, value)| (*state, *action, *value))
        })
    }

    pub fn to_value_map(&self) -> ValueMap {
        self.rows
            .iter()
            .map(|(state, row)| (*state, row.iter().copied().collect()))
            .collect()
    }
}
