//! Bidirectional encoding/identity table shared by the store adapters.

use std::{collections::HashMap, hash::Hash};

#[derive(Debug, Clone)]
pub(crate) struct IdentityTable<E> {
    by_encoding: HashMap<E, u64>,
    by_id: HashMap<u64, E>,
    next: u64,
}

impl<E: Clone + Eq + Hash> IdentityTable<E> {
    pub(crate) fn new() -> Self {
        Self {
            by_encoding: HashMap::new(),
            by_id: HashMap::new(),
            next: 1,
        }
    }

    pub(crate) fn lookup(&self, encoding: &E) -> Option<u64> {
        self.by_encoding.get(encoding).copied()
    }

    pub(crate) fn get(&self, id: u64) -> Option<&E> {
        self.by_id.get(&id)
    }

    /// Allocate the next sequential identity for a new encoding.
    pub(crate) fn allocate(&mut self, encoding: E) -> u64 {
        let id = self.next;
        self.insert(id, encoding);
        id
    }

    /// Record an identity chosen elsewhere (a database row id, a snapshot).
    pub(crate) fn insert(&mut self, id: u64, encoding: E) {
        self.by_encoding.insert(encoding.clone(), id);
        self.by_id.insert(id, encoding);
        self.next = self.next.max(id + 1);
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }
}

impl<E: Clone + Eq + Hash> Default for IdentityTable<E> {
    fn default() -> Self {
        Self::new()
    }
}
