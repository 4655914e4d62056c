//! Per-episode transition memory.

use serde::Serialize;

use crate::identifiers::{ActionId, StateId};

/// One completed step: `action` taken in `state` led to `next_state` and
/// earned `reward`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transition {
    pub state: StateId,
    pub action: ActionId,
    pub next_state: StateId,
    pub reward: f64,
}

/// Append-only log of an agent's transitions within one game.
#[derive(Debug, Clone, Default)]
pub struct EpisodeMemory {
    transitions: Vec<Transition>,
}

impl EpisodeMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// The last `window` transitions, most recent first.
    pub fn recent(&self, window: usize) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().rev().take(window)
    }

    /// Every transition, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }
}
