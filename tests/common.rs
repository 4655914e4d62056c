//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use simdyna::{
    adapters::{InMemoryStore, SqliteStore},
    identifiers::{CardId, Seat},
    model::{
        Action, CardCatalog, ExternalView, GlobalView, InternalView, State, Status, Target,
    },
    ports::{Environment, SharedStore},
};

pub fn catalog() -> Arc<CardCatalog> {
    Arc::new(CardCatalog::standard())
}

/// Both store adapters, labelled for assertion messages.
pub fn stores() -> Vec<(&'static str, SharedStore)> {
    vec![
        ("in-memory", Arc::new(InMemoryStore::new())),
        (
            "sqlite",
            Arc::new(SqliteStore::open_in_memory().expect("open in-memory sqlite")),
        ),
    ]
}

fn view(health: u32) -> ExternalView {
    ExternalView {
        health,
        max_health: 10,
        resource: 1,
        max_resource: 2,
        hand_size: 2,
        draw_pile: 4,
    }
}

/// A ready seat holding `hand`, with both neighbours at full health.
pub fn state(turn: u32, health: u32, hand: &[u32]) -> State {
    State {
        global: GlobalView { turn },
        internal: InternalView {
            hand: hand.iter().copied().map(CardId::new).collect(),
            status: Status::Ready,
        },
        own: view(health),
        left: view(10),
        right: view(10),
    }
}

pub fn strike(target: Target) -> Action {
    Action::Play {
        card: CardId::new(0),
        target: Some(target),
    }
}

/// Hand-driven environment: tests move the turn and choose the legal set.
pub struct ScriptedEnv {
    pub turn: u32,
    pub health: u32,
    pub legal: Vec<Action>,
}

impl ScriptedEnv {
    pub fn new() -> Self {
        Self {
            turn: 1,
            health: 10,
            legal: vec![
                Action::Pass,
                Action::Draw,
                strike(Target::Left),
                strike(Target::Right),
            ],
        }
    }
}

impl Environment for ScriptedEnv {
    fn observe(&self, _seat: Seat) -> State {
        state(self.turn, self.health, &[0, 2])
    }

    fn legal_actions(&self, _state: &State) -> Vec<Action> {
        self.legal.clone()
    }
}
