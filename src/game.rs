//! Reference environment used for training runs and tests.

pub mod duel;

pub use duel::{DeckEntry, DuelConfig, DuelGame, StepOutcome};
