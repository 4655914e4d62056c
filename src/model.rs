//! Semantic game values the learning core consumes.
//!
//! A [`State`] is what one seat can see on one turn: the global view, its own
//! private hand, and the public attributes of itself and both neighbours.
//! Other seats' private data never appears in a state. An [`Action`] is one
//! of pass / draw / play-card. Neither type is stored directly; the
//! [`codec`](crate::codec) turns them into canonical encodings and identities.

pub mod action;
pub mod card;
pub mod state;

pub use action::{Action, ActionKind, Target};
pub use card::{CardCatalog, CardDefinition, CardEffect};
pub use state::{ExternalView, GlobalView, InternalView, State, Status};
