//! Environment port - the game collaborator seen from the learning core.

use crate::{
    identifiers::Seat,
    model::{Action, State},
};

/// The surrounding game, as far as an agent is concerned.
///
/// The environment owns the live, mutable game. Agents only ever receive
/// owned snapshots from [`observe`](Self::observe), taken at the moment they
/// are queried.
pub trait Environment {
    /// Snapshot of what `seat` can currently see.
    fn observe(&self, seat: Seat) -> State;

    /// Legal actions in `state`, in a stable order.
    ///
    /// Must never be empty: [`Action::Pass`] is always legal. Agents treat an
    /// empty result as [`Error::NoLegalActions`](crate::Error::NoLegalActions).
    fn legal_actions(&self, state: &State) -> Vec<Action>;
}
