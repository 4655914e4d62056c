//! Identifier newtypes for canonical states, actions, cards and seats.
//!
//! State and action identities are allocated by an [`IdentityStore`] and are
//! append-only: once handed out, an identity always refers to the same
//! canonical encoding.
//!
//! [`IdentityStore`]: crate::ports::IdentityStore

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a canonical state encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateId(u64);

impl StateId {
    /// Wrap a raw identity value.
    ///
    /// # Examples
    ///
    /// ```
    /// use simdyna::identifiers::StateId;
    ///
    /// let id = StateId::new(7);
    /// assert_eq!(id.value(), 7);
    /// ```
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl From<StateId> for u64 {
    fn from(id: StateId) -> Self {
        id.0
    }
}

/// Identity of a canonical action encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionId(u64);

impl ActionId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

impl From<ActionId> for u64 {
    fn from(id: ActionId) -> Self {
        id.0
    }
}

/// Identity of a card definition in a [`CardCatalog`](crate::model::CardCatalog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(u32);

impl CardId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position of a player at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seat(usize);

impl Seat {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }

    /// Neighbour to the left in a ring of `seats` players.
    pub fn left(self, seats: usize) -> Seat {
        Seat((self.0 + seats - 1) % seats)
    }

    /// Neighbour to the right in a ring of `seats` players.
    pub fn right(self, seats: usize) -> Seat {
        Seat((self.0 + 1) % seats)
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_neighbours_wrap() {
        let seat = Seat::new(0);
        assert_eq!(seat.left(3), Seat::new(2));
        assert_eq!(seat.right(3), Seat::new(1));
        assert_eq!(Seat::new(1).left(2), Seat::new(0));
        assert_eq!(Seat::new(1).right(2), Seat::new(0));
    }

    #[test]
    fn test_display_prefixes() {
        assert_eq!(StateId::new(3).to_string(), "s3");
        assert_eq!(ActionId::new(4).to_string(), "a4");
        assert_eq!(CardId::new(5).to_string(), "#5");
    }
}
