//! Per-seat state snapshots.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, identifiers::CardId};

/// Turn-level status of a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Fresh turn, may still draw.
    #[default]
    Ready,
    /// Already drew a card this turn.
    HasDrawn,
    /// Cannot draw this turn.
    Stunned,
}

impl Status {
    pub fn can_draw(self) -> bool {
        matches!(self, Status::Ready)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ready => "ready",
            Status::HasDrawn => "has_drawn",
            Status::Stunned => "stunned",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready" => Ok(Status::Ready),
            "has_drawn" => Ok(Status::HasDrawn),
            "stunned" => Ok(Status::Stunned),
            other => Err(Error::InvalidField {
                field: "status".to_string(),
                reason: format!("unknown status tag '{other}'"),
            }),
        }
    }
}

/// Shared world data every seat sees.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobalView {
    pub turn: u32,
}

/// Private data of the observing seat.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InternalView {
    /// Cards in hand, in whatever order the game keeps them.
    pub hand: Vec<CardId>,
    pub status: Status,
}

/// Public attributes of a seat.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExternalView {
    pub health: u32,
    pub max_health: u32,
    pub resource: u32,
    pub max_resource: u32,
    pub hand_size: u32,
    pub draw_pile: u32,
}

impl ExternalView {
    pub fn health_deficit(&self) -> Option<u32> {
        self.max_health.checked_sub(self.health)
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Immutable snapshot of one seat's view of the game.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct State {
    pub global: GlobalView,
    pub internal: InternalView,
    /// The observing seat's own public attributes.
    pub own: ExternalView,
    pub left: ExternalView,
    pub right: ExternalView,
}

impl State {
    pub fn turn(&self) -> u32 {
        self.global.turn
    }
}
