//! Fixed-schema canonical encodings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    identifiers::CardId,
    model::{Action, ActionKind, CardCatalog, ExternalView, State, Status, Target},
};

/// The four numeric public fields recorded per seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ExternalFeatures {
    pub health: u32,
    pub health_deficit: u32,
    pub resource: u32,
    pub max_resource: u32,
}

impl ExternalFeatures {
    fn encode(view: &ExternalView, side: &str) -> Result<Self> {
        let health_deficit = view.health_deficit().ok_or_else(|| Error::InvalidField {
            field: format!("{side}.health"),
            reason: format!("health {} exceeds max health {}", view.health, view.max_health),
        })?;
        if view.resource > view.max_resource {
            return Err(Error::InvalidField {
                field: format!("{side}.resource"),
                reason: format!(
                    "resource {} exceeds max resource {}",
                    view.resource, view.max_resource
                ),
            });
        }
        Ok(Self {
            health: view.health,
            health_deficit,
            resource: view.resource,
            max_resource: view.max_resource,
        })
    }

    pub fn max_health(&self) -> u32 {
        self.health + self.health_deficit
    }
}

impl fmt::Display for ExternalFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} hp, {}/{} rp",
            self.health,
            self.max_health(),
            self.resource,
            self.max_resource
        )
    }
}

/// Canonical encoding of a [`State`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateEncoding {
    pub turn: u32,
    /// Sorted card identities.
    pub hand: Vec<CardId>,
    pub status: Status,
    pub own: ExternalFeatures,
    pub left: ExternalFeatures,
    pub right: ExternalFeatures,
}

impl StateEncoding {
    /// Encode a state snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCard`] if the hand holds a card missing from
    /// `catalog`, and [`Error::InvalidField`] if a seat's health or resource
    /// exceeds its maximum.
    pub fn encode(state: &State, catalog: &CardCatalog) -> Result<Self> {
        let mut hand = state.internal.hand.clone();
        if let Some(card) = hand.iter().find(|card| !catalog.contains(**card)) {
            return Err(Error::UnknownCard {
                card: *card,
                context: "hand".to_string(),
            });
        }
        hand.sort_unstable();

        Ok(Self {
            turn: state.global.turn,
            hand,
            status: state.internal.status,
            own: ExternalFeatures::encode(&state.own, "own")?,
            left: ExternalFeatures::encode(&state.left, "left")?,
            right: ExternalFeatures::encode(&state.right, "right")?,
        })
    }

    /// Comma-separated hand, e.g. `"0,1,1"`.
    pub fn hand_key(&self) -> String {
        self.hand
            .iter()
            .map(|card| card.value().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Inverse of [`hand_key`](Self::hand_key).
    pub fn parse_hand(key: &str) -> Result<Vec<CardId>> {
        if key.is_empty() {
            return Ok(Vec::new());
        }
        key.split(',')
            .map(|part| {
                part.parse::<u32>()
                    .map(CardId::new)
                    .map_err(|e| Error::InvalidField {
                        field: "hand".to_string(),
                        reason: format!("'{part}' is not a card id: {e}"),
                    })
            })
            .collect()
    }
}

impl fmt::Display for StateEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "turn {} [{}] {} | own {} | left {} | right {}",
            self.turn,
            self.hand_key(),
            self.status,
            self.own,
            self.left,
            self.right
        )
    }
}

/// Canonical encoding of an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionEncoding {
    pub kind: ActionKind,
    pub card: Option<CardId>,
    pub target: Option<Target>,
}

impl ActionEncoding {
    /// Encode an action.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCard`] if a played card is missing from `catalog`.
    pub fn encode(action: &Action, catalog: &CardCatalog) -> Result<Self> {
        if let Some(card) = action.card().filter(|card| !catalog.contains(*card)) {
            return Err(Error::UnknownCard {
                card,
                context: format!("action '{action}'"),
            });
        }
        Ok(Self {
            kind: action.kind(),
            card: action.card(),
            target: action.target(),
        })
    }

    /// Rebuild the action this encoding was made from.
    pub fn decode(&self) -> Result<Action> {
        match self.kind {
            ActionKind::Pass | ActionKind::Draw if self.card.is_some() || self.target.is_some() => {
                Err(Error::InvalidField {
                    field: "card".to_string(),
                    reason: format!("{} carries card or target data", self.kind),
                })
            }
            ActionKind::Pass => Ok(Action::Pass),
            ActionKind::Draw => Ok(Action::Draw),
            ActionKind::Play => {
                let card = self.card.ok_or_else(|| Error::MissingField {
                    field: "card".to_string(),
                    kind: "play".to_string(),
                })?;
                Ok(Action::Play {
                    card,
                    target: self.target,
                })
            }
        }
    }
}

impl fmt::Display for ActionEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decode() {
            Ok(action) => write!(f, "{action}"),
            Err(_) => write!(f, "{} (malformed)", self.kind),
        }
    }
}
