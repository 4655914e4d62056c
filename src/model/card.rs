//! Card definitions.
//!
//! The learning core only cares about a card's identity; cost and effect are
//! read by the environment when it enumerates and applies actions.

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, identifiers::CardId, model::Target};

/// What a card does when played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CardEffect {
    /// Damage to a neighbour.
    Damage { amount: u32 },
    /// Restore own health, capped at max health.
    Heal { amount: u32 },
}

impl CardEffect {
    /// Targets the card may be played at.
    pub fn targets(&self) -> &'static [Target] {
        match self {
            CardEffect::Damage { .. } => &[Target::Left, Target::Right],
            CardEffect::Heal { .. } => &[Target::Own],
        }
    }

    /// Type tag, e.g. `"damage"`.
    pub fn tag(&self) -> &'static str {
        match self {
            CardEffect::Damage { .. } => "damage",
            CardEffect::Heal { .. } => "heal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,
    pub name: String,
    pub cost: u32,
    pub effect: CardEffect,
}

/// Lookup table of every card that may appear in a game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CardDefinition>", into = "Vec<CardDefinition>")]
pub struct CardCatalog {
    cards: BTreeMap<CardId, CardDefinition>,
}

impl CardCatalog {
    /// Build a catalog, rejecting duplicate identities.
    pub fn new(cards: impl IntoIterator<Item = CardDefinition>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for card in cards {
            let id = card.id;
            if map.insert(id, card).is_some() {
                return Err(Error::InvalidConfiguration {
                    message: format!("card {id} is defined more than once"),
                });
            }
        }
        Ok(Self { cards: map })
    }

    /// The built-in card set used when no catalog file is given.
    pub fn standard() -> Self {
        let cards = [
            (0, "Strike", 1, CardEffect::Damage { amount: 3 }),
            (1, "Heavy Blow", 2, CardEffect::Damage { amount: 5 }),
            (2, "Bandage", 1, CardEffect::Heal { amount: 3 }),
        ];
        Self {
            cards: cards
                .into_iter()
                .map(|(id, name, cost, effect)| {
                    let id = CardId::new(id);
                    (
                        id,
                        CardDefinition {
                            id,
                            name: name.to_string(),
                            cost,
                            effect,
                        },
                    )
                })
                .collect(),
        }
    }

    /// Load a JSON array of card definitions.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open card catalog {path:?}"),
            source,
        })?;
        let cards: Vec<CardDefinition> = serde_json::from_reader(BufReader::new(file))?;
        Self::new(cards)
    }

    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl TryFrom<Vec<CardDefinition>> for CardCatalog {
    type Error = Error;

    fn try_from(cards: Vec<CardDefinition>) -> Result<Self> {
        Self::new(cards)
    }
}

impl From<CardCatalog> for Vec<CardDefinition> {
    fn from(catalog: CardCatalog) -> Self {
        catalog.cards.into_values().collect()
    }
}
