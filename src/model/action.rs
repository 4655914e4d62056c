//! Actions a seat can take.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, identifiers::CardId};

/// Who a played card is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Left,
    Right,
    /// The acting seat itself.
    Own,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Left => "left",
            Target::Right => "right",
            Target::Own => "self",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Target::Left),
            "right" => Ok(Target::Right),
            "self" => Ok(Target::Own),
            other => Err(Error::InvalidField {
                field: "target".to_string(),
                reason: format!("unknown target tag '{other}'"),
            }),
        }
    }
}

/// Discriminant of an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Pass,
    Draw,
    Play,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Pass => "pass",
            ActionKind::Draw => "draw",
            ActionKind::Play => "play",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(ActionKind::Pass),
            "draw" => Ok(ActionKind::Draw),
            "play" => Ok(ActionKind::Play),
            other => Err(Error::InvalidField {
                field: "kind".to_string(),
                reason: format!("unknown action tag '{other}'"),
            }),
        }
    }
}

/// A move in the game. Compared structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// End the turn. Always legal.
    Pass,
    Draw,
    Play {
        card: CardId,
        target: Option<Target>,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Pass => ActionKind::Pass,
            Action::Draw => ActionKind::Draw,
            Action::Play { .. } => ActionKind::Play,
        }
    }

    pub fn card(&self) -> Option<CardId> {
        match self {
            Action::Play { card, .. } => Some(*card),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<Target> {
        match self {
            Action::Play { target, .. } => *target,
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Pass => f.write_str("pass"),
            Action::Draw => f.write_str("draw"),
            Action::Play {
                card,
                target: Some(target),
            } => write!(f, "play {card} -> {target}"),
            Action::Play { card, target: None } => write!(f, "play {card}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Action::Play {
            card: CardId::new(2),
            target: Some(Target::Left),
        };
        let b = Action::Play {
            card: CardId::new(2),
            target: Some(Target::Left),
        };
        assert_eq!(a, b);
        assert_ne!(
            a,
            Action::Play {
                card: CardId::new(2),
                target: Some(Target::Right),
            }
        );
    }

    #[test]
    fn test_tags_roundtrip_through_str() {
        for target in [Target::Left, Target::Right, Target::Own] {
            assert_eq!(target.as_str().parse::<Target>().unwrap(), target);
        }
        for kind in [ActionKind::Pass, ActionKind::Draw, ActionKind::Play] {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
        assert!("sideways".parse::<Target>().is_err());
    }
}
