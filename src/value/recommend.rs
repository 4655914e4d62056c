//! Best-action scan over a state's recorded values.

use serde::{Deserialize, Serialize};

use crate::identifiers::ActionId;

/// Starting point of the best-value scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationFloor {
    /// Only actions with a value strictly above zero are recommended. With no
    /// such action the best value is reported as zero.
    #[default]
    Zero,
    /// The highest recorded value is recommended even when negative.
    NegativeInfinity,
}

impl RecommendationFloor {
    fn initial(self) -> f64 {
        match self {
            RecommendationFloor::Zero => 0.0,
            RecommendationFloor::NegativeInfinity => f64::NEG_INFINITY,
        }
    }
}

/// Outcome of [`recommend`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recommendation {
    pub action: Option<ActionId>,
    /// Value of the recommended action; `0.0` when nothing is recommended.
    pub value: f64,
}

impl Recommendation {
    pub const NONE: Recommendation = Recommendation {
        action: None,
        value: 0.0,
    };
}

/// Pick the action with the strictly greatest value.
///
/// Ties keep the earliest entry, so with `values` in first-seen order the
/// first-seen action wins.
pub fn recommend(values: &[(ActionId, f64)], floor: RecommendationFloor) -> Recommendation {
    let mut best = Recommendation {
        action: None,
        value: floor.initial(),
    };
    for &(action, value) in values {
        if value > best.value {
            best = Recommendation {
                action: Some(action),
                value,
            };
        }
    }
    if best.action.is_none() {
        return Recommendation::NONE;
    }
    best
}
