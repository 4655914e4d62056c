//! Per-feature distance terms and their weighted combination.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    codec::{ExternalFeatures, StateEncoding},
    identifiers::CardId,
};

/// Importance of every feature, each in `[0, 1]` (0 = ignored).
///
/// Neighbour weights apply to the left and the right seat alike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureWeights {
    pub turn: f64,
    pub hand: f64,
    pub status: f64,
    pub health: f64,
    pub health_deficit: f64,
    pub resource: f64,
    pub max_resource: f64,
    pub neighbor_health: f64,
    pub neighbor_health_deficit: f64,
    pub neighbor_resource: f64,
    pub neighbor_max_resource: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            turn: 0.1,
            hand: 0.3,
            status: 0.5,
            health: 1.0,
            health_deficit: 1.0,
            resource: 0.75,
            max_resource: 0.25,
            neighbor_health: 0.5,
            neighbor_health_deficit: 0.5,
            neighbor_resource: 0.35,
            neighbor_max_resource: 0.1,
        }
    }
}

impl FeatureWeights {
    /// Every weight set to `weight`.
    pub fn uniform(weight: f64) -> Self {
        Self {
            turn: weight,
            hand: weight,
            status: weight,
            health: weight,
            health_deficit: weight,
            resource: weight,
            max_resource: weight,
            neighbor_health: weight,
            neighbor_health_deficit: weight,
            neighbor_resource: weight,
            neighbor_max_resource: weight,
        }
    }

    fn named(&self) -> [(&'static str, f64); 11] {
        [
            ("turn", self.turn),
            ("hand", self.hand),
            ("status", self.status),
            ("health", self.health),
            ("health_deficit", self.health_deficit),
            ("resource", self.resource),
            ("max_resource", self.max_resource),
            ("neighbor_health", self.neighbor_health),
            ("neighbor_health_deficit", self.neighbor_health_deficit),
            ("neighbor_resource", self.neighbor_resource),
            ("neighbor_max_resource", self.neighbor_max_resource),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        for (name, weight) in self.named() {
            if !(0.0..=1.0).contains(&weight) {
                return Err(Error::InvalidConfiguration {
                    message: format!("feature weight '{name}' must be in [0, 1], got {weight}"),
                });
            }
        }
        Ok(())
    }
}

/// `|a - b| / (max_a + max_b)`, clamped to `[0, 1]`; zero when both maxima
/// are zero.
fn scaled_distance(a: u32, b: u32, max_a: u32, max_b: u32) -> f64 {
    let denominator = f64::from(max_a) + f64::from(max_b);
    if denominator == 0.0 {
        return 0.0;
    }
    (f64::from(a.abs_diff(b)) / denominator).clamp(0.0, 1.0)
}

/// Distance between two counters that are their own natural maximum.
fn relative_distance(a: u32, b: u32) -> f64 {
    scaled_distance(a, b, a, b)
}

/// Multiset Jaccard distance between two hands.
fn hand_distance(a: &[CardId], b: &[CardId]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let mut counts: BTreeMap<CardId, (u32, u32)> = BTreeMap::new();
    for card in a {
        counts.entry(*card).or_default().0 += 1;
    }
    for card in b {
        counts.entry(*card).or_default().1 += 1;
    }
    let (shared, total) = counts
        .values()
        .fold((0u32, 0u32), |(shared, total), &(x, y)| {
            (shared + x.min(y), total + x.max(y))
        });
    1.0 - f64::from(shared) / f64::from(total)
}

fn term(distance: f64, weight: f64) -> f64 {
    1.0 - distance * weight
}

fn seat_terms(
    a: &ExternalFeatures,
    b: &ExternalFeatures,
    health: f64,
    health_deficit: f64,
    resource: f64,
    max_resource: f64,
) -> f64 {
    let (max_a, max_b) = (a.max_health(), b.max_health());
    term(scaled_distance(a.health, b.health, max_a, max_b), health)
        * term(
            scaled_distance(a.health_deficit, b.health_deficit, max_a, max_b),
            health_deficit,
        )
        * term(
            scaled_distance(a.resource, b.resource, a.max_resource, b.max_resource),
            resource,
        )
        * term(relative_distance(a.max_resource, b.max_resource), max_resource)
}

/// Weighted similarity of two encoded states, in `[0, 1]`.
///
/// Symmetric, and `1.0` for equal encodings. Distinct encodings may still
/// score `1.0` when they only differ in zero-weighted features;
/// [`SimilarityIndex`](super::SimilarityIndex) accounts for that.
pub fn similarity(a: &StateEncoding, b: &StateEncoding, weights: &FeatureWeights) -> f64 {
    let status = if a.status == b.status { 0.0 } else { 1.0 };
    let score = term(relative_distance(a.turn, b.turn), weights.turn)
        * term(hand_distance(&a.hand, &b.hand), weights.hand)
        * term(status, weights.status)
        * seat_terms(
            &a.own,
            &b.own,
            weights.health,
            weights.health_deficit,
            weights.resource,
            weights.max_resource,
        )
        * seat_terms(
            &a.left,
            &b.left,
            weights.neighbor_health,
            weights.neighbor_health_deficit,
            weights.neighbor_resource,
            weights.neighbor_max_resource,
        )
        * seat_terms(
            &a.right,
            &b.right,
            weights.neighbor_health,
            weights.neighbor_health_deficit,
            weights.neighbor_resource,
            weights.neighbor_max_resource,
        );
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    fn seat(health: u32, max_health: u32, resource: u32) -> ExternalFeatures {
        ExternalFeatures {
            health,
            health_deficit: max_health - health,
            resource,
            max_resource: 3,
        }
    }

    fn encoding(own_health: u32, hand: &[u32]) -> StateEncoding {
        StateEncoding {
            turn: 4,
            hand: hand.iter().copied().map(CardId::new).collect(),
            status: Status::Ready,
            own: seat(own_health, 10, 2),
            left: seat(10, 10, 3),
            right: seat(6, 10, 1),
        }
    }

    #[test]
    fn test_identical_states_score_one() {
        let a = encoding(7, &[0, 1]);
        assert_eq!(similarity(&a, &a.clone(), &FeatureWeights::default()), 1.0);
    }

    #[test]
    fn test_scaled_distance_bounds() {
        assert_eq!(scaled_distance(0, 0, 0, 0), 0.0);
        assert_eq!(scaled_distance(10, 0, 10, 10), 0.5);
        assert_eq!(scaled_distance(5, 5, 10, 10), 0.0);
        assert_eq!(relative_distance(4, 0), 1.0);
    }

    #[test]
    fn test_hand_distance_is_multiset_jaccard() {
        let c = |ids: &[u32]| ids.iter().copied().map(CardId::new).collect::<Vec<_>>();
        assert_eq!(hand_distance(&c(&[]), &c(&[])), 0.0);
        assert_eq!(hand_distance(&c(&[0, 0]), &c(&[0, 0])), 0.0);
        assert_eq!(hand_distance(&c(&[0, 0]), &c(&[0])), 0.5);
        assert_eq!(hand_distance(&c(&[1]), &c(&[2])), 1.0);
    }

    #[test]
    fn test_closer_health_scores_higher() {
        let weights = FeatureWeights::default();
        let query = encoding(8, &[0]);
        let near = similarity(&query, &encoding(7, &[0]), &weights);
        let far = similarity(&query, &encoding(2, &[0]), &weights);
        assert!(near > far, "near={near} far={far}");
        assert!(near < 1.0);
    }

    #[test]
    fn test_symmetric() {
        let weights = FeatureWeights::default();
        let a = encoding(3, &[0, 2]);
        let mut b = encoding(9, &[1]);
        b.status = Status::HasDrawn;
        assert_eq!(similarity(&a, &b, &weights), similarity(&b, &a, &weights));
    }

    #[test]
    fn test_status_mismatch_with_full_weight_zeroes_score() {
        let weights = FeatureWeights {
            status: 1.0,
            ..FeatureWeights::default()
        };
        let a = encoding(5, &[0]);
        let mut b = a.clone();
        b.status = Status::Stunned;
        assert_eq!(similarity(&a, &b, &weights), 0.0);
    }

    #[test]
    fn test_zero_weights_ignore_everything() {
        let weights = FeatureWeights::uniform(0.0);
        assert_eq!(similarity(&encoding(1, &[0]), &encoding(10, &[2]), &weights), 1.0);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(FeatureWeights::default().validate().is_ok());
        let weights = FeatureWeights {
            hand: 1.5,
            ..FeatureWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(Error::InvalidConfiguration { .. })
        ));
    }
}
