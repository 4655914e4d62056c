//! ε-greedy selection over the live legal-action set.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::identifiers::ActionId;

/// How an action was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    Recommended,
    Explored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplorationPolicy {
    random_action_rate: f64,
}

impl ExplorationPolicy {
    pub fn new(random_action_rate: f64) -> Self {
        Self {
            random_action_rate: random_action_rate.clamp(0.0, 1.0),
        }
    }

    pub fn random_action_rate(&self) -> f64 {
        self.random_action_rate
    }

    /// Index into `legal` of the action to take.
    ///
    /// Picks uniformly among `legal` with probability `random_action_rate`,
    /// or whenever `recommended` is absent or not currently legal; otherwise
    /// picks the recommendation. Returns `None` only for an empty `legal`.
    pub fn choose<R: Rng + ?Sized>(
        &self,
        recommended: Option<ActionId>,
        legal: &[ActionId],
        rng: &mut R,
    ) -> Option<(usize, Choice)> {
        if legal.is_empty() {
            return None;
        }
        let recommended = recommended.and_then(|id| legal.iter().position(|c| *c == id));
        match recommended {
            Some(index) if rng.random::<f64>() >= self.random_action_rate => {
                Some((index, Choice::Recommended))
            }
            _ => Some((rng.random_range(0..legal.len()), Choice::Explored)),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn ids(n: u64) -> Vec<ActionId> {
        (1..=n).map(ActionId::new).collect()
    }

    #[test]
    fn test_empty_legal_set() {
        let policy = ExplorationPolicy::new(0.1);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(policy.choose(Some(ActionId::new(1)), &[], &mut rng), None);
    }

    #[test]
    fn test_greedy_takes_recommendation() {
        let policy = ExplorationPolicy::new(0.0);
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            assert_eq!(
                policy.choose(Some(ActionId::new(3)), &ids(4), &mut rng),
                Some((2, Choice::Recommended))
            );
        }
    }

    #[test]
    fn test_illegal_recommendation_explores() {
        let policy = ExplorationPolicy::new(0.0);
        let mut rng = StdRng::seed_from_u64(5);
        let (index, choice) = policy
            .choose(Some(ActionId::new(99)), &ids(3), &mut rng)
            .unwrap();
        assert_eq!(choice, Choice::Explored);
        assert!(index < 3);
    }

    #[test]
    fn test_missing_recommendation_explores() {
        let policy = ExplorationPolicy::new(0.0);
        let mut rng = StdRng::seed_from_u64(5);
        let (_, choice) = policy.choose(None, &ids(3), &mut rng).unwrap();
        assert_eq!(choice, Choice::Explored);
    }

    #[test]
    fn test_full_rate_always_explores() {
        let policy = ExplorationPolicy::new(1.0);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let (_, choice) = policy
                .choose(Some(ActionId::new(1)), &ids(2), &mut rng)
                .unwrap();
            assert_eq!(choice, Choice::Explored);
        }
    }
}
