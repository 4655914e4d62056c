//! Similarity-scaled temporal-difference rule.

/// Bootstrapped target `r + s·γ·V'`.
///
/// `similarity` shrinks the future term according to how well the closest
/// recorded state stands in for the state actually reached.
pub fn td_target(reward: f64, similarity: f64, discount: f64, best_future: f64) -> f64 {
    reward + similarity * discount * best_future
}

/// Q(s,a) ← (1 − α)·Q(s,a) + α·target
pub fn td_update(old: f64, target: f64, learning_rate: f64) -> f64 {
    (1.0 - learning_rate) * old + learning_rate * target
}
