//! Sampled nearest-state search over the recorded states of a store.

use rand::{Rng, seq::index};
use tracing::trace;

use super::features::{FeatureWeights, similarity};
use crate::{Error, Result, identifiers::StateId, ports::LearningStore};

/// Non-identical candidates never score above this.
const MAX_INEXACT_SIMILARITY: f64 = 1.0 - f64::EPSILON;

/// Result of [`SimilarityIndex::closest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestState {
    pub state: Option<StateId>,
    pub similarity: f64,
}

impl ClosestState {
    /// No recorded state to compare against.
    pub const NONE: ClosestState = ClosestState {
        state: None,
        similarity: 0.0,
    };

    pub fn exact(state: StateId) -> Self {
        Self {
            state: Some(state),
            similarity: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    weights: FeatureWeights,
    batch_size: usize,
}

impl SimilarityIndex {
    pub fn new(weights: FeatureWeights, batch_size: usize) -> Self {
        Self {
            weights,
            batch_size: batch_size.max(1),
        }
    }

    pub fn weights(&self) -> &FeatureWeights {
        &self.weights
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Most similar state among a uniform sample of up to `batch_size`
    /// recorded states.
    ///
    /// The score is `1.0` only for a candidate whose encoding equals the
    /// query's. Ties keep the candidate sampled first; candidates whose
    /// encoding no longer resolves are ignored.
    ///
    /// # Errors
    ///
    /// [`Error::CorruptRecord`] if `query` itself has no encoding, and any
    /// store error raised while reading encodings.
    pub fn closest<R: Rng + ?Sized>(
        &self,
        store: &dyn LearningStore,
        query: StateId,
        rng: &mut R,
    ) -> Result<ClosestState> {
        let recorded = store.recorded_state_count();
        if recorded == 0 {
            return Ok(ClosestState::NONE);
        }
        let query_encoding = store
            .state_encoding(query)?
            .ok_or_else(|| Error::CorruptRecord {
                table: "state".to_string(),
                id: query.value() as i64,
                message: "similarity query for an unallocated state".to_string(),
            })?;

        let mut best: Option<ClosestState> = None;
        for position in index::sample(rng, recorded, self.batch_size.min(recorded)) {
            let Some(candidate) = store.recorded_state(position) else {
                continue;
            };
            let score = if candidate == query {
                1.0
            } else {
                match store.state_encoding(candidate)? {
                    Some(encoding) if encoding == query_encoding => 1.0,
                    Some(encoding) => similarity(&query_encoding, &encoding, &self.weights)
                        .min(MAX_INEXACT_SIMILARITY),
                    None => continue,
                }
            };
            if best.is_none_or(|best| score > best.similarity) {
                best = Some(ClosestState {
                    state: Some(candidate),
                    similarity: score,
                });
            }
        }

        let best = best.unwrap_or(ClosestState::NONE);
        trace!(
            query = %query,
            closest = ?best.state,
            similarity = best.similarity,
            "similarity lookup"
        );
        Ok(best)
    }
}
