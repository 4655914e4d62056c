//! Approximate nearest-state lookup.
//!
//! A state never seen before borrows its future-value estimate from the most
//! similar recorded state. Similarity is a product of per-feature terms
//! `1 - distance × weight`, so a single badly mismatched, heavily weighted
//! feature drives the score towards zero no matter how well the rest agree.

pub mod features;
pub mod index;

pub use features::{FeatureWeights, similarity};
pub use index::{ClosestState, SimilarityIndex};
