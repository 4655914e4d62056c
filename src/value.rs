//! The value table: learned (state, action) estimates.
//!
//! [`ValueCache`] is the in-memory working copy every store adapter serves
//! reads from. [`recommend`] implements the best-action scan used both for
//! action selection and for the bootstrapped future value of a TD update.
//! [`ValueSnapshot`] is a self-contained export of the table.

pub mod cache;
pub mod recommend;
pub mod snapshot;

pub use cache::ValueCache;
pub use recommend::{Recommendation, RecommendationFloor, recommend};
pub use snapshot::{ValueEntry, ValueSnapshot};
