//! Canonicalization of states and actions into deduplicated identities.
//!
//! [`StateEncoding`] and [`ActionEncoding`] are pure functions of the value
//! they encode: fields in a fixed order, the hand sorted. The
//! [`IdentityCodec`] resolves an encoding to its identity through the shared
//! store, allocating one the first time an encoding is seen.

pub mod encoding;
pub mod identity;

pub use encoding::{ActionEncoding, ExternalFeatures, StateEncoding};
pub use identity::IdentityCodec;
