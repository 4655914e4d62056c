//! Ports (trait boundaries) for external dependencies.
//!
//! This module defines the interfaces between the learning core and its
//! collaborators. Following hexagonal architecture, these traits are owned by
//! the domain and implemented by adapters (stores, snapshot formats) or by the
//! surrounding game (environment, observers).

pub mod environment;
pub mod observer;
pub mod repository;
pub mod store;

pub use environment::Environment;
pub use observer::Observer;
pub use repository::SnapshotRepository;
pub use store::{IdentityStore, LearningStore, SharedStore, ValueMap, ValueStore};
