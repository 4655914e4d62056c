//! Adapters implementing domain ports.
//!
//! This module contains infrastructure implementations of the traits defined
//! in the ports module. Following hexagonal architecture, adapters depend on
//! domain ports, not the other way around.

pub mod in_memory_store;
pub mod msgpack_snapshot;
pub mod sqlite_store;
mod tables;

pub use in_memory_store::InMemoryStore;
pub use msgpack_snapshot::MsgPackSnapshotRepository;
pub use sqlite_store::SqliteStore;
