//! Application layer with dependency injection container.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           Application Layer (app)           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │          App (DI Container)          │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ owns                      │
//! │                 ▼                           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Infrastructure (adapters)           │   │
//! │  │  - SqliteStore / InMemoryStore       │   │
//! │  │  - MsgPackSnapshotRepository         │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ implements                │
//! │                 ▼                           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Ports (ports)                │   │
//! │  │  - IdentityStore / ValueStore        │   │
//! │  │  - SnapshotRepository                │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ used by                   │
//! │                 ▼                           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Logic                        │   │
//! │  │  - LearningAgent                     │   │
//! │  │  - IdentityCodec / SimilarityIndex   │   │
//! │  └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod container;

pub use config::{AgentConfig, TrainingConfig};
pub use container::{App, AppBuilder};
