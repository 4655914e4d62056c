//! Similarity-scaled Dyna learning for turn-based card games
//!
//! This crate provides:
//! - A codec that interns game states and actions as stable integer ids
//! - A persistent value store over those ids (SQLite or in memory)
//! - A nearest-state index over weighted feature similarity
//! - A learning agent combining similarity-scaled TD updates with replay
//! - A small multi-seat duel to train against, plus pipeline and CLI

pub mod adapters;
pub mod agent;
pub mod app;
pub mod cli;
pub mod codec;
pub mod error;
pub mod game;
pub mod identifiers;
pub mod model;
pub mod pipeline;
pub mod ports;
pub mod similarity;
pub mod value;

pub use error::{Error, Result};
