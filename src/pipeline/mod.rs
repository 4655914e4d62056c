//! Training pipeline abstractions
//!
//! This module provides composable pipelines for:
//! - Playing a single self-play game with one agent per seat
//! - Training over many games against one shared store
//! - Recording observations during training

pub mod episode;
pub mod observers;
pub mod training;

pub use episode::{ActionCounts, EpisodeSummary, run_episode};
pub use observers::{JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver};
pub use training::{TrainingPipeline, TrainingResult};

pub use crate::ports::Observer;
