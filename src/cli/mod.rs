//! CLI infrastructure for simdyna
//!
//! This module provides the command-line interface for training agents
//! against each other, inspecting the learned table, and exporting it.

pub mod commands;
pub mod output;
