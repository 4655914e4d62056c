//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling training
//! logic to specific output formats or metrics.

use std::sync::{Arc, Mutex, PoisonError};

use crate::{Result, agent::Decision, pipeline::EpisodeSummary};

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_games)` - Once at the beginning
/// 2. For each game:
///    - `on_game_start(game_num)`
///    - `on_decision(...)` - For each action an agent chooses
///    - `on_game_end(game_num, summary)`
/// 3. `on_training_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use simdyna::{pipeline::EpisodeSummary, ports::Observer};
///
/// struct GameCounter {
///     games: usize,
/// }
///
/// impl Observer for GameCounter {
///     fn on_game_end(&mut self, _game_num: usize, _summary: &EpisodeSummary) -> simdyna::Result<()> {
///         self.games += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when training starts.
    fn on_training_start(&mut self, _total_games: usize) -> Result<()> {
        Ok(())
    }

    /// Called when a game starts (0-based index).
    fn on_game_start(&mut self, _game_num: usize) -> Result<()> {
        Ok(())
    }

    /// Called after an agent has chosen an action, before the environment
    /// applies it.
    fn on_decision(&mut self, _game_num: usize, _decision: &Decision) -> Result<()> {
        Ok(())
    }

    /// Called when a game ends, after every agent received its terminal update.
    fn on_game_end(&mut self, _game_num: usize, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    ///
    /// Use this to finalize outputs, close files, or display summaries.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Lets a caller keep a handle on an observer after boxing it into a
/// pipeline, e.g. to read its summary once training ends.
impl<O: Observer> Observer for Arc<Mutex<O>> {
    fn on_training_start(&mut self, total_games: usize) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_training_start(total_games)
    }

    fn on_game_start(&mut self, game_num: usize) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_game_start(game_num)
    }

    fn on_decision(&mut self, game_num: usize, decision: &Decision) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_decision(game_num, decision)
    }

    fn on_game_end(&mut self, game_num: usize, summary: &EpisodeSummary) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_game_end(game_num, summary)
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_training_end()
    }
}
