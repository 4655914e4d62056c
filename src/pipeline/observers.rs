//! Observer pattern for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::episode::{ActionCounts, EpisodeSummary};
use crate::{
    Error, Result,
    agent::{AgentStats, Choice, Decision},
    identifiers::Seat,
    ports::Observer,
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    timeouts: usize,
    turns: u64,
    games: usize,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            timeouts: 0,
            turns: 0,
            games: 0,
        }
    }

    fn message(&self) -> String {
        let mean = if self.games == 0 {
            0.0
        } else {
            self.turns as f64 / self.games as f64
        };
        format!("turns/game {mean:.1}, timeouts {}", self.timeouts)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_games: usize) -> Result<()> {
        let pb = ProgressBar::new(total_games as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} games ({msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_game_end(&mut self, game_num: usize, summary: &EpisodeSummary) -> Result<()> {
        self.games += 1;
        self.turns += u64::from(summary.turns);
        if summary.timed_out() {
            self.timeouts += 1;
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(game_num as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks turns per game and chosen actions per kind
pub struct MetricsObserver {
    total_games: usize,
    wins: Vec<usize>,
    timeouts: usize,
    turn_counts: Vec<u32>,
    actions: ActionCounts,
    explored: u64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self {
            total_games: 0,
            wins: Vec::new(),
            timeouts: 0,
            turn_counts: Vec::new(),
            actions: ActionCounts::default(),
            explored: 0,
        }
    }

    pub fn avg_turns(&self) -> f64 {
        if self.turn_counts.is_empty() {
            0.0
        } else {
            self.turn_counts.iter().map(|&t| u64::from(t)).sum::<u64>() as f64
                / self.turn_counts.len() as f64
        }
    }

    /// Turns of every finished game, in play order.
    pub fn turn_counts(&self) -> &[u32] {
        &self.turn_counts
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_games: self.total_games,
            wins: self.wins.clone(),
            timeouts: self.timeouts,
            avg_turns: self.avg_turns(),
            max_turns: self.turn_counts.iter().copied().max().unwrap_or(0),
            actions: self.actions,
            explored: self.explored,
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_games: usize,
    /// Games won, indexed by seat
    pub wins: Vec<usize>,
    pub timeouts: usize,
    pub avg_turns: f64,
    pub max_turns: u32,
    pub actions: ActionCounts,
    pub explored: u64,
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MetricsObserver {
    fn on_decision(&mut self, _game_num: usize, decision: &Decision) -> Result<()> {
        self.actions.record(decision.action.kind());
        if decision.choice == Choice::Explored {
            self.explored += 1;
        }
        Ok(())
    }

    fn on_game_end(&mut self, _game_num: usize, summary: &EpisodeSummary) -> Result<()> {
        self.total_games += 1;
        self.turn_counts.push(summary.turns);
        match summary.winner {
            Some(seat) => {
                if self.wins.len() <= seat.index() {
                    self.wins.resize(seat.index() + 1, 0);
                }
                self.wins[seat.index()] += 1;
            }
            None => self.timeouts += 1,
        }
        Ok(())
    }
}

/// One line of a JSONL observation file.
#[derive(Debug, Serialize)]
struct Observation<'a> {
    game_num: usize,
    winner: Option<Seat>,
    turns: u32,
    actions: ActionCounts,
    stats: &'a AgentStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    decisions: Option<&'a [Decision]>,
}

/// JSONL observer - Writes one JSON object per finished game
pub struct JsonlObserver {
    writer: BufWriter<File>,
    include_decisions: bool,
    decisions: Vec<Decision>,
}

impl JsonlObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create {path:?}"),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            include_decisions: false,
            decisions: Vec::new(),
        })
    }

    /// Also record every decision of the game on its line.
    pub fn with_decisions(mut self) -> Self {
        self.include_decisions = true;
        self
    }
}

impl Observer for JsonlObserver {
    fn on_game_start(&mut self, _game_num: usize) -> Result<()> {
        self.decisions.clear();
        Ok(())
    }

    fn on_decision(&mut self, _game_num: usize, decision: &Decision) -> Result<()> {
        if self.include_decisions {
            self.decisions.push(decision.clone());
        }
        Ok(())
    }

    fn on_game_end(&mut self, game_num: usize, summary: &EpisodeSummary) -> Result<()> {
        let observation = Observation {
            game_num,
            winner: summary.winner,
            turns: summary.turns,
            actions: summary.actions,
            stats: &summary.stats,
            decisions: self.include_decisions.then_some(self.decisions.as_slice()),
        };

        serde_json::to_writer(&mut self.writer, &observation)?;
        writeln!(&mut self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
