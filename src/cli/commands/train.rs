//! Train command - Self-play training over a persistent value store

use std::{
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{
    app::{App, TrainingConfig},
    cli::output::{format_number, format_percent, print_kv, print_section, print_subsection},
    pipeline::{
        JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver, TrainingPipeline,
        TrainingResult,
    },
};

#[derive(Parser, Debug)]
#[command(about = "Train agents against each other")]
pub struct TrainArgs {
    /// SQLite database holding identities and values
    #[arg(long)]
    pub db: PathBuf,

    /// Number of training games
    #[arg(long, short = 'g')]
    pub games: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON training config; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub learning_rate: Option<f64>,

    #[arg(long)]
    pub planning_steps: Option<usize>,

    #[arg(long)]
    pub random_action_rate: Option<f64>,

    /// Sample size of the nearest-state search
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Players per game
    #[arg(long)]
    pub seats: Option<usize>,

    /// Optional file for JSONL observations, one line per game
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Include every decision in the JSONL observations
    #[arg(long, requires = "observations")]
    pub decisions: bool,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Write a MessagePack snapshot of the value table after training
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile<'a> {
    training: &'a TrainingResult,
    metrics: MetricsSummary,
    config: &'a TrainingConfig,
}

impl TrainArgs {
    fn training_config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => TrainingConfig::default(),
        };

        if let Some(games) = self.games {
            config.games = games;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(rate) = self.learning_rate {
            config.agent.learning_rate = rate;
        }
        if let Some(steps) = self.planning_steps {
            config.agent.planning_steps = steps;
        }
        if let Some(rate) = self.random_action_rate {
            config.agent.random_action_rate = rate;
        }
        if let Some(size) = self.batch_size {
            config.agent.similarity_batch_size = size;
        }
        if let Some(seats) = self.seats {
            config.duel.seats = seats;
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = args.training_config()?;
    let app = App::open(&args.db)
        .with_context(|| format!("Failed to open store {}", args.db.display()))?;

    print_section("Training");
    print_kv("Store", &args.db.display().to_string());
    print_kv("Games", &format_number(config.games));
    print_kv("Seats", &config.duel.seats.to_string());
    print_kv("Planning steps", &config.agent.planning_steps.to_string());
    if let Some(seed) = config.seed {
        print_kv("Seed", &seed.to_string());
    }

    let metrics = Arc::new(Mutex::new(MetricsObserver::new()));
    let mut pipeline = TrainingPipeline::new(config.clone(), app.clone())
        .with_observer(Box::new(Arc::clone(&metrics)));

    if args.progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let mut observer = JsonlObserver::new(path)?;
        if args.decisions {
            observer = observer.with_decisions();
        }
        pipeline = pipeline.with_observer(Box::new(observer));
    }

    let result = pipeline.run()?;
    let metrics = metrics
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .summary();

    print_subsection("Results");
    print_kv("Games", &format_number(result.games));
    for (seat, wins) in result.wins.iter().enumerate() {
        print_kv(&format!("Seat {seat} wins"), &format_number(*wins));
    }
    print_kv("Timeouts", &format_number(result.timeouts));
    print_kv("Turns per game", &format!("{:.1}", metrics.avg_turns));
    print_kv("Longest game", &metrics.max_turns.to_string());
    print_kv(
        "Actions",
        &format!(
            "pass {} / draw {} / play {}",
            metrics.actions.pass, metrics.actions.draw, metrics.actions.play
        ),
    );
    print_kv("Explored", &format_percent(result.exploration_rate()));
    print_kv("Replayed updates", &result.replayed.to_string());
    print_kv("Stale replays", &result.skipped_replays.to_string());
    print_kv("Value entries", &format_number(result.value_entries));

    if let Some(path) = &args.summary {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(
            file,
            &TrainingSummaryFile {
                training: &result,
                metrics,
                config: &config,
            },
        )?;
        println!("\n✓ Summary saved to: {}", path.display());
    }

    if let Some(path) = &args.snapshot {
        app.save_snapshot(path)?;
        println!("✓ Snapshot saved to: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: TrainArgs,
    }

    #[test]
    fn test_flags_override_defaults() {
        let harness = Harness::parse_from([
            "train",
            "--db",
            "values.db",
            "--games",
            "12",
            "--planning-steps",
            "0",
            "--seats",
            "3",
        ]);
        let config = harness.args.training_config().unwrap();
        assert_eq!(config.games, 12);
        assert_eq!(config.agent.planning_steps, 0);
        assert_eq!(config.duel.seats, 3);
        assert_eq!(config.agent.learning_rate, 0.4);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let harness = Harness::parse_from([
            "train",
            "--db",
            "values.db",
            "--random-action-rate",
            "1.5",
        ]);
        assert!(harness.args.training_config().is_err());
    }
}
