//! Training pipeline: many self-play games over one shared store

use std::{fs::File, path::Path};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::episode::{ActionCounts, run_episode};
use crate::{
    Error, Result,
    app::{App, TrainingConfig},
    game::DuelGame,
    identifiers::Seat,
    ports::{Observer, ValueStore},
};

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Total games played
    pub games: usize,

    /// Games won, indexed by seat
    pub wins: Vec<usize>,

    /// Games that hit the turn limit
    pub timeouts: usize,

    pub total_turns: u64,
    pub actions: ActionCounts,
    pub decisions: u64,
    pub explored: u64,
    pub replayed: u64,
    pub skipped_replays: u64,

    /// Value entries in the store after the last game
    pub value_entries: usize,

    /// Learning rate the last game was played with
    pub final_learning_rate: f64,
}

impl TrainingResult {
    fn new(seats: usize) -> Self {
        Self {
            games: 0,
            wins: vec![0; seats],
            timeouts: 0,
            total_turns: 0,
            actions: ActionCounts::default(),
            decisions: 0,
            explored: 0,
            replayed: 0,
            skipped_replays: 0,
            value_entries: 0,
            final_learning_rate: 0.0,
        }
    }

    pub fn mean_turns(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.total_turns as f64 / self.games as f64
        }
    }

    /// Fraction of decisions that were random explorations.
    pub fn exploration_rate(&self) -> f64 {
        if self.decisions == 0 {
            0.0
        } else {
            self.explored as f64 / self.decisions as f64
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create {path:?}"),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open {path:?}"),
            source,
        })?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Self-play training: one [`LearningAgent`](crate::agent::LearningAgent)
/// per seat, recreated for every game, all bound to the app's store.
///
/// # Examples
///
/// ```
/// use simdyna::app::{App, TrainingConfig};
/// use simdyna::pipeline::TrainingPipeline;
///
/// let config = TrainingConfig::default().with_games(3).with_seed(1);
/// let mut pipeline = TrainingPipeline::new(config, App::in_memory());
/// let result = pipeline.run()?;
/// assert_eq!(result.games, 3);
/// # Ok::<(), simdyna::Error>(())
/// ```
pub struct TrainingPipeline {
    config: TrainingConfig,
    app: App,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig, app: App) -> Self {
        Self {
            config,
            app,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Play `config.games` games and report the totals.
    ///
    /// Game and agent seeds are drawn from one generator seeded by the
    /// training seed, falling back to the agent seed and then to the app
    /// default; with none of them set the run is non-deterministic.
    pub fn run(&mut self) -> Result<TrainingResult> {
        self.config.validate()?;
        self.config.duel.validate(&self.app.catalog())?;

        let seats = self.config.duel.seats;
        let mut seeder = match self
            .config
            .seed
            .or(self.config.agent.seed)
            .or(self.app.default_seed())
        {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let mut agent_config = self.config.agent.clone();
        let mut result = TrainingResult::new(seats);
        let store = self.app.store();

        info!(
            games = self.config.games,
            seats,
            values = store.value_count(),
            "Training started"
        );
        for observer in &mut self.observers {
            observer.on_training_start(self.config.games)?;
        }

        for game_num in 0..self.config.games {
            for observer in &mut self.observers {
                observer.on_game_start(game_num)?;
            }

            let mut game = DuelGame::new(
                self.config.duel.clone(),
                self.app.catalog(),
                seeder.random(),
            )?;
            let mut agents = (0..seats)
                .map(|seat| {
                    let config = agent_config.clone().with_seed(seeder.random());
                    self.app.create_agent(Seat::new(seat), config)
                })
                .collect::<Result<Vec<_>>>()?;

            let observers = &mut self.observers;
            let summary = run_episode(&mut game, &mut agents, &mut |decision| {
                for observer in observers.iter_mut() {
                    observer.on_decision(game_num, decision)?;
                }
                Ok(())
            })?;

            result.games += 1;
            match summary.winner {
                Some(seat) => result.wins[seat.index()] += 1,
                None => result.timeouts += 1,
            }
            result.total_turns += u64::from(summary.turns);
            result.actions += summary.actions;
            result.decisions += summary.stats.decisions;
            result.explored += summary.stats.explored;
            result.replayed += summary.stats.replayed;
            result.skipped_replays += summary.stats.skipped_replays;
            result.final_learning_rate = agent_config.learning_rate;

            for observer in &mut self.observers {
                observer.on_game_end(game_num, &summary)?;
            }

            let log_every = self.config.log_every;
            if log_every > 0 && (game_num + 1) % log_every == 0 {
                info!(
                    game = game_num + 1,
                    timeouts = result.timeouts,
                    mean_turns = result.mean_turns(),
                    values = store.value_count(),
                    learning_rate = agent_config.learning_rate,
                    "Training progress"
                );
            }

            agent_config.learning_rate *= 1.0 - self.config.learning_rate_decay;
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        result.value_entries = store.value_count();
        info!(
            games = result.games,
            timeouts = result.timeouts,
            decisions = result.decisions,
            skipped_replays = result.skipped_replays,
            values = result.value_entries,
            "Training finished"
        );
        Ok(result)
    }
}
