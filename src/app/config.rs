//! Configuration types for agents and training runs.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result, game::DuelConfig, similarity::FeatureWeights, value::RecommendationFloor,
};

/// Learning parameters of a [`LearningAgent`](crate::agent::LearningAgent).
///
/// Builder-style API; every field falls back to its default when missing
/// from a JSON config file.
///
/// # Examples
///
/// ```
/// use simdyna::app::AgentConfig;
/// use simdyna::value::RecommendationFloor;
///
/// let config = AgentConfig::default()
///     .with_seed(42)
///     .with_planning_steps(5)
///     .with_recommendation_floor(RecommendationFloor::NegativeInfinity);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// α, trust in new information
    pub learning_rate: f64,
    /// γ for non-terminal updates
    pub discount_factor: f64,
    /// γ for the terminal update and its replay
    pub endgame_discount_factor: f64,
    pub random_action_rate: f64,
    /// Replay window; 0 disables replay entirely
    pub planning_steps: usize,
    /// Sample size of the nearest-state search
    pub similarity_batch_size: usize,
    pub recommendation_floor: RecommendationFloor,
    pub feature_weights: FeatureWeights,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.4,
            discount_factor: 0.8,
            endgame_discount_factor: 0.975,
            random_action_rate: 0.1,
            planning_steps: 10,
            similarity_batch_size: 100,
            recommendation_floor: RecommendationFloor::default(),
            feature_weights: FeatureWeights::default(),
            seed: None,
        }
    }
}

fn unit_interval(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration {
            message: format!("{name} must be in [0, 1], got {value}"),
        })
    }
}

impl AgentConfig {
    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    pub fn with_discount_factor(mut self, factor: f64) -> Self {
        self.discount_factor = factor;
        self
    }

    pub fn with_endgame_discount_factor(mut self, factor: f64) -> Self {
        self.endgame_discount_factor = factor;
        self
    }

    pub fn with_random_action_rate(mut self, rate: f64) -> Self {
        self.random_action_rate = rate;
        self
    }

    pub fn with_planning_steps(mut self, steps: usize) -> Self {
        self.planning_steps = steps;
        self
    }

    pub fn with_similarity_batch_size(mut self, size: usize) -> Self {
        self.similarity_batch_size = size;
        self
    }

    pub fn with_recommendation_floor(mut self, floor: RecommendationFloor) -> Self {
        self.recommendation_floor = floor;
        self
    }

    pub fn with_feature_weights(mut self, weights: FeatureWeights) -> Self {
        self.feature_weights = weights;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        unit_interval("learning_rate", self.learning_rate)?;
        unit_interval("discount_factor", self.discount_factor)?;
        unit_interval("endgame_discount_factor", self.endgame_discount_factor)?;
        unit_interval("random_action_rate", self.random_action_rate)?;
        if self.similarity_batch_size == 0 {
            return Err(Error::InvalidConfiguration {
                message: "similarity_batch_size must be at least 1".to_string(),
            });
        }
        self.feature_weights.validate()
    }
}

/// A full training run: many games over one shared store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub games: usize,
    pub seed: Option<u64>,
    /// After every game the learning rate is multiplied by `1 - decay`.
    pub learning_rate_decay: f64,
    /// Log a progress line every this many games; 0 disables it.
    pub log_every: usize,
    pub agent: AgentConfig,
    pub duel: DuelConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            games: 1000,
            seed: None,
            learning_rate_decay: 0.0,
            log_every: 0,
            agent: AgentConfig::default(),
            duel: DuelConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open config {path:?}"),
            source,
        })?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn with_games(mut self, games: usize) -> Self {
        self.games = games;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_agent(mut self, agent: AgentConfig) -> Self {
        self.agent = agent;
        self
    }

    pub fn with_duel(mut self, duel: DuelConfig) -> Self {
        self.duel = duel;
        self
    }

    pub fn with_learning_rate_decay(mut self, decay: f64) -> Self {
        self.learning_rate_decay = decay;
        self
    }

    pub fn with_log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }

    /// Checks the agent parameters and the decay. The duel is checked against
    /// its card catalog when a game is created.
    pub fn validate(&self) -> Result<()> {
        unit_interval("learning_rate_decay", self.learning_rate_decay)?;
        self.agent.validate()
    }
}
