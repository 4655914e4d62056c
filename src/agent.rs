//! Learning agent: similarity-scaled TD updates with Dyna-style replay.
//!
//! A [`LearningAgent`] is driven by the game loop through
//! [`initial_query`](LearningAgent::initial_query) and
//! [`query`](LearningAgent::query). Each query re-observes the agent's seat,
//! updates the value of the previous (state, action) pair, replays recent
//! transitions and picks the next action with an [`ExplorationPolicy`].

pub mod learner;
pub mod memory;
pub mod policy;
pub mod td;

pub use learner::{AgentPhase, AgentStats, Decision, LearningAgent};
pub use memory::{EpisodeMemory, Transition};
pub use policy::{Choice, ExplorationPolicy};
pub use td::{td_target, td_update};
