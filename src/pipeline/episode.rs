//! One game of agents against each other.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    agent::{AgentPhase, AgentStats, Decision, LearningAgent},
    game::{DuelGame, StepOutcome},
    identifiers::Seat,
    model::ActionKind,
};

/// Chosen actions per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCounts {
    pub pass: u64,
    pub draw: u64,
    pub play: u64,
}

impl ActionCounts {
    pub fn record(&mut self, kind: ActionKind) {
        match kind {
            ActionKind::Pass => self.pass += 1,
            ActionKind::Draw => self.draw += 1,
            ActionKind::Play => self.play += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.pass + self.draw + self.play
    }
}

impl std::ops::AddAssign for ActionCounts {
    fn add_assign(&mut self, other: Self) {
        self.pass += other.pass;
        self.draw += other.draw;
        self.play += other.play;
    }
}

/// Outcome of a finished game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub winner: Option<Seat>,
    /// Rounds started, including the last one.
    pub turns: u32,
    pub actions: ActionCounts,
    /// Agent counters summed over every seat.
    pub stats: AgentStats,
}

impl EpisodeSummary {
    pub fn timed_out(&self) -> bool {
        self.winner.is_none()
    }
}

/// Drive `game` to its end with one agent per seat.
///
/// The active seat makes its first decision with `initial_query` and every
/// later one with `query`, and keeps acting until it passes or the game
/// ends. Finally every agent gets its terminal query with whatever reward
/// is still pending for its seat.
///
/// `on_decision` sees every decision before the game applies it.
pub fn run_episode(
    game: &mut DuelGame,
    agents: &mut [LearningAgent],
    on_decision: &mut dyn FnMut(&Decision) -> Result<()>,
) -> Result<EpisodeSummary> {
    let mut actions = ActionCounts::default();

    while !game.is_over() {
        let seat = game.active_seat();
        let agent = &mut agents[seat.index()];

        let mut next = if agent.phase() == AgentPhase::Uninitialized {
            Some(agent.initial_query(&*game)?)
        } else {
            let reward = game.take_reward(seat);
            agent.query(&*game, reward, false)?
        };

        while let Some(decision) = next.take() {
            on_decision(&decision)?;
            actions.record(decision.action.kind());

            match game.apply(seat, decision.action)? {
                StepOutcome::Continue => {
                    let reward = game.take_reward(seat);
                    next = agent.query(&*game, reward, false)?;
                }
                StepOutcome::TurnEnded | StepOutcome::GameOver => {}
            }
        }
    }

    let mut stats = AgentStats::default();
    for agent in agents.iter_mut() {
        let reward = game.take_reward(agent.seat());
        agent.query(&*game, reward, true)?;
        stats += agent.stats();
    }

    Ok(EpisodeSummary {
        winner: game.winner(),
        turns: game.turn(),
        actions,
        stats,
    })
}
