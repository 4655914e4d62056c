//! The learning agent's control loop.

use std::{fmt, sync::Arc};

use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use tracing::{debug, trace, warn};

use super::{
    memory::{EpisodeMemory, Transition},
    policy::{Choice, ExplorationPolicy},
    td::{td_target, td_update},
};
use crate::{
    Error, Result,
    app::AgentConfig,
    codec::IdentityCodec,
    identifiers::{ActionId, Seat, StateId},
    model::{Action, CardCatalog, State},
    ports::{Environment, SharedStore},
    similarity::{ClosestState, SimilarityIndex},
    value::{Recommendation, recommend},
};

/// Lifecycle of a [`LearningAgent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentPhase {
    /// No decision made yet.
    Uninitialized,
    /// Picking the next action.
    AwaitingAction,
    /// An action was returned; the next query carries its reward.
    AwaitingReward,
    /// Received its terminal update.
    Terminated,
}

impl fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentPhase::Uninitialized => "uninitialized",
            AgentPhase::AwaitingAction => "awaiting action",
            AgentPhase::AwaitingReward => "awaiting reward",
            AgentPhase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// An action chosen by an agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub seat: Seat,
    pub turn: u32,
    pub state: StateId,
    pub action_id: ActionId,
    pub action: Action,
    pub choice: Choice,
}

/// Counters accumulated over an agent's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgentStats {
    pub decisions: u64,
    pub explored: u64,
    pub recommended: u64,
    /// Live TD updates, one per non-initial query.
    pub updates: u64,
    /// Replayed TD updates.
    pub replayed: u64,
    /// Replay entries skipped because an identity no longer resolved.
    pub skipped_replays: u64,
}

impl std::ops::AddAssign for AgentStats {
    fn add_assign(&mut self, other: Self) {
        self.decisions += other.decisions;
        self.explored += other.explored;
        self.recommended += other.recommended;
        self.updates += other.updates;
        self.replayed += other.replayed;
        self.skipped_replays += other.skipped_replays;
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Similarity-scaled Dyna Q-learner playing one seat of one game.
///
/// All agents of a run share one store; each agent only owns its episode
/// memory and random stream. Agents are meant to be recreated every game.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use simdyna::adapters::InMemoryStore;
/// use simdyna::agent::LearningAgent;
/// use simdyna::app::AgentConfig;
/// use simdyna::game::{DuelConfig, DuelGame};
/// use simdyna::identifiers::Seat;
/// use simdyna::model::CardCatalog;
///
/// let catalog = Arc::new(CardCatalog::standard());
/// let game = DuelGame::new(DuelConfig::default(), catalog.clone(), 7)?;
/// let mut agent = LearningAgent::new(
///     Seat::new(0),
///     AgentConfig::default().with_seed(7),
///     Arc::new(InMemoryStore::new()),
///     catalog,
/// )?;
/// let decision = agent.initial_query(&game)?;
/// println!("seat 0 plays {}", decision.action);
/// # Ok::<(), simdyna::Error>(())
/// ```
pub struct LearningAgent {
    seat: Seat,
    config: AgentConfig,
    codec: IdentityCodec,
    store: SharedStore,
    index: SimilarityIndex,
    policy: ExplorationPolicy,
    memory: EpisodeMemory,
    phase: AgentPhase,
    current: Option<(StateId, ActionId)>,
    rng: StdRng,
    stats: AgentStats,
}

impl LearningAgent {
    /// Create an agent bound to `store`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfiguration`] if `config` fails validation.
    pub fn new(
        seat: Seat,
        config: AgentConfig,
        store: SharedStore,
        catalog: Arc<CardCatalog>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            seat,
            codec: IdentityCodec::new(store.clone(), catalog),
            index: SimilarityIndex::new(config.feature_weights, config.similarity_batch_size),
            policy: ExplorationPolicy::new(config.random_action_rate),
            rng: build_rng(config.seed),
            store,
            config,
            memory: EpisodeMemory::new(),
            phase: AgentPhase::Uninitialized,
            current: None,
            stats: AgentStats::default(),
        })
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    pub fn stats(&self) -> AgentStats {
        self.stats
    }

    pub fn memory(&self) -> &EpisodeMemory {
        &self.memory
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// First decision of the episode.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAgentPhase`] unless the agent is uninitialized, plus
    /// any encoding, store or [`Error::NoLegalActions`] error.
    pub fn initial_query<E: Environment + ?Sized>(&mut self, env: &E) -> Result<Decision> {
        self.expect_phase(AgentPhase::Uninitialized)?;

        let state = env.observe(self.seat);
        let state_id = self.codec.state_id(&state)?;
        let closest = self.closest(state_id)?;
        let recommendation = self.recommendation(closest);

        self.decide(env, &state, state_id, recommendation.action)
    }

    /// Deliver the reward for the previous action and get the next one.
    ///
    /// Returns `Ok(None)` when `terminal` is set (the agent is then
    /// terminated) and when the agent was never initialized, which happens
    /// when its seat is eliminated before its first turn.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAgentPhase`] after termination, plus any encoding,
    /// store or [`Error::NoLegalActions`] error.
    pub fn query<E: Environment + ?Sized>(
        &mut self,
        env: &E,
        reward: f64,
        terminal: bool,
    ) -> Result<Option<Decision>> {
        if self.phase == AgentPhase::Uninitialized {
            return Ok(None);
        }
        self.expect_phase(AgentPhase::AwaitingReward)?;
        let Some((previous_state, previous_action)) = self.current else {
            return Err(self.phase_error(AgentPhase::AwaitingReward));
        };

        let state = env.observe(self.seat);
        let state_id = self.codec.state_id(&state)?;
        let discount = if terminal {
            self.config.endgame_discount_factor
        } else {
            self.config.discount_factor
        };

        let closest = self.closest(state_id)?;
        let recommendation = self.recommendation(closest);
        self.update(
            previous_state,
            previous_action,
            reward,
            closest.similarity,
            recommendation.value,
            discount,
        )?;
        self.stats.updates += 1;

        self.replay(terminal, discount)?;

        self.memory.push(Transition {
            state: previous_state,
            action: previous_action,
            next_state: state_id,
            reward,
        });

        if terminal {
            self.phase = AgentPhase::Terminated;
            self.current = None;
            debug!(
                seat = %self.seat,
                transitions = self.memory.len(),
                "agent terminated"
            );
            return Ok(None);
        }

        self.decide(env, &state, state_id, recommendation.action)
            .map(Some)
    }

    fn expect_phase(&self, expected: AgentPhase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(self.phase_error(expected))
        }
    }

    fn phase_error(&self, expected: AgentPhase) -> Error {
        Error::InvalidAgentPhase {
            expected: expected.to_string(),
            actual: self.phase.to_string(),
        }
    }

    /// The state itself if it has values, otherwise the sampled nearest one.
    fn closest(&mut self, state: StateId) -> Result<ClosestState> {
        if self.store.has_any_value_for(state) {
            return Ok(ClosestState::exact(state));
        }
        self.index.closest(self.store.as_ref(), state, &mut self.rng)
    }

    fn recommendation(&self, closest: ClosestState) -> Recommendation {
        match closest.state {
            Some(state) => recommend(
                &self.store.action_values(state),
                self.config.recommendation_floor,
            ),
            None => Recommendation::NONE,
        }
    }

    fn update(
        &mut self,
        state: StateId,
        action: ActionId,
        reward: f64,
        similarity: f64,
        best_future: f64,
        discount: f64,
    ) -> Result<()> {
        let old = self.store.get(state, action).unwrap_or(0.0);
        let target = td_target(reward, similarity, discount, best_future);
        let value = td_update(old, target, self.config.learning_rate);
        self.store.upsert(state, action, value)?;
        trace!(
            seat = %self.seat,
            state = %state,
            action = %action,
            old,
            value,
            similarity,
            "td update"
        );
        Ok(())
    }

    /// Replay recorded transitions, most recent first: the last
    /// `planning_steps` of them, or all of them on a terminal query.
    fn replay(&mut self, terminal: bool, discount: f64) -> Result<()> {
        if self.config.planning_steps == 0 {
            return Ok(());
        }
        let window = if terminal {
            self.memory.len()
        } else {
            self.config.planning_steps.min(self.memory.len())
        };
        let transitions: Vec<Transition> = self.memory.recent(window).copied().collect();

        for transition in transitions {
            if !self.resolves(&transition)? {
                warn!(
                    seat = %self.seat,
                    state = %transition.state,
                    action = %transition.action,
                    next_state = %transition.next_state,
                    "skipping replay of stale transition"
                );
                self.stats.skipped_replays += 1;
                continue;
            }
            let closest = self.closest(transition.next_state)?;
            let recommendation = self.recommendation(closest);
            self.update(
                transition.state,
                transition.action,
                transition.reward,
                closest.similarity,
                recommendation.value,
                discount,
            )?;
            self.stats.replayed += 1;
        }
        Ok(())
    }

    fn resolves(&self, transition: &Transition) -> Result<bool> {
        Ok(self.store.state_encoding(transition.state)?.is_some()
            && self.store.state_encoding(transition.next_state)?.is_some()
            && self.store.action_encoding(transition.action)?.is_some())
    }

    fn decide<E: Environment + ?Sized>(
        &mut self,
        env: &E,
        state: &State,
        state_id: StateId,
        recommended: Option<ActionId>,
    ) -> Result<Decision> {
        self.phase = AgentPhase::AwaitingAction;

        let legal = env.legal_actions(state);
        let legal_ids = legal
            .iter()
            .map(|action| self.codec.action_id(action))
            .collect::<Result<Vec<_>>>()?;
        let (index, choice) = self
            .policy
            .choose(recommended, &legal_ids, &mut self.rng)
            .ok_or(Error::NoLegalActions {
                seat: self.seat,
                turn: state.turn(),
            })?;

        let decision = Decision {
            seat: self.seat,
            turn: state.turn(),
            state: state_id,
            action_id: legal_ids[index],
            action: legal[index],
            choice,
        };

        self.stats.decisions += 1;
        match choice {
            Choice::Explored => self.stats.explored += 1,
            Choice::Recommended => self.stats.recommended += 1,
        }
        debug!(
            seat = %self.seat,
            turn = decision.turn,
            state = %state_id,
            action = %decision.action,
            choice = ?choice,
            "agent decided"
        );

        self.current = Some((state_id, decision.action_id));
        self.phase = AgentPhase::AwaitingReward;
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::InMemoryStore,
        codec::{ActionEncoding, StateEncoding},
        identifiers::CardId,
        model::{ExternalView, GlobalView, InternalView, Status, Target},
        ports::{IdentityStore, ValueStore},
    };

    /// Hand-driven environment: tests set the health and legal actions.
    struct Scripted {
        turn: u32,
        health: u32,
        legal: Vec<Action>,
    }

    impl Scripted {
        fn new() -> Self {
            Self {
                turn: 1,
                health: 10,
                legal: vec![
                    Action::Pass,
                    Action::Play {
                        card: CardId::new(0),
                        target: Some(Target::Left),
                    },
                ],
            }
        }
    }

    impl Environment for Scripted {
        fn observe(&self, _seat: Seat) -> State {
            let view = ExternalView {
                health: self.health,
                max_health: 10,
                resource: 1,
                max_resource: 1,
                hand_size: 1,
                draw_pile: 0,
            };
            State {
                global: GlobalView { turn: self.turn },
                internal: InternalView {
                    hand: vec![CardId::new(0)],
                    status: Status::Ready,
                },
                own: view.clone(),
                left: view.clone(),
                right: view,
            }
        }

        fn legal_actions(&self, _state: &State) -> Vec<Action> {
            self.legal.clone()
        }
    }

    fn agent(store: Arc<InMemoryStore>, config: AgentConfig) -> LearningAgent {
        LearningAgent::new(
            Seat::new(0),
            config.with_seed(17),
            store,
            Arc::new(CardCatalog::standard()),
        )
        .unwrap()
    }

    #[test]
    fn test_query_before_initial_is_noop() {
        let store = Arc::new(InMemoryStore::new());
        let mut agent = agent(store.clone(), AgentConfig::default());
        assert_eq!(agent.query(&Scripted::new(), 5.0, false).unwrap(), None);
        assert_eq!(agent.phase(), AgentPhase::Uninitialized);
        assert_eq!(store.value_count(), 0);
    }

    #[test]
    fn test_initial_query_twice_is_phase_error() {
        let env = Scripted::new();
        let mut agent = agent(Arc::new(InMemoryStore::new()), AgentConfig::default());
        agent.initial_query(&env).unwrap();
        assert_eq!(agent.phase(), AgentPhase::AwaitingReward);
        assert!(matches!(
            agent.initial_query(&env),
            Err(Error::InvalidAgentPhase { .. })
        ));
    }

    #[test]
    fn test_first_update_is_learning_rate_times_reward() {
        let store = Arc::new(InMemoryStore::new());
        let mut env = Scripted::new();
        let mut agent = agent(store.clone(), AgentConfig::default());
        let first = agent.initial_query(&env).unwrap();

        env.turn = 2;
        agent.query(&env, 10.0, false).unwrap();

        // Nothing was recorded before, so the future term is zero.
        let value = store.get(first.state, first.action_id).unwrap();
        assert!((value - 4.0).abs() < 1e-12, "value = {value}");
        assert_eq!(agent.stats().updates, 1);
        assert_eq!(agent.memory().len(), 1);
    }

    #[test]
    fn test_terminal_query_terminates() {
        let env = Scripted::new();
        let mut agent = agent(Arc::new(InMemoryStore::new()), AgentConfig::default());
        agent.initial_query(&env).unwrap();
        assert_eq!(agent.query(&env, -1000.0, true).unwrap(), None);
        assert_eq!(agent.phase(), AgentPhase::Terminated);
        assert!(matches!(
            agent.query(&env, 0.0, true),
            Err(Error::InvalidAgentPhase { .. })
        ));
    }

    #[test]
    fn test_no_legal_actions_is_error() {
        let mut env = Scripted::new();
        env.legal.clear();
        let mut agent = agent(Arc::new(InMemoryStore::new()), AgentConfig::default());
        assert!(matches!(
            agent.initial_query(&env),
            Err(Error::NoLegalActions { turn: 1, .. })
        ));
    }

    #[test]
    fn test_recorded_best_action_is_taken_greedily() {
        let store = Arc::new(InMemoryStore::new());
        let env = Scripted::new();
        let catalog = CardCatalog::standard();
        let state = StateEncoding::encode(&env.observe(Seat::new(0)), &catalog).unwrap();
        let state_id = store.intern_state(&state).unwrap();
        let attack = store
            .intern_action(&ActionEncoding::encode(&env.legal[1], &catalog).unwrap())
            .unwrap();
        store.upsert(state_id, attack, 50.0).unwrap();

        let mut agent = agent(store, AgentConfig::default().with_random_action_rate(0.0));
        let decision = agent.initial_query(&env).unwrap();
        assert_eq!(decision.action, env.legal[1]);
        assert_eq!(decision.choice, Choice::Recommended);
    }

    #[test]
    fn test_planning_disabled_skips_replay() {
        let store = Arc::new(InMemoryStore::new());
        let mut env = Scripted::new();
        let mut agent = agent(store, AgentConfig::default().with_planning_steps(0));
        agent.initial_query(&env).unwrap();
        for turn in 2..6 {
            env.turn = turn;
            agent.query(&env, 1.0, false).unwrap();
        }
        agent.query(&env, 100.0, true).unwrap();
        assert_eq!(agent.stats().replayed, 0);
        assert_eq!(agent.stats().updates, 5);
    }
}
