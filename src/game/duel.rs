//! A small free-for-all card duel for two or more seats.
//!
//! Seats sit in a ring. On its turn a seat may draw once, play any affordable
//! cards from its hand and finally pass. Played cards leave the game. Damage
//! cards hit the nearest living neighbour on either side, heal cards restore
//! the player's own health. The last seat standing wins.

use std::{collections::BTreeSet, sync::Arc};

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    identifiers::{CardId, Seat},
    model::{
        Action, CardCatalog, CardEffect, ExternalView, GlobalView, InternalView, State, Status,
        Target,
    },
    ports::Environment,
};

/// Copies of one card in every seat's starting deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub card: CardId,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    pub seats: usize,
    pub starting_health: u32,
    pub max_resource: u32,
    pub draw_cost: u32,
    /// Cards dealt before the first turn.
    pub hand_size: usize,
    pub deck: Vec<DeckEntry>,
    /// The game ends without a winner after this many rounds.
    pub max_turns: u32,
    pub win_reward: f64,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            seats: 2,
            starting_health: 20,
            max_resource: 3,
            draw_cost: 1,
            hand_size: 3,
            deck: vec![
                DeckEntry {
                    card: CardId::new(0),
                    count: 6,
                },
                DeckEntry {
                    card: CardId::new(1),
                    count: 3,
                },
                DeckEntry {
                    card: CardId::new(2),
                    count: 3,
                },
            ],
            max_turns: 500,
            win_reward: 1000.0,
        }
    }
}

impl DuelConfig {
    pub fn with_seats(mut self, seats: usize) -> Self {
        self.seats = seats;
        self
    }

    pub fn with_starting_health(mut self, health: u32) -> Self {
        self.starting_health = health;
        self
    }

    pub fn with_deck(mut self, deck: Vec<DeckEntry>) -> Self {
        self.deck = deck;
        self
    }

    pub fn with_hand_size(mut self, hand_size: usize) -> Self {
        self.hand_size = hand_size;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn validate(&self, catalog: &CardCatalog) -> Result<()> {
        let invalid = |message: String| Err(Error::InvalidConfiguration { message });
        if self.seats < 2 {
            return invalid(format!("a duel needs at least 2 seats, got {}", self.seats));
        }
        if self.starting_health == 0 {
            return invalid("starting health must be positive".to_string());
        }
        if self.max_turns == 0 {
            return invalid("max turns must be positive".to_string());
        }
        if !self.win_reward.is_finite() {
            return invalid(format!("win reward must be finite, got {}", self.win_reward));
        }
        if let Some(entry) = self.deck.iter().find(|e| !catalog.contains(e.card)) {
            return Err(Error::UnknownCard {
                card: entry.card,
                context: "duel deck".to_string(),
            });
        }
        Ok(())
    }
}

/// What happened after [`DuelGame::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The same seat acts again.
    Continue,
    /// The turn passed to the next living seat.
    TurnEnded,
    GameOver,
}

#[derive(Debug, Clone)]
struct SeatState {
    health: u32,
    max_health: u32,
    resource: u32,
    max_resource: u32,
    hand: Vec<CardId>,
    draw_pile: Vec<CardId>,
    status: Status,
}

impl SeatState {
    fn is_alive(&self) -> bool {
        self.health > 0
    }

    fn view(&self) -> ExternalView {
        ExternalView {
            health: self.health,
            max_health: self.max_health,
            resource: self.resource,
            max_resource: self.max_resource,
            hand_size: self.hand.len() as u32,
            draw_pile: self.draw_pile.len() as u32,
        }
    }
}

/// Live game state. Agents only see [`State`] snapshots of it.
#[derive(Debug, Clone)]
pub struct DuelGame {
    config: DuelConfig,
    catalog: Arc<CardCatalog>,
    seats: Vec<SeatState>,
    pending_rewards: Vec<f64>,
    turn: u32,
    active: Seat,
    winner: Option<Seat>,
    finished: bool,
}

impl DuelGame {
    /// Shuffle every seat's deck with `seed`, deal the opening hands and
    /// start seat 0's first turn.
    pub fn new(config: DuelConfig, catalog: Arc<CardCatalog>, seed: u64) -> Result<Self> {
        config.validate(&catalog)?;
        let mut rng = StdRng::seed_from_u64(seed);

        let deck: Vec<CardId> = config
            .deck
            .iter()
            .flat_map(|entry| std::iter::repeat_n(entry.card, entry.count as usize))
            .collect();
        let seats = (0..config.seats)
            .map(|_| {
                let mut draw_pile = deck.clone();
                draw_pile.shuffle(&mut rng);
                let dealt = config.hand_size.min(draw_pile.len());
                let hand = draw_pile.split_off(draw_pile.len() - dealt);
                SeatState {
                    health: config.starting_health,
                    max_health: config.starting_health,
                    resource: 0,
                    max_resource: config.max_resource,
                    hand,
                    draw_pile,
                    status: Status::Ready,
                }
            })
            .collect();

        let mut game = Self {
            pending_rewards: vec![0.0; config.seats],
            config,
            catalog,
            seats,
            turn: 1,
            active: Seat::new(0),
            winner: None,
            finished: false,
        };
        game.start_turn(Seat::new(0));
        Ok(game)
    }

    pub fn config(&self) -> &DuelConfig {
        &self.config
    }

    pub fn seat_count(&self) -> usize {
        self.seats.len()
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn active_seat(&self) -> Seat {
        self.active
    }

    pub fn is_over(&self) -> bool {
        self.finished
    }

    /// The winner, or `None` while running and after a timeout.
    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }

    pub fn health(&self, seat: Seat) -> Option<u32> {
        self.seats.get(seat.index()).map(|s| s.health)
    }

    pub fn is_alive(&self, seat: Seat) -> bool {
        self.seats.get(seat.index()).is_some_and(SeatState::is_alive)
    }

    /// Reward accumulated by `seat` since the last call.
    pub fn take_reward(&mut self, seat: Seat) -> f64 {
        self.pending_rewards
            .get_mut(seat.index())
            .map_or(0.0, std::mem::take)
    }

    /// Nearest living seat on the `target` side of `seat`; `seat` itself when
    /// nobody else is alive.
    fn neighbour(&self, seat: Seat, target: Target) -> Seat {
        let n = self.seats.len();
        let mut current = seat;
        for _ in 1..n {
            current = match target {
                Target::Left => current.left(n),
                Target::Right => current.right(n),
                Target::Own => return seat,
            };
            if self.seats[current.index()].is_alive() {
                return current;
            }
        }
        seat
    }

    fn living(&self) -> usize {
        self.seats.iter().filter(|s| s.is_alive()).count()
    }

    fn start_turn(&mut self, seat: Seat) {
        self.active = seat;
        let state = &mut self.seats[seat.index()];
        state.resource = state.max_resource;
        state.status = Status::Ready;
    }

    fn end_turn(&mut self) -> StepOutcome {
        let n = self.seats.len();
        let mut next = self.active;
        loop {
            next = next.right(n);
            if next.index() == 0 {
                self.turn += 1;
            }
            if self.seats[next.index()].is_alive() {
                break;
            }
        }
        if self.turn > self.config.max_turns {
            self.finished = true;
            return StepOutcome::GameOver;
        }
        self.start_turn(next);
        StepOutcome::TurnEnded
    }

    fn finish_with_winner(&mut self, winner: Seat) {
        self.winner = Some(winner);
        self.finished = true;
        let reward = self.config.win_reward;
        for (index, pending) in self.pending_rewards.iter_mut().enumerate() {
            if index == winner.index() {
                *pending += reward;
            } else {
                *pending -= reward;
            }
        }
    }

    /// Apply `action` for the active seat.
    ///
    /// # Errors
    ///
    /// [`Error::IllegalAction`] if the game is over, `seat` is not the active
    /// seat, or `action` is not currently legal.
    pub fn apply(&mut self, seat: Seat, action: Action) -> Result<StepOutcome> {
        let illegal = || Error::IllegalAction {
            seat,
            action: action.to_string(),
        };
        if self.finished || seat != self.active {
            return Err(illegal());
        }
        if !self.legal_actions(&self.observe(seat)).contains(&action) {
            return Err(illegal());
        }

        match action {
            Action::Pass => Ok(self.end_turn()),
            Action::Draw => {
                let draw_cost = self.config.draw_cost;
                let state = &mut self.seats[seat.index()];
                let card = state.draw_pile.pop().ok_or_else(illegal)?;
                state.resource -= draw_cost;
                state.hand.push(card);
                state.status = Status::HasDrawn;
                Ok(StepOutcome::Continue)
            }
            Action::Play { card, target } => {
                let definition = self
                    .catalog
                    .get(card)
                    .ok_or(Error::UnknownCard {
                        card,
                        context: "duel play".to_string(),
                    })?
                    .clone();
                {
                    let state = &mut self.seats[seat.index()];
                    let position = state
                        .hand
                        .iter()
                        .position(|c| *c == card)
                        .ok_or_else(illegal)?;
                    state.hand.remove(position);
                    state.resource -= definition.cost;
                }

                match definition.effect {
                    CardEffect::Damage { amount } => {
                        let victim = self.neighbour(seat, target.unwrap_or(Target::Left));
                        let victim_state = &mut self.seats[victim.index()];
                        let dealt = amount.min(victim_state.health);
                        victim_state.health -= dealt;
                        self.pending_rewards[seat.index()] += f64::from(dealt);
                        self.pending_rewards[victim.index()] -= f64::from(dealt);

                        if self.living() == 1 {
                            self.finish_with_winner(seat);
                            return Ok(StepOutcome::GameOver);
                        }
                    }
                    CardEffect::Heal { amount } => {
                        let state = &mut self.seats[seat.index()];
                        state.health = (state.health + amount).min(state.max_health);
                    }
                }
                Ok(StepOutcome::Continue)
            }
        }
    }
}

impl Environment for DuelGame {
    fn observe(&self, seat: Seat) -> State {
        let own = &self.seats[seat.index()];
        State {
            global: GlobalView { turn: self.turn },
            internal: InternalView {
                hand: own.hand.clone(),
                status: own.status,
            },
            own: own.view(),
            left: self.seats[self.neighbour(seat, Target::Left).index()].view(),
            right: self.seats[self.neighbour(seat, Target::Right).index()].view(),
        }
    }

    /// Pass, then draw, then every affordable card in ascending card order
    /// with each of its targets.
    fn legal_actions(&self, state: &State) -> Vec<Action> {
        let mut actions = vec![Action::Pass];
        if state.internal.status.can_draw()
            && state.own.resource >= self.config.draw_cost
            && state.own.draw_pile > 0
        {
            actions.push(Action::Draw);
        }
        let distinct: BTreeSet<CardId> = state.internal.hand.iter().copied().collect();
        for card in distinct {
            let Some(definition) = self.catalog.get(card) else {
                continue;
            };
            if definition.cost > state.own.resource {
                continue;
            }
            for target in definition.effect.targets() {
                actions.push(Action::Play {
                    card,
                    target: Some(*target),
                });
            }
        }
        actions
    }
}
