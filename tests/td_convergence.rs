//! Values converge to what the rewards imply.

mod common;

use std::sync::Arc;

use simdyna::{
    adapters::InMemoryStore,
    agent::LearningAgent,
    app::{AgentConfig, App, TrainingConfig},
    codec::{ActionEncoding, StateEncoding},
    game::{DeckEntry, DuelConfig, DuelGame},
    identifiers::{CardId, Seat},
    model::{Action, CardCatalog, CardDefinition, CardEffect, Target},
    pipeline::TrainingPipeline,
    ports::{Environment, IdentityStore, ValueStore},
    similarity::{FeatureWeights, similarity},
};

use common::{ScriptedEnv, catalog, strike};

/// One-step episodes from a fixed state: attacking pays 10, passing costs 10.
#[test]
fn test_one_step_values_reach_fixed_point() {
    let store = Arc::new(InMemoryStore::new());
    let config = AgentConfig::default()
        .with_random_action_rate(0.5)
        .with_planning_steps(0);

    for episode in 0..400 {
        let mut env = ScriptedEnv::new();
        env.legal = vec![Action::Pass, strike(Target::Left)];
        let mut agent = LearningAgent::new(
            Seat::new(0),
            config.clone().with_seed(episode),
            store.clone(),
            catalog(),
        )
        .unwrap();

        let decision = agent.initial_query(&env).unwrap();
        let reward = if decision.action == Action::Pass {
            -10.0
        } else {
            10.0
        };
        env.turn = 2;
        env.health = 1;
        agent.query(&env, reward, true).unwrap();
    }

    let catalog = CardCatalog::standard();
    let start = ScriptedEnv::new();
    let mut end = ScriptedEnv::new();
    end.turn = 2;
    end.health = 1;
    let start = StateEncoding::encode(&start.observe(Seat::new(0)), &catalog).unwrap();
    let end = StateEncoding::encode(&end.observe(Seat::new(0)), &catalog).unwrap();

    // The end state never gets values; its closest recorded state is the
    // start state, discounted by their similarity.
    let k = similarity(&end, &start, &FeatureWeights::default())
        * config.endgame_discount_factor;
    assert!(k < 0.5, "k = {k}");
    let attack_fixed_point = 10.0 / (1.0 - k);
    let pass_fixed_point = -10.0 + k * attack_fixed_point;

    let state = store.intern_state(&start).unwrap();
    let pass = store
        .intern_action(&ActionEncoding::encode(&Action::Pass, &catalog).unwrap())
        .unwrap();
    let attack = store
        .intern_action(&ActionEncoding::encode(&strike(Target::Left), &catalog).unwrap())
        .unwrap();

    let attack_value = store.get(state, attack).unwrap();
    let pass_value = store.get(state, pass).unwrap();
    assert!(
        (attack_value - attack_fixed_point).abs() < 1e-6,
        "attack {attack_value} vs {attack_fixed_point}"
    );
    assert!(
        (pass_value - pass_fixed_point).abs() < 1e-6,
        "pass {pass_value} vs {pass_fixed_point}"
    );
}

fn smash_catalog() -> CardCatalog {
    CardCatalog::new([CardDefinition {
        id: CardId::new(0),
        name: "Smash".to_string(),
        cost: 1,
        effect: CardEffect::Damage { amount: 5 },
    }])
    .unwrap()
}

fn smash_duel() -> DuelConfig {
    DuelConfig::default()
        .with_starting_health(10)
        .with_hand_size(1)
        .with_max_turns(20)
        .with_deck(vec![DeckEntry {
            card: CardId::new(0),
            count: 4,
        }])
}

/// Two seats, one card that deals half a seat's health: opening with an
/// attack must end up worth more than passing.
#[test]
fn test_duel_learns_to_attack_first() {
    let app = App::for_testing()
        .with_store(InMemoryStore::new())
        .with_catalog(smash_catalog())
        .build();
    let config = TrainingConfig::default()
        .with_games(400)
        .with_seed(2024)
        .with_duel(smash_duel());

    let result = TrainingPipeline::new(config.clone(), app.clone())
        .run()
        .unwrap();
    assert_eq!(result.games, 400);

    let opening = DuelGame::new(config.duel, app.catalog(), 0).unwrap();
    let codec = app.identity_codec();
    let state = codec.state_id(&opening.observe(Seat::new(0))).unwrap();
    let store = app.store();

    let attack = [Target::Left, Target::Right]
        .into_iter()
        .filter_map(|target| {
            let action = codec
                .action_id(&Action::Play {
                    card: CardId::new(0),
                    target: Some(target),
                })
                .unwrap();
            store.get(state, action)
        })
        .fold(f64::NEG_INFINITY, f64::max);
    let pass = store
        .get(state, codec.action_id(&Action::Pass).unwrap())
        .unwrap_or(0.0);

    assert!(attack.is_finite(), "attack from the opening was never tried");
    assert!(attack > pass, "attack {attack} <= pass {pass}");
}
