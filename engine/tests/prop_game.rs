//! Property-based tests over whole games.
//!
//! A seeded driver plays random legal actions; every step must be accepted,
//! keep the state invariants and conserve troops against the event stream.
//! Run with: cargo test --release prop_game

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use conquest_engine::engine::{apply_action, Action};
use conquest_engine::invariants::check_invariants;
use conquest_engine::map::{self, MapDef};
use conquest_engine::navigation;
use conquest_engine::random::SeededRandom;
use conquest_engine::{Event, GameError, GameState, Phase, Rules, Spoil, SpoilColor};

const MAX_STEPS: usize = 4_000;

fn started(map: &MapDef, players: usize, rng: &mut SeededRandom) -> GameState {
    let rules = Rules::default();
    let mut state = GameState::new(&map.name);
    for i in 0..players {
        let join = Action::Join { player: format!("p{i}") };
        apply_action(&mut state, map, &rules, rng, &join).unwrap();
    }
    let start = Action::Start { player: "p0".into() };
    apply_action(&mut state, map, &rules, rng, &start).unwrap();
    state
}

/// Three spoils from `hand` forming a set. Callers only ask when one exists.
fn find_set(hand: &[Spoil]) -> Vec<String> {
    for color in SpoilColor::ALL {
        let same: Vec<String> = hand
            .iter()
            .filter(|s| s.color == color)
            .take(3)
            .map(|s| s.territory.clone())
            .collect();
        if same.len() == 3 {
            return same;
        }
    }
    SpoilColor::ALL
        .iter()
        .filter_map(|c| hand.iter().find(|s| s.color == *c))
        .map(|s| s.territory.clone())
        .collect()
}

fn owned(state: &GameState, player: &str) -> Vec<String> {
    state
        .territories
        .iter()
        .filter(|(_, t)| t.owner == player)
        .map(|(name, _)| name.clone())
        .collect()
}

/// A legal action for the active player.
fn choose_action(state: &GameState, map: &MapDef, chooser: &mut ChaCha8Rng) -> Action {
    let player = state.active_player.clone();
    match &state.phase {
        Phase::Spoils { mandatory } => {
            let hand = &state.player(&player).unwrap().spoils;
            let spoils = if *mandatory || chooser.gen_bool(0.5) { find_set(hand) } else { Vec::new() };
            Action::TradeSpoils { player, spoils }
        }
        Phase::Deploy { reinforcements } => {
            let mine = owned(state, &player);
            let target = mine[chooser.gen_range(0..mine.len())].clone();
            Action::Deploy { player, deployments: BTreeMap::from([(target, *reinforcements)]) }
        }
        Phase::Attack { .. } => {
            let options: Vec<(String, String)> = map
                .territory_names()
                .flat_map(|from| {
                    navigation::attack_targets(map, state, from, &player)
                        .into_iter()
                        .map(move |to| (from.to_string(), to))
                })
                .collect();
            if options.is_empty() || chooser.gen_bool(0.1) {
                Action::EndAttack { player }
            } else {
                let (from, to) = options[chooser.gen_range(0..options.len())].clone();
                Action::Attack { player, from, to }
            }
        }
        Phase::Advance { from, to } => {
            let available = state.territory(from).unwrap().troops;
            let troops = chooser.gen_range(0..available);
            Action::Advance { player, from: from.clone(), to: to.clone(), troops }
        }
        Phase::Reinforce { .. } => {
            let options: Vec<(String, String)> = owned(state, &player)
                .into_iter()
                .filter(|from| state.territory(from).unwrap().troops > 1)
                .flat_map(|from| {
                    navigation::reinforce_targets(map, state, &from, &player)
                        .into_iter()
                        .map(move |to| (from.clone(), to))
                })
                .collect();
            if options.is_empty() || chooser.gen_bool(0.5) {
                Action::EndReinforce { player }
            } else {
                let (from, to) = options[chooser.gen_range(0..options.len())].clone();
                let available = state.territory(&from).unwrap().troops;
                let troops = chooser.gen_range(0..available);
                Action::Reinforce { player, from, to, troops }
            }
        }
        Phase::Lobby | Phase::GameOver { .. } => unreachable!("driver asked to move outside play"),
    }
}

fn total_troops(state: &GameState) -> i64 {
    state.territories.values().map(|t| i64::from(t.troops)).sum()
}

/// Troops added minus troops lost, according to the events.
fn troop_delta(events: &[Event]) -> i64 {
    events
        .iter()
        .map(|e| match e {
            Event::Deploy { deployments, .. } => deployments.values().map(|&n| i64::from(n)).sum(),
            Event::Attack { attacker_losses, defender_losses, .. } => {
                -i64::from(attacker_losses + defender_losses)
            }
            _ => 0,
        })
        .sum()
}

/// An arbitrary, probably illegal, action built from the table's names.
fn fuzz_action(state: &GameState, map: &MapDef, chooser: &mut ChaCha8Rng) -> Action {
    let mut players: Vec<String> = state.players.iter().map(|p| p.name.clone()).collect();
    players.push("stranger".into());
    let mut places: Vec<String> = map.territory_names().map(str::to_string).collect();
    places.push("Nowhere".into());

    let player = players[chooser.gen_range(0..players.len())].clone();
    let mut place = || places[chooser.gen_range(0..places.len())].clone();
    let (from, to, other) = (place(), place(), place());
    let troops = chooser.gen_range(0..8);

    match chooser.gen_range(0..9) {
        0 => Action::Join { player },
        1 => Action::Start { player },
        2 => Action::TradeSpoils { player, spoils: vec![from, to, other] },
        3 => Action::Deploy { player, deployments: BTreeMap::from([(from, troops)]) },
        4 => Action::Attack { player, from, to },
        5 => Action::EndAttack { player },
        6 => Action::Advance { player, from, to, troops },
        7 => Action::Reinforce { player, from, to, troops },
        _ => Action::EndReinforce { player },
    }
}

fn map_name() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("alpha"), Just("tidewater")]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Random legal play is always accepted, keeps every invariant and
    /// never creates or destroys troops outside deploys and combat.
    #[test]
    fn prop_random_games_conserve_troops(
        seed in any::<u64>(),
        name in map_name(),
        players in 2usize..=3,
    ) {
        let map = map::builtin(name).unwrap();
        let rules = Rules::default();
        let mut rng = SeededRandom::new(seed);
        let mut chooser = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed);
        let mut state = started(&map, players, &mut rng);

        for _ in 0..MAX_STEPS {
            if state.winner().is_some() {
                break;
            }
            let action = choose_action(&state, &map, &mut chooser);
            let before = total_troops(&state);
            let events = apply_action(&mut state, &map, &rules, &mut rng, &action);
            prop_assert!(events.is_ok(), "{:?} rejected: {:?}", action, events);
            let events = events.unwrap();

            prop_assert_eq!(total_troops(&state), before + troop_delta(&events));
            let violations = check_invariants(&state, &map);
            prop_assert!(violations.is_empty(), "after {:?}: {:?}", action, violations);
        }

        if let Some(winner) = state.winner() {
            prop_assert_eq!(winner, state.active_player.as_str());
            prop_assert_eq!(state.players.iter().filter(|p| !p.eliminated).count(), 1);
        }
    }

    /// Whatever gets thrown at a game in progress, a rejected action leaves
    /// the state exactly as it was.
    #[test]
    fn prop_rejected_actions_are_atomic(
        seed in any::<u64>(),
        name in map_name(),
        warmup in 0usize..200,
    ) {
        let map = map::builtin(name).unwrap();
        let rules = Rules::default();
        let mut rng = SeededRandom::new(seed);
        let mut chooser = ChaCha8Rng::seed_from_u64(seed.rotate_left(17));
        let mut state = started(&map, 2, &mut rng);

        for _ in 0..warmup {
            if state.winner().is_some() {
                break;
            }
            let action = choose_action(&state, &map, &mut chooser);
            apply_action(&mut state, &map, &rules, &mut rng, &action).unwrap();
        }

        for _ in 0..50 {
            let action = fuzz_action(&state, &map, &mut chooser);
            let before = state.clone();
            match apply_action(&mut state, &map, &rules, &mut rng, &action) {
                Err(GameError::GameFinished) => prop_assert!(before.winner().is_some()),
                Err(_) => prop_assert_eq!(&state, &before),
                Ok(_) => {
                    let violations = check_invariants(&state, &map);
                    prop_assert!(violations.is_empty(), "after {:?}: {:?}", action, violations);
                }
            }
        }
    }
}
