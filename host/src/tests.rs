// ═══════════════════════════════════════════════════════════════════════
// Host tests — registry lifecycle, fan-out order and redaction
// ═══════════════════════════════════════════════════════════════════════

use crate::{HostError, Registry};
use conquest_engine::visibility::HandCard;
use conquest_engine::{Action, Event, GameError, Phase, Rules, ScriptedRandom};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

fn join(player: &str) -> Action {
    Action::Join { player: player.into() }
}

fn started_registry(id: &str) -> Registry {
    let registry = Registry::new();
    let rng = ScriptedRandom::new(7).with_picks(&[0]);
    registry.create_game(id, "alpha", Rules::default(), Box::new(rng)).unwrap();
    for p in ["ann", "bob"] {
        registry.submit(id, &join(p)).unwrap();
    }
    registry.submit(id, &Action::Start { player: "ann".into() }).unwrap();
    registry
}

fn drain(rx: &Receiver<Event>) -> Vec<Event> {
    rx.try_iter().collect()
}

#[test]
fn test_registry_knows_builtin_maps() {
    let registry = Registry::new();
    assert_eq!(registry.map_names(), vec!["alpha".to_string(), "tidewater".to_string()]);
    assert!(matches!(registry.map("atlantis"), Err(HostError::UnknownMap(_))));
}

#[test]
fn test_registry_game_lifecycle() {
    let registry = Registry::new();
    let rng = || Box::new(ScriptedRandom::new(1));

    registry.create_game("g1", "alpha", Rules::default(), rng()).unwrap();
    let dup = registry.create_game("g1", "tidewater", Rules::default(), rng());
    assert!(matches!(dup, Err(HostError::DuplicateGame(id)) if id == "g1"));
    let bad_map = registry.create_game("g2", "atlantis", Rules::default(), rng());
    assert!(matches!(bad_map, Err(HostError::UnknownMap(_))));
    assert_eq!(registry.game_ids(), vec!["g1".to_string()]);

    registry.remove_game("g1").unwrap();
    assert!(matches!(registry.game("g1"), Err(HostError::UnknownGame(_))));
    assert!(matches!(registry.submit("g1", &join("ann")), Err(HostError::UnknownGame(_))));
}

#[test]
fn test_custom_map_from_json() {
    let registry = Registry::new();
    let json = r#"{"name":"pair","territories":[
        {"name":"North","neighbours":["South"]},
        {"name":"South","neighbours":["North"]}]}"#;
    registry.load_map_json(json).unwrap();
    assert!(registry.map("pair").is_ok());
    assert!(matches!(registry.load_map_json("[]"), Err(HostError::Map(_))));
}

#[test]
fn test_rejected_action_reaches_nobody() {
    let registry = started_registry("g");
    let (tx, rx) = mpsc::channel();
    registry.subscribe("g", "bob", Box::new(tx)).unwrap();

    let result = registry.submit("g", &Action::EndAttack { player: "bob".into() });
    assert!(matches!(result, Err(HostError::Rejected(GameError::NotYourTurn))));
    assert!(drain(&rx).is_empty());
}

#[test]
fn test_observers_receive_events_in_order() {
    let registry = started_registry("g");
    let (tx, rx) = mpsc::channel();
    registry.subscribe("g", "bob", Box::new(tx)).unwrap();

    let deploy = Action::Deploy {
        player: "ann".into(),
        deployments: [("Arafan".to_string(), 3)].into_iter().collect(),
    };
    let returned = registry.submit("g", &deploy).unwrap();
    let delivered = drain(&rx);

    assert_eq!(delivered.len(), 3);
    assert!(matches!(delivered[0], Event::Deploy { .. }));
    assert!(matches!(delivered[1], Event::StatsChanged { .. }));
    assert!(matches!(
        &delivered[2],
        Event::PhaseChanged { new_phase: Phase::Attack { just_conquered: false }, .. }
    ));
    assert_eq!(returned, delivered);
}

#[test]
fn test_game_over_reaches_every_observer() {
    let registry = started_registry("g");
    let game = registry.game("g").unwrap();
    let (tx, rx) = mpsc::channel();
    game.subscribe("bob", Box::new(tx));

    game.submit(&Action::Deploy {
        player: "ann".into(),
        deployments: [("Arafan".to_string(), 20)].into_iter().collect(),
    })
    .unwrap();
    // Moncton is bob's only territory; taking it ends the game.
    while game.with_game(|g| g.state().winner().is_none()) {
        game.submit(&Action::Attack {
            player: "ann".into(),
            from: "Arafan".into(),
            to: "Moncton".into(),
        })
        .unwrap();
    }

    let delivered = drain(&rx);
    assert!(matches!(
        delivered.last(),
        Some(Event::PhaseChanged { new_phase: Phase::GameOver { winner }, .. }) if winner == "ann"
    ));
    assert!(game.with_game(|g| g.state().player("bob").unwrap().eliminated));
    assert_eq!(game.view("bob").phase, Phase::GameOver { winner: "ann".into() });

    let late = game.submit(&Action::EndAttack { player: "ann".into() });
    assert_eq!(late, Err(GameError::GameFinished));
}

#[test]
fn test_stats_redacted_for_rival_observer() {
    let registry = Registry::new();
    let rng = ScriptedRandom::new(3).with_picks(&[0, 0]);
    registry.create_game("g", "tidewater", Rules::default(), Box::new(rng)).unwrap();
    for p in ["ann", "bob"] {
        registry.submit("g", &join(p)).unwrap();
    }
    registry.submit("g", &Action::Start { player: "ann".into() }).unwrap();

    // Map order is dealt round-robin: ann holds Frostmere, bob Greyhollow.
    let game = registry.game("g").unwrap();
    let (ann_tx, ann_rx) = mpsc::channel();
    let (bob_tx, bob_rx) = mpsc::channel();
    game.subscribe("ann", Box::new(ann_tx));
    game.subscribe("bob", Box::new(bob_tx));

    let deploy = Action::Deploy {
        player: "ann".into(),
        deployments: [("Frostmere".to_string(), 30)].into_iter().collect(),
    };
    game.submit(&deploy).unwrap();
    let mut won_once = false;
    while !won_once {
        let events = game
            .submit(&Action::Attack { player: "ann".into(), from: "Frostmere".into(), to: "Greyhollow".into() })
            .unwrap();
        won_once = events.iter().any(|e| matches!(e, Event::Attack { conquered: true, .. }));
    }
    game.submit(&Action::Advance {
        player: "ann".into(),
        from: "Frostmere".into(),
        to: "Greyhollow".into(),
        troops: 0,
    })
    .unwrap();
    game.submit(&Action::EndAttack { player: "ann".into() }).unwrap();
    drain(&ann_rx);
    drain(&bob_rx);
    game.submit(&Action::EndReinforce { player: "ann".into() }).unwrap();

    let hand_of_ann = |events: Vec<Event>| -> Vec<HandCard> {
        events
            .into_iter()
            .find_map(|e| match e {
                Event::StatsChanged { mut updates } => updates.remove("ann").map(|u| u.spoils),
                _ => None,
            })
            .unwrap()
    };
    let seen_by_ann = hand_of_ann(drain(&ann_rx));
    let seen_by_bob = hand_of_ann(drain(&bob_rx));
    assert_eq!(seen_by_ann.len(), 1);
    assert!(matches!(seen_by_ann[0], HandCard::Known(_)));
    assert_eq!(seen_by_bob, vec![HandCard::Hidden]);
}

#[test]
fn test_closed_observers_are_pruned() {
    let registry = started_registry("g");
    let (tx, rx) = mpsc::channel::<Event>();
    let (kept_tx, kept_rx) = mpsc::channel();
    registry.subscribe("g", "bob", Box::new(tx)).unwrap();
    let kept = registry.subscribe("g", "ann", Box::new(kept_tx)).unwrap();
    drop(rx);

    let deploy = Action::Deploy { player: "ann".into(), deployments: Default::default() };
    registry.submit("g", &deploy).unwrap();
    let game = registry.game("g").unwrap();
    assert_eq!(game.observer_count(), 1);
    assert_eq!(drain(&kept_rx).len(), 3);

    assert!(registry.unsubscribe("g", kept).unwrap());
    assert!(!registry.unsubscribe("g", kept).unwrap());
    assert_eq!(game.observer_count(), 0);
}

#[test]
fn test_games_run_concurrently() {
    let registry = Arc::new(Registry::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let id = format!("g{i}");
                let rng = ScriptedRandom::new(i);
                registry.create_game(&id, "tidewater", Rules::default(), Box::new(rng)).unwrap();
                for p in ["ann", "bob", "cat"] {
                    registry.submit(&id, &join(p)).unwrap();
                }
                registry.submit(&id, &Action::Start { player: "ann".into() }).unwrap();
                registry.view(&id, "ann").unwrap()
            })
        })
        .collect();

    for handle in handles {
        let view = handle.join().unwrap();
        assert!(matches!(view.phase, Phase::Deploy { .. }));
        assert_eq!(view.territories.len(), 12);
    }
    assert_eq!(registry.game_ids().len(), 4);
}
