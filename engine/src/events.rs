// ═══════════════════════════════════════════════════════════════════════
// Events — the ordered record produced by every applied action
//
// Events are built canonical (every hand visible). Observers never see
// them raw: `visibility::redact_event` is applied per viewer on delivery.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::*;
use crate::visibility::{GameView, HandCard};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    PlayerJoined {
        player: String,
        color: String,
    },
    /// Full state, sent when the game starts.
    Snapshot {
        state: Box<GameView>,
    },
    SpoilsTraded {
        player: String,
        spoils: Vec<Spoil>,
        bonus: u32,
    },
    /// Also used for the implicit deploys of a spoils trade.
    Deploy {
        player: String,
        deployments: BTreeMap<String, u32>,
    },
    Attack {
        player: String,
        from: String,
        to: String,
        defender: String,
        attacker_dice: Vec<u8>,
        defender_dice: Vec<u8>,
        attacker_losses: u32,
        defender_losses: u32,
        conquered: bool,
    },
    Advance {
        player: String,
        from: String,
        to: String,
        troops: u32,
    },
    Reinforce {
        player: String,
        from: String,
        to: String,
        troops: u32,
    },
    PhaseChanged {
        old_player: String,
        new_player: String,
        old_phase: Phase,
        new_phase: Phase,
    },
    StatsChanged {
        updates: BTreeMap<String, StatsUpdate>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsUpdate {
    pub territories: u32,
    pub troops: u32,
    pub reinforcements: u32,
    pub eliminated: bool,
    pub spoils: Vec<HandCard>,
}

/// Current totals for every player.
pub fn stats_changed(state: &GameState) -> Event {
    let updates = state
        .players
        .iter()
        .map(|p| {
            let update = StatsUpdate {
                territories: p.territories,
                troops: p.troops,
                reinforcements: p.reinforcements,
                eliminated: p.eliminated,
                spoils: p.spoils.iter().cloned().map(HandCard::Known).collect(),
            };
            (p.name.clone(), update)
        })
        .collect();
    Event::StatsChanged { updates }
}

/// Transition from `old_player`/`old_phase` to the state's current ones.
pub fn phase_changed(old_player: &str, old_phase: Phase, state: &GameState) -> Event {
    Event::PhaseChanged {
        old_player: old_player.to_string(),
        new_player: state.active_player.clone(),
        old_phase,
        new_phase: state.phase.clone(),
    }
}
