// ═══════════════════════════════════════════════════════════════════════
// Visibility / Information Model
//
// Information is split between:
//   PUBLIC  — ownership and troops on every territory, per-player totals,
//             the size of every hand, the phase and the active player
//   PRIVATE — the identity (territory and color) of the spoils in your hand
//   HIDDEN  — the contents of the shared spoils pool
//
// The canonical state and event stream carry everything. This module
// produces the projection a given viewer is allowed to see. Spectators
// who are not on the roster see every hand as hidden.
// ═══════════════════════════════════════════════════════════════════════

use crate::events::Event;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One card in a hand, as seen by some viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandCard {
    Known(Spoil),
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub name: String,
    pub color: String,
    pub eliminated: bool,
    pub reinforcements: u32,
    pub troops: u32,
    pub territories: u32,
    /// Card count is public; identities only for the viewer's own hand.
    pub spoils: Vec<HandCard>,
}

/// The view of the game state a specific viewer is allowed to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    /// None for the canonical, unredacted view.
    pub viewer: Option<String>,
    pub phase: Phase,
    pub active_player: String,
    pub players: Vec<PlayerView>,
    pub territories: BTreeMap<String, TerritoryState>,
    pub map: String,
    /// Only the size of the pool is public.
    pub spoils_pool: usize,
}

/// Everything, unredacted. Used to build canonical snapshot events.
pub fn full_view(state: &GameState) -> GameView {
    GameView {
        viewer: None,
        phase: state.phase.clone(),
        active_player: state.active_player.clone(),
        players: state
            .players
            .iter()
            .map(|p| PlayerView {
                name: p.name.clone(),
                color: p.color.clone(),
                eliminated: p.eliminated,
                reinforcements: p.reinforcements,
                troops: p.troops,
                territories: p.territories,
                spoils: p.spoils.iter().cloned().map(HandCard::Known).collect(),
            })
            .collect(),
        territories: state.territories.clone(),
        map: state.map.clone(),
        spoils_pool: state.spoils_pool.len(),
    }
}

/// Build the view for a specific viewer.
pub fn player_view(state: &GameState, viewer: &str) -> GameView {
    redact_view(&full_view(state), viewer)
}

pub fn redact_view(view: &GameView, viewer: &str) -> GameView {
    let mut redacted = view.clone();
    redacted.viewer = Some(viewer.to_string());
    for player in &mut redacted.players {
        hide_unless_owner(&player.name, viewer, &mut player.spoils);
    }
    redacted
}

/// Project one event for a viewer. Only hand contents are ever hidden.
pub fn redact_event(event: &Event, viewer: &str) -> Event {
    match event {
        Event::Snapshot { state } => Event::Snapshot { state: Box::new(redact_view(state, viewer)) },
        Event::StatsChanged { updates } => {
            let mut updates = updates.clone();
            for (owner, update) in updates.iter_mut() {
                hide_unless_owner(owner, viewer, &mut update.spoils);
            }
            Event::StatsChanged { updates }
        }
        other => other.clone(),
    }
}

fn hide_unless_owner(owner: &str, viewer: &str, hand: &mut [HandCard]) {
    if owner != viewer {
        hand.iter_mut().for_each(|card| *card = HandCard::Hidden);
    }
}
