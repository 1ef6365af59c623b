// ═══════════════════════════════════════════════════════════════════════
// Invariants — bug detectors checked after every applied action in tests.
// They never trigger in a correctly implemented game.
// ═══════════════════════════════════════════════════════════════════════

use crate::map::MapDef;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check every state invariant. Lobby states trivially pass.
pub fn check_invariants(state: &GameState, map: &MapDef) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut violation = |message: String| violations.push(InvariantViolation { message });

    if !state.is_started() {
        return Vec::new();
    }

    if state.territories.len() != map.len() {
        violation(format!(
            "{} territories tracked, map has {}",
            state.territories.len(),
            map.len()
        ));
    }

    for (name, territory) in &state.territories {
        if !map.contains(name) {
            violation(format!("territory '{name}' is not on the map"));
        }
        if state.player(&territory.owner).is_none() {
            violation(format!("territory '{name}' owned by unknown player '{}'", territory.owner));
        }
        if territory.troops == 0 {
            violation(format!("territory '{name}' is owned but empty"));
        }
    }

    for player in &state.players {
        let troops: u64 = state
            .territories
            .values()
            .filter(|t| t.owner == player.name)
            .map(|t| u64::from(t.troops))
            .sum();
        if troops != u64::from(player.troops) {
            violation(format!(
                "player '{}' records {} troops but holds {troops}",
                player.name, player.troops
            ));
        }
    }

    match state.player(&state.active_player) {
        Some(p) if p.eliminated && state.winner().is_none() => {
            violation(format!("active player '{}' is eliminated", p.name));
        }
        None => violation(format!("active player '{}' is not on the roster", state.active_player)),
        _ => {}
    }

    if state.total_spoils() != map.len() {
        violation(format!(
            "{} spoils in circulation, expected {}",
            state.total_spoils(),
            map.len()
        ));
    }

    violations
}
