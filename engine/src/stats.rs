// ═══════════════════════════════════════════════════════════════════════
// Stats — per-player totals, reinforcements and elimination, always
// rebuilt from the ownership map rather than patched.
// ═══════════════════════════════════════════════════════════════════════

use crate::map::MapDef;
use crate::types::GameState;
use std::collections::HashMap;

/// Floor on the per-turn reinforcement allotment.
pub const MIN_REINFORCEMENTS: u32 = 3;

/// `max(3, territories / 3)` plus every region bonus fully held.
pub fn reinforcement_allotment(map: &MapDef, state: &GameState, player: &str, territories: u32) -> u32 {
    let base = (territories / 3).max(MIN_REINFORCEMENTS);
    let bonus: u32 = map
        .regions_held_by(|t| state.owner_of(t) == Some(player))
        .map(|r| r.bonus)
        .sum();
    base + bonus
}

/// Rebuild every player's totals and elimination flag. Returns the winner
/// when exactly one player is left standing.
pub fn recompute(state: &mut GameState, map: &MapDef) -> Option<String> {
    let mut counts: HashMap<&str, (u32, u32)> = HashMap::new();
    for territory in state.territories.values() {
        let entry = counts.entry(territory.owner.as_str()).or_default();
        // Deploys and moves reject overflow, so per-player totals fit.
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(territory.troops);
    }

    let totals: Vec<(u32, u32, u32)> = state
        .players
        .iter()
        .map(|p| {
            let (territories, troops) = counts.get(p.name.as_str()).copied().unwrap_or_default();
            let reinforcements = reinforcement_allotment(map, state, &p.name, territories);
            (territories, troops, reinforcements)
        })
        .collect();

    for (player, (territories, troops, reinforcements)) in state.players.iter_mut().zip(totals) {
        player.territories = territories;
        player.troops = troops;
        player.reinforcements = reinforcements;
        if territories == 0 {
            player.eliminated = true;
        }
    }

    sole_survivor(state)
}

/// The only non-eliminated player, if exactly one remains.
pub fn sole_survivor(state: &GameState) -> Option<String> {
    let mut alive = state.players.iter().filter(|p| !p.eliminated);
    match (alive.next(), alive.next()) {
        (Some(p), None) => Some(p.name.clone()),
        _ => None,
    }
}
