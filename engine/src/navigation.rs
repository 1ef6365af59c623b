// ═══════════════════════════════════════════════════════════════════════
// Navigation — reachability through a player's own territory
// ═══════════════════════════════════════════════════════════════════════

use crate::map::MapDef;
use crate::types::GameState;
use std::collections::{HashSet, VecDeque};

/// Whether `to` can be reached from `from` by stepping only through
/// territories owned by `player`. Both ends must be owned by `player`.
pub fn is_connected(map: &MapDef, state: &GameState, from: &str, to: &str, player: &str) -> bool {
    if state.owner_of(from) != Some(player) || state.owner_of(to) != Some(player) {
        return false;
    }
    owned_component(map, state, from, player).contains(to)
}

/// Every owned territory reachable from `from`, `from` included.
/// Empty when `from` is not owned by `player`.
fn owned_component<'a>(
    map: &'a MapDef,
    state: &GameState,
    from: &'a str,
    player: &str,
) -> HashSet<&'a str> {
    let mut visited: HashSet<&str> = HashSet::new();
    if state.owner_of(from) != Some(player) {
        return visited;
    }
    let mut queue: VecDeque<&str> = VecDeque::new();
    visited.insert(from);
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        for next in map.neighbours(current) {
            if visited.contains(next.as_str()) {
                continue;
            }
            if state.owner_of(next) == Some(player) {
                visited.insert(next.as_str());
                queue.push_back(next.as_str());
            }
        }
    }
    visited
}

/// Territories `player` may move troops to from `from` during reinforce.
pub fn reinforce_targets(map: &MapDef, state: &GameState, from: &str, player: &str) -> Vec<String> {
    let component = owned_component(map, state, from, player);
    map.territory_names()
        .filter(|&t| t != from && component.contains(t))
        .map(str::to_string)
        .collect()
}

/// Enemy territories adjacent to `from`. Empty unless `from` is owned by
/// `player` and can spare an attacking troop.
pub fn attack_targets(map: &MapDef, state: &GameState, from: &str, player: &str) -> Vec<String> {
    match state.territory(from) {
        Some(t) if t.owner == player && t.troops > 1 => map
            .neighbours(from)
            .iter()
            .filter(|n| state.owner_of(n).is_some_and(|owner| owner != player))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}
