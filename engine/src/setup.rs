// ═══════════════════════════════════════════════════════════════════════
// Game setup — lobby joins and the initial deal
// ═══════════════════════════════════════════════════════════════════════

use crate::error::GameError;
use crate::events::Event;
use crate::map::MapDef;
use crate::random::RandomSource;
use crate::spoils::SpoilsPool;
use crate::stats;
use crate::types::*;
use crate::visibility::full_view;
use tracing::info;

/// Add a player to the lobby with the next unused color.
pub fn join(state: &mut GameState, player: &str) -> Result<Vec<Event>, GameError> {
    if state.player(player).is_some() {
        return Err(GameError::DuplicatePlayer(player.to_string()));
    }
    let color = PLAYER_COLORS
        .iter()
        .find(|&&c| state.players.iter().all(|p| p.color != c))
        .ok_or(GameError::GameFull)?;

    state.players.push(Player::new(player, color));
    if state.active_player.is_empty() {
        state.active_player = player.to_string();
    }
    info!(player, color, "player joined");
    Ok(vec![Event::PlayerJoined { player: player.to_string(), color: color.to_string() }])
}

/// Deal the map out and begin the first turn. Only the admin may start.
pub fn start(
    state: &mut GameState,
    map: &MapDef,
    rules: &Rules,
    rng: &mut dyn RandomSource,
    player: &str,
) -> Result<Vec<Event>, GameError> {
    if state.admin() != Some(player) {
        return Err(GameError::NotAdmin);
    }
    let needed = rules.min_players.max(2);
    if state.players.len() < needed {
        return Err(GameError::NotEnoughPlayers(needed));
    }
    if map.len() < state.players.len() {
        return Err(GameError::MapTooSmall(map.len()));
    }

    state.spoils_pool = SpoilsPool::seed(map);
    initial_deploy(state, map, rules, rng);
    stats::recompute(state, map);

    let first = rng.pick(state.players.len());
    let active = &state.players[first];
    state.active_player = active.name.clone();
    state.phase = Phase::Deploy { reinforcements: active.reinforcements };

    info!(
        map = %map.name,
        players = state.players.len(),
        first = %state.active_player,
        "game started"
    );
    Ok(vec![Event::Snapshot { state: Box::new(full_view(state)) }])
}

/// Shuffle the territories and hand them out round-robin.
fn initial_deploy(state: &mut GameState, map: &MapDef, rules: &Rules, rng: &mut dyn RandomSource) {
    let mut names: Vec<String> = map.territory_names().map(str::to_string).collect();
    rng.shuffle(&mut names);

    let player_count = state.players.len();
    state.territories = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let territory = TerritoryState {
                owner: state.players[idx % player_count].name.clone(),
                troops: rules.initial_troops.max(1),
            };
            (name, territory)
        })
        .collect();
}
