// ═══════════════════════════════════════════════════════════════════════
// Game Engine — phase state machine and action handlers
//
// Architecture:
//   The engine is a pure state machine. It never does I/O and never
//   blocks. Each call to `apply_action()` validates the action against
//   the current phase and active player, mutates the state, recomputes
//   derived stats and returns the ordered events describing the change.
//
// Atomicity:
//   Handlers validate everything before the first mutation. A rejected
//   action returns an error and leaves the state untouched.
//
// Flow of a turn:
//   [Spoils] → Deploy → Attack ⇄ Advance → Reinforce → next player
// ═══════════════════════════════════════════════════════════════════════

use crate::combat;
use crate::error::GameError;
use crate::events::{phase_changed, stats_changed, Event};
use crate::map::MapDef;
use crate::navigation;
use crate::random::RandomSource;
use crate::setup;
use crate::spoils;
use crate::stats;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Actions players submit. Every action names the acting player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Join { player: String },
    Start { player: String },
    /// Spoils are named by territory. An empty list skips the trade.
    TradeSpoils { player: String, spoils: Vec<String> },
    Deploy { player: String, deployments: BTreeMap<String, u32> },
    Attack { player: String, from: String, to: String },
    EndAttack { player: String },
    Advance { player: String, from: String, to: String, troops: u32 },
    Reinforce { player: String, from: String, to: String, troops: u32 },
    EndReinforce { player: String },
}

impl Action {
    pub fn player(&self) -> &str {
        match self {
            Action::Join { player }
            | Action::Start { player }
            | Action::TradeSpoils { player, .. }
            | Action::Deploy { player, .. }
            | Action::Attack { player, .. }
            | Action::EndAttack { player }
            | Action::Advance { player, .. }
            | Action::Reinforce { player, .. }
            | Action::EndReinforce { player } => player,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Action::Join { .. } => "join",
            Action::Start { .. } => "start",
            Action::TradeSpoils { .. } => "trade_spoils",
            Action::Deploy { .. } => "deploy",
            Action::Attack { .. } => "attack",
            Action::EndAttack { .. } => "end_attack",
            Action::Advance { .. } => "advance",
            Action::Reinforce { .. } => "reinforce",
            Action::EndReinforce { .. } => "end_reinforce",
        }
    }
}

/// Apply one action. Dispatch depends only on the current phase and the
/// action kind.
pub fn apply_action(
    state: &mut GameState,
    map: &MapDef,
    rules: &Rules,
    rng: &mut dyn RandomSource,
    action: &Action,
) -> Result<Vec<Event>, GameError> {
    let phase = state.phase.clone();
    debug!(player = action.player(), action = action.kind(), phase = phase.name(), "applying action");

    match (&phase, action) {
        (Phase::Lobby, Action::Join { player }) => return setup::join(state, player),
        (Phase::Lobby, Action::Start { player }) => return setup::start(state, map, rules, rng, player),
        (Phase::Lobby, _) => return Err(GameError::NotStarted),
        (Phase::GameOver { .. }, _) => return Err(GameError::GameFinished),
        (_, Action::Join { .. } | Action::Start { .. }) => return Err(GameError::AlreadyStarted),
        _ => {}
    }

    if action.player() != state.active_player {
        return Err(GameError::NotYourTurn);
    }

    match (phase, action) {
        (Phase::Spoils { mandatory }, Action::TradeSpoils { player, spoils }) => {
            trade_spoils(state, rules, player, mandatory, spoils)
        }
        (Phase::Deploy { reinforcements }, Action::Deploy { player, deployments }) => {
            deploy(state, rules, player, reinforcements, deployments)
        }
        (Phase::Attack { .. }, Action::Attack { player, from, to }) => {
            attack(state, map, rng, player, from, to)
        }
        (Phase::Attack { just_conquered }, Action::EndAttack { player }) => {
            end_attack(state, player, just_conquered)
        }
        (Phase::Advance { from, to }, Action::Advance { player, from: f, to: t, troops }) => {
            if *f != from || *t != to {
                return Err(GameError::AdvanceMismatch { from, to });
            }
            advance(state, player, f, t, *troops)
        }
        (Phase::Reinforce { just_conquered }, Action::Reinforce { player, from, to, troops }) => {
            reinforce(state, map, rules, rng, player, just_conquered, from, to, *troops)
        }
        (Phase::Reinforce { just_conquered }, Action::EndReinforce { player }) => {
            let mut events = Vec::new();
            end_turn(state, rules, rng, player, just_conquered, &mut events);
            Ok(events)
        }
        (phase, _) => Err(GameError::WrongPhase(phase.name())),
    }
}

// ── Spoils ─────────────────────────────────────────────────────────────

fn trade_spoils(
    state: &mut GameState,
    rules: &Rules,
    player: &str,
    mandatory: bool,
    names: &[String],
) -> Result<Vec<Event>, GameError> {
    let hand = &player_ref(state, player)?.spoils;

    if names.is_empty() {
        if mandatory {
            return Err(GameError::InvalidSpoils("a trade is required with a full hand"));
        }
        let old_phase = state.phase.clone();
        state.phase = Phase::Deploy { reinforcements: player_ref(state, player)?.reinforcements };
        return Ok(vec![phase_changed(player, old_phase, state)]);
    }

    if names.len() != 3 {
        return Err(GameError::InvalidSpoils("exactly three spoils must be traded"));
    }
    if names.iter().collect::<HashSet<_>>().len() != names.len() {
        return Err(GameError::InvalidSpoils("the same spoil was named twice"));
    }
    let traded: Vec<Spoil> = names
        .iter()
        .map(|n| hand.iter().find(|s| s.territory == *n).cloned())
        .collect::<Option<_>>()
        .ok_or(GameError::InvalidSpoils("spoil is not in your hand"))?;
    let colors: Vec<SpoilColor> = traded.iter().map(|s| s.color).collect();
    let bonus = spoils::trade_bonus(&colors)
        .ok_or(GameError::InvalidSpoils("spoils do not form a set"))?;
    let deployments: BTreeMap<String, u32> = traded
        .iter()
        .filter(|s| state.owner_of(&s.territory) == Some(player))
        .map(|s| (s.territory.clone(), rules.owned_spoil_bonus))
        .collect();
    let planned = plan_deploy(state, player, &deployments)?;

    // Validated; mutate from here on.

    for spoil in &traded {
        if let Some(p) = state.player_mut(player) {
            p.spoils.retain(|s| s.territory != spoil.territory);
        }
        state.spoils_pool.give_back(spoil.clone());
    }
    apply_deploy(state, player, planned);

    let base = player_ref(state, player)?.reinforcements;
    let old_phase = state.phase.clone();
    state.phase = Phase::Deploy { reinforcements: base + bonus };
    info!(player, bonus, "spoils traded");

    let mut events = vec![Event::SpoilsTraded { player: player.to_string(), spoils: traded, bonus }];
    if !deployments.is_empty() {
        events.push(Event::Deploy { player: player.to_string(), deployments });
    }
    events.push(stats_changed(state));
    events.push(phase_changed(player, old_phase, state));
    Ok(events)
}

// ── Deploy ─────────────────────────────────────────────────────────────

fn deploy(
    state: &mut GameState,
    rules: &Rules,
    player: &str,
    reinforcements: u32,
    deployments: &BTreeMap<String, u32>,
) -> Result<Vec<Event>, GameError> {
    for territory in deployments.keys() {
        require_owned(state, territory, player)?;
    }
    if rules.enforce_deploy_budget {
        let actual: u64 = deployments.values().map(|&n| u64::from(n)).sum();
        if actual != u64::from(reinforcements) {
            return Err(GameError::DeployBudget {
                expected: reinforcements,
                actual: u32::try_from(actual).unwrap_or(u32::MAX),
            });
        }
    }
    let planned = plan_deploy(state, player, deployments)?;

    apply_deploy(state, player, planned);

    let old_phase = state.phase.clone();
    state.phase = Phase::Attack { just_conquered: false };
    Ok(vec![
        Event::Deploy { player: player.to_string(), deployments: deployments.clone() },
        stats_changed(state),
        phase_changed(player, old_phase, state),
    ])
}

// ── Attack ─────────────────────────────────────────────────────────────

fn attack(
    state: &mut GameState,
    map: &MapDef,
    rng: &mut dyn RandomSource,
    player: &str,
    from: &str,
    to: &str,
) -> Result<Vec<Event>, GameError> {
    let from_troops = require_owned(state, from, player)?.troops;
    let target = territory_ref(state, to)?;
    if target.owner == player {
        return Err(GameError::NotOwner(to.to_string()));
    }
    let (defender, to_troops) = (target.owner.clone(), target.troops);
    if from_troops <= 1 {
        return Err(GameError::InsufficientTroops(from.to_string()));
    }
    if !map.is_adjacent(from, to) {
        return Err(GameError::NotAdjacent { from: from.to_string(), to: to.to_string() });
    }

    let outcome = combat::resolve(rng, from_troops, to_troops);
    let conquered = outcome.defender_losses >= to_troops;

    set_troops(state, from, from_troops - outcome.attacker_losses);
    set_troops(state, to, to_troops.saturating_sub(outcome.defender_losses));
    if let Some(p) = state.player_mut(player) {
        p.troops -= outcome.attacker_losses;
    }
    if let Some(p) = state.player_mut(&defender) {
        p.troops = p.troops.saturating_sub(outcome.defender_losses);
    }

    let mut events = vec![Event::Attack {
        player: player.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        defender: defender.clone(),
        attacker_dice: outcome.attacker_dice,
        defender_dice: outcome.defender_dice,
        attacker_losses: outcome.attacker_losses,
        defender_losses: outcome.defender_losses,
        conquered,
    }];

    if !conquered {
        events.push(stats_changed(state));
        return Ok(events);
    }

    // Conquest: one troop marches in, then everything is recounted.
    if let Some(t) = state.territories.get_mut(to) {
        t.owner = player.to_string();
        t.troops = 1;
    }
    if let Some(t) = state.territories.get_mut(from) {
        t.troops -= 1;
    }
    let winner = stats::recompute(state, map);
    info!(player, from, to, "territory conquered");
    if state.player(&defender).is_some_and(|p| p.eliminated) {
        info!(player = %defender, by = player, "player eliminated");
    }

    let old_phase = state.phase.clone();
    state.phase = match winner {
        Some(winner) => {
            info!(winner = %winner, "game over");
            Phase::GameOver { winner }
        }
        None => Phase::Advance { from: from.to_string(), to: to.to_string() },
    };
    events.push(stats_changed(state));
    events.push(phase_changed(player, old_phase, state));
    Ok(events)
}

fn end_attack(state: &mut GameState, player: &str, just_conquered: bool) -> Result<Vec<Event>, GameError> {
    let old_phase = state.phase.clone();
    state.phase = Phase::Reinforce { just_conquered };
    Ok(vec![phase_changed(player, old_phase, state)])
}

// ── Advance ────────────────────────────────────────────────────────────

fn advance(state: &mut GameState, player: &str, from: &str, to: &str, troops: u32) -> Result<Vec<Event>, GameError> {
    let from_troops = require_owned(state, from, player)?.troops;
    require_owned(state, to, player)?;
    if troops >= from_troops {
        return Err(GameError::InsufficientTroops(from.to_string()));
    }
    let planned = plan_move(state, from, to, troops)?;

    apply_move(state, from, to, planned);

    let old_phase = state.phase.clone();
    state.phase = Phase::Attack { just_conquered: true };
    Ok(vec![
        Event::Advance { player: player.to_string(), from: from.to_string(), to: to.to_string(), troops },
        phase_changed(player, old_phase, state),
    ])
}

// ── Reinforce ──────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn reinforce(
    state: &mut GameState,
    map: &MapDef,
    rules: &Rules,
    rng: &mut dyn RandomSource,
    player: &str,
    just_conquered: bool,
    from: &str,
    to: &str,
    troops: u32,
) -> Result<Vec<Event>, GameError> {
    let from_troops = require_owned(state, from, player)?.troops;
    require_owned(state, to, player)?;
    if troops >= from_troops {
        return Err(GameError::InsufficientTroops(from.to_string()));
    }
    if !navigation::is_connected(map, state, from, to, player) {
        return Err(GameError::NotConnected { from: from.to_string(), to: to.to_string() });
    }
    let planned = plan_move(state, from, to, troops)?;

    apply_move(state, from, to, planned);

    let mut events = vec![Event::Reinforce {
        player: player.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        troops,
    }];
    end_turn(state, rules, rng, player, just_conquered, &mut events);
    Ok(events)
}

/// Award the conquest spoil, then pass the turn to the next survivor.
fn end_turn(
    state: &mut GameState,
    rules: &Rules,
    rng: &mut dyn RandomSource,
    player: &str,
    just_conquered: bool,
    events: &mut Vec<Event>,
) {
    if just_conquered {
        match state.spoils_pool.take_random(rng) {
            Some(spoil) => {
                debug!(player, territory = %spoil.territory, "spoil drawn");
                if let Some(p) = state.player_mut(player) {
                    p.spoils.push(spoil);
                }
            }
            None => warn!(player, "spoils pool is empty, no spoil awarded"),
        }
        events.push(stats_changed(state));
    }

    let Some(next) = next_player(state) else {
        unreachable!("turn rotation found no surviving player");
    };
    let old_phase = state.phase.clone();
    state.phase = turn_start_phase(state, rules, &next);
    state.active_player = next;
    events.push(phase_changed(player, old_phase, state));
}

/// The next non-eliminated player after the active one, in roster order.
pub fn next_player(state: &GameState) -> Option<String> {
    let count = state.players.len();
    let current = state.players.iter().position(|p| p.name == state.active_player)?;
    (1..=count)
        .map(|step| &state.players[(current + step) % count])
        .find(|p| !p.eliminated)
        .map(|p| p.name.clone())
}

/// Spoils if the player can trade, otherwise straight to Deploy.
fn turn_start_phase(state: &GameState, rules: &Rules, player: &str) -> Phase {
    match state.player(player) {
        Some(p) if spoils::has_tradeable_set(&p.spoils) => Phase::Spoils {
            mandatory: p.spoils.len() >= rules.mandatory_trade_hand,
        },
        Some(p) => Phase::Deploy { reinforcements: p.reinforcements },
        None => Phase::Deploy { reinforcements: stats::MIN_REINFORCEMENTS },
    }
}

// ── Helpers ────────────────────────────────────────────────────────────

fn player_ref<'a>(state: &'a GameState, player: &str) -> Result<&'a Player, GameError> {
    state.player(player).ok_or(GameError::NotYourTurn)
}

fn territory_ref<'a>(state: &'a GameState, name: &str) -> Result<&'a TerritoryState, GameError> {
    state.territory(name).ok_or_else(|| GameError::UnknownTerritory(name.to_string()))
}

fn require_owned<'a>(state: &'a GameState, name: &str, player: &str) -> Result<&'a TerritoryState, GameError> {
    let territory = territory_ref(state, name)?;
    if territory.owner != player {
        return Err(GameError::NotOwner(name.to_string()));
    }
    Ok(territory)
}

fn set_troops(state: &mut GameState, name: &str, troops: u32) {
    if let Some(t) = state.territories.get_mut(name) {
        t.troops = troops;
    }
}

/// Territory and player totals after a deployment, checked for overflow
/// before anything is written.
struct PlannedDeploy {
    territories: Vec<(String, u32)>,
    player_troops: u32,
}

fn plan_deploy(
    state: &GameState,
    player: &str,
    deployments: &BTreeMap<String, u32>,
) -> Result<PlannedDeploy, GameError> {
    let mut player_troops = player_ref(state, player)?.troops;
    let mut territories = Vec::with_capacity(deployments.len());
    for (name, &troops) in deployments {
        let current = territory_ref(state, name)?.troops;
        let overflow = || GameError::TroopOverflow(name.clone());
        territories.push((name.clone(), current.checked_add(troops).ok_or_else(overflow)?));
        player_troops = player_troops.checked_add(troops).ok_or_else(overflow)?;
    }
    Ok(PlannedDeploy { territories, player_troops })
}

fn apply_deploy(state: &mut GameState, player: &str, planned: PlannedDeploy) {
    for (name, troops) in planned.territories {
        set_troops(state, &name, troops);
    }
    if let Some(p) = state.player_mut(player) {
        p.troops = planned.player_troops;
    }
}

/// New counts for `from` and `to` after moving `troops` between them.
fn plan_move(state: &GameState, from: &str, to: &str, troops: u32) -> Result<(u32, u32), GameError> {
    let left = territory_ref(state, from)?
        .troops
        .checked_sub(troops)
        .ok_or_else(|| GameError::InsufficientTroops(from.to_string()))?;
    let arrived = territory_ref(state, to)?
        .troops
        .checked_add(troops)
        .ok_or_else(|| GameError::TroopOverflow(to.to_string()))?;
    Ok((left, arrived))
}

fn apply_move(state: &mut GameState, from: &str, to: &str, (left, arrived): (u32, u32)) {
    set_troops(state, from, left);
    set_troops(state, to, arrived);
}
