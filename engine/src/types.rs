// ═══════════════════════════════════════════════════════════════════════
// Core types — phases, players, territories, spoils, game state
// ═══════════════════════════════════════════════════════════════════════

use crate::spoils::SpoilsPool;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Colors ─────────────────────────────────────────────────────────────

/// Player colors, handed out in join order. Also caps the roster size.
pub const PLAYER_COLORS: [&str; 6] = ["red", "blue", "green", "yellow", "purple", "orange"];

/// The three spoil categories. Spoils are colored cyclically in map order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpoilColor {
    Red,
    Green,
    Blue,
}

impl SpoilColor {
    pub const ALL: [SpoilColor; 3] = [SpoilColor::Red, SpoilColor::Green, SpoilColor::Blue];

    /// Bonus for trading three spoils of this color.
    pub fn set_bonus(self) -> u32 {
        match self {
            SpoilColor::Red => 4,
            SpoilColor::Green => 6,
            SpoilColor::Blue => 8,
        }
    }
}

impl std::fmt::Display for SpoilColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpoilColor::Red => write!(f, "red"),
            SpoilColor::Green => write!(f, "green"),
            SpoilColor::Blue => write!(f, "blue"),
        }
    }
}

// ── Spoil ──────────────────────────────────────────────────────────────

/// A tradeable card. Its identity is the territory it names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spoil {
    pub territory: String,
    pub color: SpoilColor,
}

// ── Phase ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    /// Trade-in window at the start of a turn. `mandatory` forbids skipping.
    Spoils { mandatory: bool },
    /// Allotment is informational unless `Rules::enforce_deploy_budget` is set.
    Deploy { reinforcements: u32 },
    Attack { just_conquered: bool },
    /// Only entered right after a conquest of `to` from `from`.
    Advance { from: String, to: String },
    Reinforce { just_conquered: bool },
    GameOver { winner: String },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Lobby => "lobby",
            Phase::Spoils { .. } => "spoils",
            Phase::Deploy { .. } => "deploy",
            Phase::Attack { .. } => "attack",
            Phase::Advance { .. } => "advance",
            Phase::Reinforce { .. } => "reinforce",
            Phase::GameOver { .. } => "game over",
        }
    }
}

// ── Player ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub color: String,
    pub eliminated: bool,
    // Derived totals, rewritten by the stats engine.
    pub reinforcements: u32,
    pub troops: u32,
    pub territories: u32,
    /// Hand of spoils (PRIVATE).
    pub spoils: Vec<Spoil>,
}

impl Player {
    pub fn new(name: &str, color: &str) -> Self {
        Player {
            name: name.to_string(),
            color: color.to_string(),
            eliminated: false,
            reinforcements: 0,
            troops: 0,
            territories: 0,
            spoils: Vec::new(),
        }
    }
}

// ── Territory (dynamic part) ───────────────────────────────────────────

/// Mutable per-territory state. Static adjacency lives in `MapDef`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryState {
    pub owner: String,
    pub troops: u32,
}

// ── Rules ──────────────────────────────────────────────────────────────

/// Tunable rules. Every field falls back to the standard value when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Troops placed on each territory at game start.
    pub initial_troops: u32,
    pub min_players: usize,
    /// Hand size at which a trade-in becomes mandatory.
    pub mandatory_trade_hand: usize,
    /// Troops added to an owned territory named by a traded spoil.
    pub owned_spoil_bonus: u32,
    /// Require deployments to sum exactly to the phase allotment.
    pub enforce_deploy_budget: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            initial_troops: 3,
            min_players: 2,
            mandatory_trade_hand: 5,
            owned_spoil_bonus: 2,
            enforce_deploy_budget: false,
        }
    }
}

// ── Game State ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: Phase,
    /// In the lobby this is the admin (first player to join).
    pub active_player: String,
    /// Join order. Never shrinks; elimination is a flag.
    pub players: Vec<Player>,
    pub territories: BTreeMap<String, TerritoryState>,
    pub map: String,
    /// Shared spoils pool (HIDDEN).
    pub spoils_pool: SpoilsPool,
}

impl GameState {
    pub fn new(map: &str) -> Self {
        GameState {
            phase: Phase::Lobby,
            active_player: String::new(),
            players: Vec::new(),
            territories: BTreeMap::new(),
            map: map.to_string(),
            spoils_pool: SpoilsPool::default(),
        }
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.name == name)
    }

    pub fn territory(&self, name: &str) -> Option<&TerritoryState> {
        self.territories.get(name)
    }

    pub fn owner_of(&self, name: &str) -> Option<&str> {
        self.territories.get(name).map(|t| t.owner.as_str())
    }

    /// The first player to join administers the lobby.
    pub fn admin(&self) -> Option<&str> {
        self.players.first().map(|p| p.name.as_str())
    }

    pub fn is_started(&self) -> bool {
        self.phase != Phase::Lobby
    }

    pub fn winner(&self) -> Option<&str> {
        match &self.phase {
            Phase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    /// Pool plus every hand. Constant once the game has started.
    pub fn total_spoils(&self) -> usize {
        self.spoils_pool.len() + self.players.iter().map(|p| p.spoils.len()).sum::<usize>()
    }
}
