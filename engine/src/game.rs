// ═══════════════════════════════════════════════════════════════════════
// Game — one table: state, its map, its rules and its random source
// ═══════════════════════════════════════════════════════════════════════

use crate::engine::{self, Action};
use crate::error::GameError;
use crate::events::Event;
use crate::map::MapDef;
use crate::random::RandomSource;
use crate::types::{GameState, Rules};
use crate::visibility::{player_view, GameView};
use std::sync::Arc;

/// Single-threaded game instance. Callers serialize access to it.
pub struct Game {
    state: GameState,
    map: Arc<MapDef>,
    rules: Rules,
    rng: Box<dyn RandomSource>,
}

impl Game {
    pub fn new(map: Arc<MapDef>, rules: Rules, rng: Box<dyn RandomSource>) -> Self {
        Game { state: GameState::new(&map.name), map, rules, rng }
    }

    /// Apply an action, returning its canonical (unredacted) events.
    pub fn apply(&mut self, action: &Action) -> Result<Vec<Event>, GameError> {
        engine::apply_action(&mut self.state, &self.map, &self.rules, self.rng.as_mut(), action)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn map(&self) -> &MapDef {
        &self.map
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// The state as `viewer` may see it. Side-effect free.
    pub fn view(&self, viewer: &str) -> GameView {
        player_view(&self.state, viewer)
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("map", &self.map.name)
            .field("phase", &self.state.phase)
            .field("active_player", &self.state.active_player)
            .finish()
    }
}
