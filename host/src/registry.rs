// ═══════════════════════════════════════════════════════════════════════
// Registry — concurrent hosting of independent games
//
// Locking:
//   The registry map sits behind an RwLock and hands out Arc<HostedGame>.
//   Each hosted game owns a Mutex around its Game and observer list.
//   An action is applied and its events fanned out under that one lock,
//   so observers never see events out of order with respect to reads
//   of the state. Games share nothing mutable with each other.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::HostError;
use crate::observer::{EventSink, Observer, ObserverId};
use conquest_engine::map::{self, MapDef};
use conquest_engine::visibility::{redact_event, GameView};
use conquest_engine::{Action, Event, Game, GameError, RandomSource, Rules};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub type GameId = String;

// ── Hosted game ────────────────────────────────────────────────────────

struct Session {
    game: Game,
    observers: Vec<Observer>,
    next_observer: ObserverId,
}

/// One game plus the observers watching it.
pub struct HostedGame {
    id: GameId,
    session: Mutex<Session>,
}

impl HostedGame {
    fn new(id: &str, game: Game) -> Self {
        HostedGame {
            id: id.to_string(),
            session: Mutex::new(Session { game, observers: Vec::new(), next_observer: 1 }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Apply an action and fan its events out to every observer. Returns
    /// the events as the acting player may see them.
    pub fn submit(&self, action: &Action) -> Result<Vec<Event>, GameError> {
        let mut session = self.session.lock();
        let events = match session.game.apply(action) {
            Ok(events) => events,
            Err(err) => {
                debug!(game = %self.id, player = action.player(), action = action.kind(), %err, "action rejected");
                return Err(err);
            }
        };

        session.observers.retain(|observer| match observer.deliver_all(&events) {
            Ok(()) => true,
            Err(_) => {
                warn!(game = %self.id, observer = observer.id, viewer = %observer.viewer, "observer dropped");
                false
            }
        });

        Ok(events.iter().map(|e| redact_event(e, action.player())).collect())
    }

    /// The current state as `viewer` may see it.
    pub fn view(&self, viewer: &str) -> GameView {
        self.session.lock().game.view(viewer)
    }

    /// Run `f` against the game while holding its lock.
    pub fn with_game<R>(&self, f: impl FnOnce(&Game) -> R) -> R {
        f(&self.session.lock().game)
    }

    pub fn subscribe(&self, viewer: &str, sink: Box<dyn EventSink>) -> ObserverId {
        let mut session = self.session.lock();
        let id = session.next_observer;
        session.next_observer += 1;
        session.observers.push(Observer::new(id, viewer, sink));
        debug!(game = %self.id, observer = id, viewer, "observer subscribed");
        id
    }

    /// Returns false if no observer had that id.
    pub fn unsubscribe(&self, observer: ObserverId) -> bool {
        let mut session = self.session.lock();
        let before = session.observers.len();
        session.observers.retain(|o| o.id != observer);
        session.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.session.lock().observers.len()
    }
}

impl std::fmt::Debug for HostedGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedGame").field("id", &self.id).finish_non_exhaustive()
    }
}

// ── Registry ───────────────────────────────────────────────────────────

/// Games by id, plus the maps they can be created on.
pub struct Registry {
    games: RwLock<HashMap<GameId, Arc<HostedGame>>>,
    maps: RwLock<HashMap<String, Arc<MapDef>>>,
}

impl Registry {
    /// An empty registry that knows the built-in maps.
    pub fn new() -> Self {
        let registry = Registry { games: RwLock::new(HashMap::new()), maps: RwLock::new(HashMap::new()) };
        for name in map::BUILTIN_MAPS {
            match map::builtin(name) {
                Ok(m) => {
                    registry.register_map(m);
                }
                Err(err) => warn!(map = name, %err, "built-in map failed to load"),
            }
        }
        registry
    }

    /// Make a map available to new games, replacing any map of that name.
    pub fn register_map(&self, map: MapDef) -> Arc<MapDef> {
        let map = Arc::new(map);
        self.maps.write().insert(map.name.clone(), Arc::clone(&map));
        map
    }

    pub fn load_map_json(&self, json: &str) -> Result<Arc<MapDef>, HostError> {
        Ok(self.register_map(MapDef::from_json(json)?))
    }

    pub fn map(&self, name: &str) -> Result<Arc<MapDef>, HostError> {
        self.maps
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| HostError::UnknownMap(name.to_string()))
    }

    /// Sorted map names.
    pub fn map_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.maps.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn create_game(
        &self,
        id: &str,
        map: &str,
        rules: Rules,
        rng: Box<dyn RandomSource>,
    ) -> Result<Arc<HostedGame>, HostError> {
        let map = self.map(map)?;
        let mut games = self.games.write();
        if games.contains_key(id) {
            return Err(HostError::DuplicateGame(id.to_string()));
        }
        let hosted = Arc::new(HostedGame::new(id, Game::new(Arc::clone(&map), rules, rng)));
        games.insert(id.to_string(), Arc::clone(&hosted));
        info!(game = id, map = %map.name, "game created");
        Ok(hosted)
    }

    pub fn remove_game(&self, id: &str) -> Result<Arc<HostedGame>, HostError> {
        let removed = self.games.write().remove(id);
        removed.ok_or_else(|| HostError::UnknownGame(id.to_string()))
    }

    pub fn game(&self, id: &str) -> Result<Arc<HostedGame>, HostError> {
        self.games
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| HostError::UnknownGame(id.to_string()))
    }

    /// Sorted game ids.
    pub fn game_ids(&self) -> Vec<GameId> {
        let mut ids: Vec<GameId> = self.games.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    // The registry lock is released before the game lock is taken.

    pub fn submit(&self, id: &str, action: &Action) -> Result<Vec<Event>, HostError> {
        Ok(self.game(id)?.submit(action)?)
    }

    pub fn view(&self, id: &str, viewer: &str) -> Result<GameView, HostError> {
        Ok(self.game(id)?.view(viewer))
    }

    pub fn subscribe(&self, id: &str, viewer: &str, sink: Box<dyn EventSink>) -> Result<ObserverId, HostError> {
        Ok(self.game(id)?.subscribe(viewer, sink))
    }

    pub fn unsubscribe(&self, id: &str, observer: ObserverId) -> Result<bool, HostError> {
        Ok(self.game(id)?.unsubscribe(observer))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
