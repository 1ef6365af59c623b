pub mod types;
pub mod error;
pub mod map;
pub mod random;
pub mod combat;
pub mod spoils;
pub mod stats;
pub mod navigation;
pub mod setup;
pub mod events;
pub mod visibility;
pub mod engine;
pub mod invariants;
pub mod game;


pub use types::*;
pub use error::{GameError, MapError};
pub use engine::{apply_action, Action};
pub use events::Event;
pub use game::Game;
pub use map::MapDef;
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
