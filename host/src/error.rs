// ═══════════════════════════════════════════════════════════════════════
// Host errors — registry lookups plus rejected actions
// ═══════════════════════════════════════════════════════════════════════

use conquest_engine::{GameError, MapError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("no game with id '{0}'")]
    UnknownGame(String),

    #[error("no map named '{0}'")]
    UnknownMap(String),

    #[error("a game with id '{0}' already exists")]
    DuplicateGame(String),

    #[error("action rejected: {0}")]
    Rejected(#[from] GameError),

    #[error(transparent)]
    Map(#[from] MapError),
}
