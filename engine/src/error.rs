// ═══════════════════════════════════════════════════════════════════════
// Errors — rejected actions and bad map data
// ═══════════════════════════════════════════════════════════════════════

use thiserror::Error;

/// Why an action was rejected. A rejected action never changes state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("action does not apply to the {0} phase")]
    WrongPhase(&'static str),

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("territory '{0}' does not exist")]
    UnknownTerritory(String),

    #[error("territory '{0}' is not owned by the right player")]
    NotOwner(String),

    #[error("territory '{to}' is not attackable from '{from}'")]
    NotAdjacent { from: String, to: String },

    #[error("territory '{to}' is not reachable from '{from}' through your territory")]
    NotConnected { from: String, to: String },

    #[error("not enough troops in territory '{0}'")]
    InsufficientTroops(String),

    #[error("too many troops for territory '{0}'")]
    TroopOverflow(String),

    #[error("invalid spoils: {0}")]
    InvalidSpoils(&'static str),

    #[error("game is already started")]
    AlreadyStarted,

    #[error("game has not been started")]
    NotStarted,

    #[error("game is over")]
    GameFinished,

    #[error("player '{0}' has already joined")]
    DuplicatePlayer(String),

    #[error("only the first player to join may start the game")]
    NotAdmin,

    #[error("game is full")]
    GameFull,

    #[error("at least {0} players are needed to start")]
    NotEnoughPlayers(usize),

    #[error("map has only {0} territories, fewer than the players")]
    MapTooSmall(usize),

    #[error("advance must move from '{from}' to '{to}'")]
    AdvanceMismatch { from: String, to: String },

    #[error("deployed {actual} troops, expected exactly {expected}")]
    DeployBudget { expected: u32, actual: u32 },
}

/// Problems found while loading or validating a map.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("map has no territories")]
    Empty,

    #[error("territory '{0}' is defined more than once")]
    DuplicateTerritory(String),

    #[error("territory '{territory}' lists unknown neighbour '{neighbour}'")]
    UnknownNeighbour { territory: String, neighbour: String },

    #[error("'{a}' lists '{b}' as a neighbour but not the other way round")]
    Asymmetric { a: String, b: String },

    #[error("region '{region}' names unknown territory '{territory}'")]
    UnknownRegionTerritory { region: String, territory: String },

    #[error("no built-in map named '{0}'")]
    UnknownMap(String),

    #[error("malformed map: {0}")]
    Parse(#[from] serde_json::Error),
}
