use thiserror::Error;

use crate::tile::Tile;

/// Errors raised by the match engine.
///
/// Everything here except [`EngineError::NotTenpai`] signals a broken
/// invariant: a malformed input, a buggy strategy, or a corrupted action
/// stream. Callers should abort the current operation rather than retry.
/// `NotTenpai` is a domain-expected negative answer and safe to recover from.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("malformed tile text: {0:?}")]
    MalformedTile(String),

    #[error("{0} tiles in use; a head position cannot exist")]
    InvalidHandSize(usize),

    #[error("hand is not tenpai")]
    NotTenpai,

    #[error("tile {0} not in hand")]
    TileNotInHand(Tile),

    #[error("no pon meld of {0} to extend")]
    MeldNotFound(Tile),

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("concealed tile in a view that should show it")]
    ConcealedTile,

    #[error("wall exhausted")]
    WallExhausted,

    #[error("bad action encoding: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
