use thiserror::Error;

use crate::meld::Meld;
use crate::tile::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinKind {
    /// Won on the player's own draw.
    SelfDraw,
    /// Won on another seat's discard.
    Discard,
}

/// Everything the scoring collaborator needs to value a finished hand.
/// The engine fills this in at settlement; it never interprets the fields
/// itself.
#[derive(Debug, Clone)]
pub struct WinContext {
    /// Concealed tiles, excluding the winning tile.
    pub tehais: Vec<Tile>,
    pub furos: Vec<Meld>,
    /// The winning tile.
    pub taken: Tile,
    pub kind: WinKind,
    pub oya: bool,
    pub bakaze: Tile,
    pub jikaze: Tile,
    /// Bonus tiles indicated by the revealed markers.
    pub doras: Vec<Tile>,
    /// Bonus tiles under the markers, revealed only to a declared waiter.
    pub uradoras: Vec<Tile>,
    pub reach: bool,
    pub double_reach: bool,
    pub ippatsu: bool,
    /// Won on the replacement draw after a quad.
    pub rinshan: bool,
    /// Won on the last live-wall draw.
    pub haitei: bool,
    pub first_turn: bool,
    /// Won by robbing an added quad.
    pub chankan: bool,
}

/// A valued win. Payments are per-loser amounts for a self-draw win; a
/// discard win is paid in full by the discarder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinScore {
    pub fu: u32,
    pub fan: u32,
    pub points: i32,
    pub oya_payment: i32,
    pub ko_payment: i32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoreError {
    /// The tile configuration scores zero: the declaration is rejected,
    /// not settled.
    #[error("no qualifying hand pattern")]
    NoYaku,
}

/// The external scoring collaborator. Implementations turn a finished hand
/// plus context into a fu/fan/point verdict, or `NoYaku` when nothing
/// qualifies.
pub trait Scorer {
    fn score(&self, context: &WinContext) -> Result<WinScore, ScoreError>;
}
