//! Four-player riichi mahjong match engine.
//!
//! The crate is split into two halves. The hand-shape half ([`shanten`],
//! [`wait`]) is pure: it maps a tile multiset to its distance from a winning
//! hand and to the tiles that complete it. The match half ([`board`],
//! [`driver`]) sequences turns, shows each seat only what it is entitled to
//! see, and checks every response against the protocol before applying it.
//!
//! Scoring and replay-log loading are external collaborators; [`score`] and
//! [`replay`] define the seams they plug into.

pub mod action;
pub mod board;
pub mod driver;
pub mod error;
pub mod meld;
pub mod player;
pub mod replay;
pub mod score;
pub mod shanten;
pub mod strategy;
pub mod tile;
pub mod wait;
pub mod wall;

mod tests;

pub use action::Action;
pub use board::Board;
pub use driver::{GameType, HandOutcome, MatchDriver};
pub use error::{EngineError, Result};
pub use meld::{Meld, MeldKind};
pub use player::Player;
pub use score::{ScoreError, Scorer, WinContext, WinKind, WinScore};
pub use shanten::{HandForm, ShantenCounter, SHANTEN_INFINITE};
pub use strategy::Strategy;
pub use tile::{Suit, Tile};
pub use wait::TenpaiInfo;
