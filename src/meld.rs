use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tile::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeldKind {
    Chi,
    Pon,
    Daiminkan,
    Ankan,
    Kakan,
}

/// A completed call attached to a player: a sequence or triplet claimed from
/// a discard, or one of the quad forms. A concealed quad has no taken tile
/// and no source seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meld {
    pub kind: MeldKind,
    pub taken: Option<Tile>,
    pub consumed: Vec<Tile>,
    pub from: Option<u8>,
}

impl Meld {
    pub fn tiles(&self) -> Vec<Tile> {
        let mut tiles: Vec<Tile> = self.taken.into_iter().collect();
        tiles.extend(self.consumed.iter().copied());
        tiles
    }

    pub fn tile_count(&self) -> usize {
        self.consumed.len() + usize::from(self.taken.is_some())
    }

    pub fn is_open(&self) -> bool {
        self.kind != MeldKind::Ankan
    }
}

impl fmt::Display for Meld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == MeldKind::Ankan {
            write!(f, "[# {} {} #]", self.consumed[0], self.consumed[1])
        } else {
            let consumed: Vec<String> = self.consumed.iter().map(|t| t.to_string()).collect();
            write!(
                f,
                "[{}({})/{}]",
                self.taken.map(|t| t.to_string()).unwrap_or_default(),
                self.from.map(i32::from).unwrap_or(-1),
                consumed.join(" ")
            )
        }
    }
}
