use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, Result};

pub const TILE_KINDS: usize = 34;

const HONOR_LETTERS: [char; 7] = ['E', 'S', 'W', 'N', 'P', 'F', 'C'];

/// Tile suit. The declaration order fixes the total order of tiles:
/// characters < circles < bamboos < honors, matching the m/p/s/z notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Character,
    Circle,
    Bamboo,
    Honor,
}

impl Suit {
    fn letter(self) -> char {
        match self {
            Suit::Character => 'm',
            Suit::Circle => 'p',
            Suit::Bamboo => 's',
            Suit::Honor => 'z',
        }
    }

    pub fn is_honor(self) -> bool {
        self == Suit::Honor
    }
}

/// One playing tile. Suited tiles carry ranks 1-9, honors 1-7
/// (E S W N P F C). The red flag marks the red five variant; it never
/// affects shape equality, only display and scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tile {
    suit: Suit,
    rank: u8,
    red: bool,
}

impl Tile {
    pub fn new(suit: Suit, rank: u8) -> Result<Tile> {
        Tile::build(suit, rank, false)
    }

    pub fn red_five(suit: Suit) -> Result<Tile> {
        Tile::build(suit, 5, true)
    }

    fn build(suit: Suit, rank: u8, red: bool) -> Result<Tile> {
        let max = if suit == Suit::Honor { 7 } else { 9 };
        if rank < 1 || rank > max {
            return Err(EngineError::MalformedTile(format!("{rank}{}", suit.letter())));
        }
        if red && (suit == Suit::Honor || rank != 5) {
            return Err(EngineError::MalformedTile(format!(
                "{rank}{}r",
                suit.letter()
            )));
        }
        Ok(Tile { suit, rank, red })
    }

    pub fn suit(self) -> Suit {
        self.suit
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    pub fn is_red(self) -> bool {
        self.red
    }

    /// Strips the red flag, projecting onto the 34-kind shape space.
    pub fn remove_red(self) -> Tile {
        Tile { red: false, ..self }
    }

    /// Shape equality: suit and rank match, red flags may differ.
    pub fn same_symbol(self, other: Tile) -> bool {
        self.suit == other.suit && self.rank == other.rank
    }

    /// Dense index 0..34 used for multiset counting. Red is ignored.
    pub fn id(self) -> usize {
        let base = match self.suit {
            Suit::Character => 0,
            Suit::Circle => 9,
            Suit::Bamboo => 18,
            Suit::Honor => 27,
        };
        base + self.rank as usize - 1
    }

    pub fn from_id(id: usize) -> Tile {
        debug_assert!(id < TILE_KINDS);
        let (suit, rank) = match id {
            0..=8 => (Suit::Character, id + 1),
            9..=17 => (Suit::Circle, id - 8),
            18..=26 => (Suit::Bamboo, id - 17),
            _ => (Suit::Honor, id - 26),
        };
        Tile {
            suit,
            rank: rank as u8,
            red: false,
        }
    }

    /// Terminal or honor tile (the thirteen-orphans kinds).
    pub fn is_yaochu(self) -> bool {
        self.suit == Suit::Honor || self.rank == 1 || self.rank == 9
    }

    pub fn is_wind(self) -> bool {
        self.suit == Suit::Honor && (1..=4).contains(&self.rank)
    }

    pub fn is_dragon(self) -> bool {
        self.suit == Suit::Honor && (5..=7).contains(&self.rank)
    }

    /// Cyclic successor: suited 9 wraps to 1, honors 7 (C) to 1 (E). A dora
    /// marker indicates its successor; wind rotation steps the same way.
    pub fn succ(self) -> Tile {
        let max = if self.suit == Suit::Honor { 7 } else { 9 };
        let rank = if self.rank == max { 1 } else { self.rank + 1 };
        Tile {
            suit: self.suit,
            rank,
            red: false,
        }
    }

    /// All 136 tiles of a match: four copies of each kind, the first copy of
    /// each suited five being red.
    pub fn full_set() -> Vec<Tile> {
        let mut tiles = Vec::with_capacity(136);
        for copy in 0..4 {
            for suit in [Suit::Character, Suit::Circle, Suit::Bamboo] {
                for rank in 1..=9 {
                    let red = rank == 5 && copy == 0;
                    tiles.push(Tile { suit, rank, red });
                }
            }
            for rank in 1..=7 {
                tiles.push(Tile {
                    suit: Suit::Honor,
                    rank,
                    red: false,
                });
            }
        }
        tiles.sort();
        tiles
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.suit == Suit::Honor {
            write!(f, "{}", HONOR_LETTERS[self.rank as usize - 1])
        } else {
            write!(
                f,
                "{}{}{}",
                self.rank,
                self.suit.letter(),
                if self.red { "r" } else { "" }
            )
        }
    }
}

impl FromStr for Tile {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Tile> {
        let tiles = parse_tiles(s)?;
        match tiles.as_slice() {
            [tile] => Ok(*tile),
            _ => Err(EngineError::MalformedTile(s.to_string())),
        }
    }
}

impl Serialize for Tile {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Tile, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Parses tile notation such as `"123m4p5pr6pESWNPFC"`. Digits accumulate
/// until a suit letter flushes them; a trailing `r` marks the tile just
/// flushed as red; honor tiles stand alone as their letters.
pub fn parse_tiles(text: &str) -> Result<Vec<Tile>> {
    let mut tiles = Vec::new();
    let mut pending: Vec<u8> = Vec::new();
    for ch in text.chars() {
        match ch {
            c if c.is_whitespace() => {}
            '1'..='9' => pending.push(ch as u8 - b'0'),
            'm' | 'p' | 's' => {
                let suit = match ch {
                    'm' => Suit::Character,
                    'p' => Suit::Circle,
                    _ => Suit::Bamboo,
                };
                if pending.is_empty() {
                    return Err(EngineError::MalformedTile(text.to_string()));
                }
                for rank in pending.drain(..) {
                    tiles.push(Tile::new(suit, rank)?);
                }
            }
            'r' => {
                let last = tiles
                    .pop()
                    .ok_or_else(|| EngineError::MalformedTile(text.to_string()))?;
                tiles.push(Tile::build(last.suit, last.rank, true)?);
            }
            c => {
                if !pending.is_empty() {
                    return Err(EngineError::MalformedTile(text.to_string()));
                }
                let rank = HONOR_LETTERS
                    .iter()
                    .position(|&h| h == c)
                    .ok_or_else(|| EngineError::MalformedTile(text.to_string()))?;
                tiles.push(Tile::new(Suit::Honor, rank as u8 + 1)?);
            }
        }
    }
    if !pending.is_empty() {
        return Err(EngineError::MalformedTile(text.to_string()));
    }
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        let tiles = parse_tiles("123m4p5pr6p789sESWNPFC").unwrap();
        assert_eq!(tiles.len(), 16);
        let text: Vec<String> = tiles.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            text.join(" "),
            "1m 2m 3m 4p 5pr 6p 7s 8s 9s E S W N P F C"
        );
        assert!(tiles[4].is_red());
        assert!(tiles[4].same_symbol("5p".parse().unwrap()));
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(parse_tiles("12").is_err());
        assert!(parse_tiles("0m").is_err());
        assert!(parse_tiles("8z").is_err());
        assert!(parse_tiles("r5p").is_err());
        assert!(parse_tiles("4pr").is_err());
        assert!("55m".parse::<Tile>().is_err());
    }

    #[test]
    fn total_order_is_suit_rank_red() {
        let mut tiles = parse_tiles("E9s1p5mr5m").unwrap();
        tiles.sort();
        let text: Vec<String> = tiles.iter().map(|t| t.to_string()).collect();
        assert_eq!(text.join(" "), "5m 5mr 1p 9s E");
    }

    #[test]
    fn successor_wraps() {
        let nine: Tile = "9m".parse().unwrap();
        assert_eq!(nine.succ(), "1m".parse().unwrap());
        let chun: Tile = "C".parse().unwrap();
        assert_eq!(chun.succ(), "E".parse().unwrap());
        let red: Tile = "5sr".parse().unwrap();
        assert_eq!(red.succ(), "6s".parse().unwrap());
    }

    #[test]
    fn id_round_trip() {
        for id in 0..TILE_KINDS {
            assert_eq!(Tile::from_id(id).id(), id);
        }
    }

    #[test]
    fn full_set_has_one_red_five_per_suit() {
        let all = Tile::full_set();
        assert_eq!(all.len(), 136);
        assert_eq!(all.iter().filter(|t| t.is_red()).count(), 3);
        for id in 0..TILE_KINDS {
            assert_eq!(all.iter().filter(|t| t.id() == id).count(), 4);
        }
    }
}
