use crate::error::{EngineError, Result};
use crate::shanten::{HandForm, ShantenCounter, StructureKind};
use crate::tile::{Tile, TILE_KINDS};

/// Tenpai analysis of a concealed hand: whether it is one tile from
/// completion, and if so which tiles complete it.
///
/// The wait set is derived from every optimal decomposition the shape
/// search finds, so multi-sided waits fall out of the union rather than
/// from any wait-specific search.
#[derive(Debug, Clone)]
pub struct TenpaiInfo {
    tiles: Vec<Tile>,
    counter: ShantenCounter,
}

impl TenpaiInfo {
    pub fn new(tiles: &[Tile]) -> Result<TenpaiInfo> {
        let counter = ShantenCounter::with_bound(tiles, 0)?;
        Ok(TenpaiInfo {
            tiles: tiles.to_vec(),
            counter,
        })
    }

    pub fn is_tenpai(&self) -> bool {
        self.counter.shanten() == 0
    }

    /// The sorted, duplicate-free set of tiles completing this hand.
    pub fn waited_tiles(&self) -> Result<Vec<Tile>> {
        if self.tiles.len() % 3 != 1 {
            return Err(EngineError::InvalidHandSize(self.tiles.len()));
        }
        if !self.is_tenpai() {
            return Err(EngineError::NotTenpai);
        }

        let mut counts = [0u8; TILE_KINDS];
        for tile in &self.tiles {
            counts[tile.remove_red().id()] += 1;
        }

        let mut waits: Vec<Tile> = Vec::new();
        for form in self.counter.combinations() {
            match form {
                HandForm::SevenPairs => {
                    // A seven-pairs tenpai has exactly one unpaired tile.
                    if let Some(id) = counts.iter().position(|&c| c == 1) {
                        waits.push(Tile::from_id(id));
                    }
                }
                HandForm::ThirteenOrphans => {
                    let missing: Vec<Tile> = (0..TILE_KINDS)
                        .map(Tile::from_id)
                        .filter(|t| t.is_yaochu() && counts[t.id()] == 0)
                        .collect();
                    if missing.is_empty() {
                        // All thirteen kinds held as singles: the full
                        // thirteen-sided wait.
                        waits.extend((0..TILE_KINDS).map(Tile::from_id).filter(|t| t.is_yaochu()));
                    } else {
                        waits.push(missing[0]);
                    }
                }
                HandForm::Standard(structures) => {
                    let pairs = structures
                        .iter()
                        .filter(|s| s.kind == StructureKind::Toitsu)
                        .count();
                    match pairs {
                        0 => {
                            // Tanki: the isolated tile pairs up.
                            let single = structures
                                .iter()
                                .find(|s| s.kind == StructureKind::Single)
                                .expect("tenpai decomposition without pair has a single");
                            waits.push(single.tile_at(0));
                        }
                        1 => {
                            // One partial run finishes the last set.
                            let partial = structures
                                .iter()
                                .find(|s| {
                                    matches!(
                                        s.kind,
                                        StructureKind::Ryanpen | StructureKind::Kanta
                                    )
                                })
                                .expect("tenpai decomposition with one pair has a partial run");
                            let low = partial.tile_at(0);
                            let offsets: &[i32] = if partial.kind == StructureKind::Ryanpen {
                                &[-1, 2]
                            } else {
                                &[1]
                            };
                            for &off in offsets {
                                let rank = low.rank() as i32 + off;
                                if (1..=9).contains(&rank) {
                                    waits.push(Tile::new(low.suit(), rank as u8)?);
                                }
                            }
                        }
                        2 => {
                            // Shanpon: either pair promotes to a triplet.
                            for pair in structures
                                .iter()
                                .filter(|s| s.kind == StructureKind::Toitsu)
                            {
                                waits.push(pair.tile_at(0));
                            }
                        }
                        _ => unreachable!("tenpai decomposition with {pairs} pairs"),
                    }
                }
            }
        }
        waits.sort();
        waits.dedup();
        Ok(waits)
    }
}
