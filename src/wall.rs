use rand::prelude::*;
use rand::rngs::StdRng;
use sha2::{Digest, Sha256};

use crate::tile::Tile;

/// Tiles set aside as the dead wall at every deal.
pub const DEAD_WALL_SIZE: usize = 14;

/// The shuffled tile supply for one hand: a live wall the turn loop draws
/// from and a fixed dead-wall reserve that feeds replacement draws after a
/// quad and the dora indicators.
///
/// Shuffling is reproducible: a fixed seed derives one sub-seed per hand via
/// splitmix64, and every shuffle publishes a salted SHA-256 digest of the
/// wall order as a commitment.
#[derive(Debug, Clone)]
pub struct Wall {
    live: Vec<Tile>,
    dead: Vec<Tile>,
    dora_markers: Vec<Tile>,
    digest: String,
    salt: String,
    seed: Option<u64>,
    hand_index: u64,
}

impl Wall {
    pub fn new(seed: Option<u64>) -> Wall {
        Wall {
            live: Vec::new(),
            dead: Vec::new(),
            dora_markers: Vec::new(),
            digest: String::new(),
            salt: String::new(),
            seed,
            hand_index: 0,
        }
    }

    /// Shuffles the full tile set and splits off the dead wall. The first
    /// dora marker is drawn from the dead wall immediately.
    pub fn deal(&mut self, all_tiles: &[Tile]) -> Tile {
        let mut tiles = all_tiles.to_vec();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(splitmix64(seed.wrapping_add(self.hand_index))),
            None => StdRng::from_entropy(),
        };
        self.hand_index = self.hand_index.wrapping_add(1);
        tiles.shuffle(&mut rng);

        self.salt = format!("{:016x}", rng.next_u64());
        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        for tile in &tiles {
            hasher.update([tile.id() as u8, u8::from(tile.is_red())]);
        }
        self.digest = format!("{:x}", hasher.finalize());

        self.dead = tiles.split_off(tiles.len() - DEAD_WALL_SIZE);
        self.live = tiles;
        self.dora_markers.clear();
        let marker = self.dead.pop().expect("dead wall holds the first marker");
        self.dora_markers.push(marker);
        marker
    }

    pub fn draw(&mut self) -> Option<Tile> {
        self.live.pop()
    }

    pub fn draw_many(&mut self, n: usize) -> Vec<Tile> {
        let at = self.live.len().saturating_sub(n);
        self.live.split_off(at)
    }

    /// Replacement draw after a quad, taken from the dead wall.
    pub fn draw_replacement(&mut self) -> Option<Tile> {
        self.dead.pop()
    }

    /// Reveals one more dora marker from the dead wall.
    pub fn reveal_marker(&mut self) -> Option<Tile> {
        let marker = self.dead.pop()?;
        self.dora_markers.push(marker);
        Some(marker)
    }

    pub fn dora_markers(&self) -> &[Tile] {
        &self.dora_markers
    }

    pub fn remaining(&self) -> usize {
        self.live.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.live.is_empty()
    }

    pub fn dead_remaining(&self) -> usize {
        self.dead.len()
    }

    /// Commitment digest of the current wall order.
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deal_partitions_the_full_set() {
        let mut wall = Wall::new(Some(7));
        wall.deal(&Tile::full_set());
        // 136 minus the dead wall, one tile of which is already showing.
        assert_eq!(wall.remaining(), 136 - DEAD_WALL_SIZE);
        assert_eq!(wall.dead_remaining(), DEAD_WALL_SIZE - 1);
        assert_eq!(wall.dora_markers().len(), 1);
        assert!(!wall.digest().is_empty());
    }

    #[test]
    fn seeded_shuffles_differ_between_hands_but_replay_identically() {
        let mut a = Wall::new(Some(42));
        let mut b = Wall::new(Some(42));
        let all = Tile::full_set();
        a.deal(&all);
        b.deal(&all);
        assert_eq!(a.digest(), b.digest());
        let first = a.digest().to_string();
        a.deal(&all);
        assert_ne!(a.digest(), first);
    }

    #[test]
    fn replacement_draws_come_from_the_dead_wall() {
        let mut wall = Wall::new(Some(1));
        wall.deal(&Tile::full_set());
        let live_before = wall.remaining();
        let drawn = wall.draw_replacement();
        assert!(drawn.is_some());
        assert_eq!(wall.remaining(), live_before);
        assert_eq!(wall.dead_remaining(), DEAD_WALL_SIZE - 2);
        wall.reveal_marker();
        assert_eq!(wall.dora_markers().len(), 2);
    }
}
