use ahash::AHashMap;
use smallvec::SmallVec;

use crate::error::{EngineError, Result};
use crate::tile::{Tile, TILE_KINDS};

/// Sentinel for "no decomposition found under the current bound".
pub const SHANTEN_INFINITE: i32 = i32::MAX;

/// Structure kinds a standard-family decomposition is built from: complete
/// triplet/run, pair, the two incomplete run shapes (open two-sided and
/// closed/edge), and an isolated tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StructureKind {
    Kotsu,
    Shuntsu,
    Toitsu,
    Ryanpen,
    Kanta,
    Single,
}

const STRUCTURE_KINDS: [StructureKind; 6] = [
    StructureKind::Kotsu,
    StructureKind::Shuntsu,
    StructureKind::Toitsu,
    StructureKind::Ryanpen,
    StructureKind::Kanta,
    StructureKind::Single,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Complete,
    Toitsu,
    Tatsu,
    Single,
}

impl StructureKind {
    fn category(self) -> Category {
        match self {
            StructureKind::Kotsu | StructureKind::Shuntsu => Category::Complete,
            StructureKind::Toitsu => Category::Toitsu,
            StructureKind::Ryanpen | StructureKind::Kanta => Category::Tatsu,
            StructureKind::Single => Category::Single,
        }
    }
}

impl Category {
    fn size(self) -> i32 {
        match self {
            Category::Complete => 3,
            Category::Toitsu | Category::Tatsu => 2,
            Category::Single => 1,
        }
    }
}

/// One structure of a decomposition. Tiles are dense kind indices
/// (red stripped), kept sorted by construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Structure {
    pub kind: StructureKind,
    pub tiles: SmallVec<[u8; 3]>,
}

impl Structure {
    pub fn tile_at(&self, i: usize) -> Tile {
        Tile::from_id(self.tiles[i] as usize)
    }
}

/// An optimal decomposition of the hand under one of the three families.
#[derive(Debug, Clone, PartialEq)]
pub enum HandForm {
    Standard(Vec<Structure>),
    SevenPairs,
    ThirteenOrphans,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Standard,
    SevenPairs,
    ThirteenOrphans,
}

pub const ALL_FAMILIES: [Family; 3] = [
    Family::Standard,
    Family::SevenPairs,
    Family::ThirteenOrphans,
];

/// Search knobs. The defaults run an unbounded search over all three
/// families and keep every optimal decomposition.
#[derive(Debug, Clone)]
pub struct ShantenConfig {
    /// Prune branches that provably exceed this shanten. The optimum is
    /// unaffected as long as it lies within the bound.
    pub max_shanten: Option<i32>,
    pub families: Vec<Family>,
    /// Tiles the hand accounts for once melds are added back; defaults to
    /// the number of tiles supplied.
    pub num_used_tiles: Option<usize>,
    /// When false, the standard search stops at the first complete
    /// decomposition instead of collecting all of them.
    pub need_all_combinations: bool,
}

impl Default for ShantenConfig {
    fn default() -> Self {
        ShantenConfig {
            max_shanten: None,
            families: ALL_FAMILIES.to_vec(),
            num_used_tiles: None,
            need_all_combinations: true,
        }
    }
}

/// Minimum-exchange distance of a tile multiset from a complete hand,
/// with every optimal decomposition of whichever families attain it.
///
/// -1 means complete, 0 means tenpai. The search runs the three families
/// independently and unions the decompositions of those tying at the
/// minimum. The standard family is a pruned, memoized recursive
/// decomposition over the structure kinds above; the memo cache lives for
/// one analysis and never leaks between calls.
#[derive(Debug, Clone)]
pub struct ShantenCounter {
    shanten: i32,
    combinations: Vec<HandForm>,
}

impl ShantenCounter {
    pub fn count(tiles: &[Tile]) -> Result<ShantenCounter> {
        ShantenCounter::analyze(tiles, ShantenConfig::default())
    }

    pub fn with_bound(tiles: &[Tile], max_shanten: i32) -> Result<ShantenCounter> {
        ShantenCounter::analyze(
            tiles,
            ShantenConfig {
                max_shanten: Some(max_shanten),
                ..ShantenConfig::default()
            },
        )
    }

    pub fn analyze(tiles: &[Tile], config: ShantenConfig) -> Result<ShantenCounter> {
        let num_used = config.num_used_tiles.unwrap_or(tiles.len());
        if num_used % 3 == 0 {
            return Err(EngineError::InvalidHandSize(num_used));
        }

        let mut counts = [0u8; TILE_KINDS];
        for tile in tiles {
            counts[tile.remove_red().id()] += 1;
        }

        let mut results: Vec<(i32, Vec<HandForm>)> = Vec::new();
        if config.families.contains(&Family::Standard) {
            let mut search = StandardSearch {
                total_tiles: tiles.len(),
                num_used_tiles: num_used,
                max_shanten: config.max_shanten,
                need_all_combinations: config.need_all_combinations,
                cache: AHashMap::new(),
            };
            let (shanten, combos) = search.count(&counts, &Vec::new());
            results.push((shanten, combos.into_iter().map(HandForm::Standard).collect()));
        }
        if config.families.contains(&Family::SevenPairs) {
            results.push(count_seven_pairs(&counts));
        }
        if config.families.contains(&Family::ThirteenOrphans) {
            results.push(count_thirteen_orphans(&counts));
        }

        let mut shanten = SHANTEN_INFINITE;
        let mut combinations = Vec::new();
        for (family_shanten, family_combos) in results {
            if let Some(max) = config.max_shanten {
                if family_shanten > max {
                    continue;
                }
            }
            if family_shanten < shanten {
                shanten = family_shanten;
                combinations = family_combos;
            } else if family_shanten == shanten && shanten < SHANTEN_INFINITE {
                combinations.extend(family_combos);
            }
        }
        Ok(ShantenCounter {
            shanten,
            combinations,
        })
    }

    pub fn shanten(&self) -> i32 {
        self.shanten
    }

    pub fn combinations(&self) -> &[HandForm] {
        &self.combinations
    }
}

fn count_seven_pairs(counts: &[u8; TILE_KINDS]) -> (i32, Vec<HandForm>) {
    let pairs = counts.iter().filter(|&&c| c >= 2).count() as i32;
    let singles = counts.iter().filter(|&&c| c == 1).count() as i32;
    // With six pairs and no loose single, the leftover tiles duplicate
    // existing pairs and cannot supply the seventh.
    let shanten = if pairs == 6 && singles == 0 {
        1
    } else {
        -1 + (7 - pairs).max(0)
    };
    (shanten, vec![HandForm::SevenPairs])
}

fn count_thirteen_orphans(counts: &[u8; TILE_KINDS]) -> (i32, Vec<HandForm>) {
    let mut kinds = 0;
    let mut has_pair = false;
    for id in 0..TILE_KINDS {
        if Tile::from_id(id).is_yaochu() && counts[id] > 0 {
            kinds += 1;
            has_pair |= counts[id] >= 2;
        }
    }
    let shanten = (13 - kinds) - i32::from(has_pair);
    (shanten, vec![HandForm::ThirteenOrphans])
}

type CacheKey = ([u8; TILE_KINDS], Vec<Structure>);

struct StandardSearch {
    total_tiles: usize,
    num_used_tiles: usize,
    max_shanten: Option<i32>,
    need_all_combinations: bool,
    cache: AHashMap<CacheKey, (i32, Vec<Vec<Structure>>)>,
}

impl StandardSearch {
    fn count(
        &mut self,
        counts: &[u8; TILE_KINDS],
        structures: &Vec<Structure>,
    ) -> (i32, Vec<Vec<Structure>>) {
        let mut sorted = structures.clone();
        sorted.sort();
        let key = (*counts, sorted);
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        let result = match counts.iter().position(|&c| c > 0) {
            None => (self.lower_bound(structures), vec![structures.clone()]),
            Some(first) => self.expand(counts, structures, first as u8),
        };

        self.cache.insert(key, result.clone());
        result
    }

    fn expand(
        &mut self,
        counts: &[u8; TILE_KINDS],
        structures: &Vec<Structure>,
        first: u8,
    ) -> (i32, Vec<Vec<Structure>>) {
        if let Some(max) = self.max_shanten {
            if self.lower_bound(structures) > max {
                return (SHANTEN_INFINITE, Vec::new());
            }
        }

        let mut min_shanten = SHANTEN_INFINITE;
        let mut min_combinations = Vec::new();
        for kind in STRUCTURE_KINDS {
            if self.max_shanten == Some(-1) {
                // Deciding completeness only: degenerate partials cannot
                // help, and a second head pair is never part of a win.
                if matches!(kind, StructureKind::Ryanpen | StructureKind::Kanta) {
                    continue;
                }
                if kind == StructureKind::Toitsu
                    && structures.iter().any(|s| s.kind == StructureKind::Toitsu)
                {
                    continue;
                }
            }
            let Some(piece) = piece_tiles(kind, first) else {
                continue;
            };
            let Some(remains) = remove_piece(counts, &piece) else {
                continue;
            };
            let mut next = structures.clone();
            next.push(Structure { kind, tiles: piece });
            let (shanten, combos) = self.count(&remains, &next);
            if shanten < min_shanten {
                min_shanten = shanten;
                min_combinations = combos;
                if !self.need_all_combinations && min_shanten == -1 {
                    break;
                }
            } else if shanten == min_shanten && shanten < SHANTEN_INFINITE {
                min_combinations.extend(combos);
            }
        }
        (min_shanten, min_combinations)
    }

    /// Closed-form shanten of a terminal decomposition, assuming the
    /// unaccounted remainder forms best-case structures.
    fn lower_bound(&self, structures: &[Structure]) -> i32 {
        let mut categories: Vec<Category> =
            structures.iter().map(|s| s.kind.category()).collect();
        let current: i32 = categories.iter().map(|c| c.size()).sum();
        let remain = self.total_tiles - current as usize;

        if let Some(head) = categories.iter().position(|&c| c == Category::Toitsu) {
            // One pair serves as the head.
            categories.remove(head);
            self.bound_without_head(&categories, remain)
        } else {
            // Either the head is still missing (+1) or it hides in the
            // unaccounted remainder.
            let mut best = self.bound_without_head(&categories, remain) + 1;
            if remain >= 2 {
                best = best.min(self.bound_without_head(&categories, remain - 2));
            }
            best
        }
    }

    fn bound_without_head(&self, categories: &[Category], remain: usize) -> i32 {
        let mut all = categories.to_vec();
        all.extend(std::iter::repeat(Category::Complete).take(remain / 3));
        match remain % 3 {
            1 => all.push(Category::Single),
            2 => all.push(Category::Toitsu),
            _ => {}
        }
        let mut sizes: Vec<i32> = all.iter().map(|c| c.size()).collect();
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        let needed_sets = self.num_used_tiles / 3;
        -1 + sizes.iter().take(needed_sets).map(|s| 3 - s).sum::<i32>()
    }
}

fn piece_tiles(kind: StructureKind, first: u8) -> Option<SmallVec<[u8; 3]>> {
    match kind {
        StructureKind::Kotsu => Some(SmallVec::from_slice(&[first, first, first])),
        StructureKind::Shuntsu => run_piece(first, &[0, 1, 2]),
        StructureKind::Toitsu => Some(SmallVec::from_slice(&[first, first])),
        StructureKind::Ryanpen => run_piece(first, &[0, 1]),
        StructureKind::Kanta => run_piece(first, &[0, 2]),
        StructureKind::Single => Some(SmallVec::from_slice(&[first])),
    }
}

fn run_piece(first: u8, offsets: &[u8]) -> Option<SmallVec<[u8; 3]>> {
    if first >= 27 {
        return None;
    }
    let mut piece = SmallVec::new();
    for &off in offsets {
        if first % 9 + off > 8 {
            return None;
        }
        piece.push(first + off);
    }
    Some(piece)
}

fn remove_piece(counts: &[u8; TILE_KINDS], piece: &[u8]) -> Option<[u8; TILE_KINDS]> {
    let mut remains = *counts;
    for &tile in piece {
        if remains[tile as usize] == 0 {
            return None;
        }
        remains[tile as usize] -= 1;
    }
    Some(remains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::parse_tiles;

    fn shanten_of(text: &str) -> i32 {
        ShantenCounter::count(&parse_tiles(text).unwrap())
            .unwrap()
            .shanten()
    }

    #[test]
    fn complete_standard_hand() {
        assert_eq!(shanten_of("123m456m789m123p11s"), -1);
    }

    #[test]
    fn tanki_tenpai() {
        assert_eq!(shanten_of("123m456m789m123p1s"), 0);
    }

    #[test]
    fn honors_never_form_runs() {
        // ESW is three singles, not a run: one exchange from tenpai.
        assert_eq!(shanten_of("123m456m789m11pESW"), 1);
    }

    #[test]
    fn seven_pairs_edge_cases() {
        let chiitoi_only = |text: &str| {
            ShantenCounter::analyze(
                &parse_tiles(text).unwrap(),
                ShantenConfig {
                    families: vec![Family::SevenPairs],
                    ..ShantenConfig::default()
                },
            )
            .unwrap()
            .shanten()
        };
        // Six pairs and two loose singles: one exchange away.
        assert_eq!(chiitoi_only("112233445566m78m"), 0);
        // Six pairs but the leftovers duplicate an existing pair.
        assert_eq!(chiitoi_only("1122334455m6666s"), 1);
        // Six pairs and one genuine single.
        assert_eq!(chiitoi_only("1122334455m666s7s"), 0);
        // Complete seven pairs.
        assert_eq!(chiitoi_only("11223344556677p"), -1);
    }

    #[test]
    fn thirteen_orphans() {
        // All thirteen kinds plus a duplicate: complete.
        assert_eq!(shanten_of("19m19p19sESWNPFCE"), -1);
        // All thirteen kinds as singles: tenpai on any of them.
        assert_eq!(shanten_of("19m19p19sESWNPFC"), 0);
        let kokushi_only = ShantenCounter::analyze(
            &parse_tiles("19m19p19sESWNPF2s").unwrap(),
            ShantenConfig {
                families: vec![Family::ThirteenOrphans],
                ..ShantenConfig::default()
            },
        )
        .unwrap();
        assert_eq!(kokushi_only.shanten(), 1);
    }

    #[test]
    fn rejects_multiple_of_three_tiles() {
        let tiles = parse_tiles("123m456p789s").unwrap();
        assert!(matches!(
            ShantenCounter::count(&tiles),
            Err(EngineError::InvalidHandSize(9))
        ));
    }

    #[test]
    fn red_fives_count_as_plain_fives() {
        assert_eq!(
            shanten_of("345m567m345p5pr5p5p11s"),
            shanten_of("345m567m345p555p11s")
        );
        assert_eq!(shanten_of("345m567m345p5pr5p5p11s"), -1);
    }

    #[test]
    fn bound_prunes_without_changing_the_optimum() {
        let tiles = parse_tiles("139m258p47sEESWP").unwrap();
        let free = ShantenCounter::count(&tiles).unwrap().shanten();
        let bounded = ShantenCounter::with_bound(&tiles, free).unwrap().shanten();
        assert_eq!(free, bounded);
        // A bound below the optimum leaves nothing reachable.
        let starved = ShantenCounter::with_bound(&tiles, free - 1).unwrap();
        assert_eq!(starved.shanten(), SHANTEN_INFINITE);
        assert!(starved.combinations().is_empty());
    }

    #[test]
    fn meld_shortened_hand_is_supported() {
        // Ten concealed tiles alongside one meld: three sets plus the head
        // are all the hand still owes.
        let tiles = parse_tiles("123m456p78s55s").unwrap();
        let counter = ShantenCounter::count(&tiles).unwrap();
        assert_eq!(counter.shanten(), 0);
    }

    #[test]
    fn analysis_is_idempotent() {
        let tiles = parse_tiles("1234567m12388sEE").unwrap();
        let a = ShantenCounter::count(&tiles).unwrap();
        let b = ShantenCounter::count(&tiles).unwrap();
        assert_eq!(a.shanten(), b.shanten());
        assert_eq!(a.combinations(), b.combinations());
    }
}
