use crate::action::Action;
use crate::error::{EngineError, Result};
use crate::meld::{Meld, MeldKind};
use crate::shanten::ShantenCounter;
use crate::tile::{Suit, Tile};

/// Per-seat state, rebuilt from the action stream.
///
/// A player only ever sees redacted views, so the hand it tracks is its own;
/// other seats' concealed tiles never reach it. State resets at every round
/// start except for the running point total.
#[derive(Debug)]
pub struct Player {
    pub id: u8,
    pub name: Option<String>,
    /// Concealed hand, sorted except for a freshly drawn tile at the end.
    pub tehais: Vec<Tile>,
    pub furos: Vec<Meld>,
    /// River: own discards still lying in front of this player.
    pub ho: Vec<Tile>,
    /// Every discard, including tiles later taken by a call.
    pub sutehais: Vec<Tile>,
    /// Tiles revealed safe against this player other than by its own
    /// discards (passed on while they lay in another river).
    pub extra_anpais: Vec<Tile>,
    pub reach: bool,
    /// River index at which the wait declaration locked the hand.
    pub reach_ho_index: Option<usize>,
    pub points: i32,
}

impl Player {
    pub fn new(id: u8) -> Player {
        Player {
            id,
            name: None,
            tehais: Vec::new(),
            furos: Vec::new(),
            ho: Vec::new(),
            sutehais: Vec::new(),
            extra_anpais: Vec::new(),
            reach: false,
            reach_ho_index: None,
            points: 25000,
        }
    }

    /// All tiles known safe against this player.
    pub fn anpais(&self) -> Vec<Tile> {
        let mut tiles = self.sutehais.clone();
        tiles.extend(self.extra_anpais.iter().copied());
        tiles
    }

    /// Seat wind for the given dealer.
    pub fn jikaze(&self, oya: u8) -> Tile {
        let rank = 1 + (4 + self.id - oya) % 4;
        Tile::new(Suit::Honor, rank).expect("wind rank is 1..=4")
    }

    pub fn is_tenpai(&self) -> Result<bool> {
        Ok(ShantenCounter::with_bound(&self.tehais, 0)?.shanten() <= 0)
    }

    /// Applies one (already redacted) action to this player's state.
    /// `previous` is the action that preceded it on the board, used for
    /// passed-discard safety bookkeeping.
    pub fn process_action(&mut self, action: &Action, previous: Option<&Action>) -> Result<()> {
        if let Some(Action::Dahai { actor, pai }) = previous {
            if *actor != self.id && action.kind() != "hora" {
                self.extra_anpais.push(*pai);
            }
        }

        match action {
            Action::StartGame { id, names } => {
                if let Some(id) = id {
                    self.id = *id;
                }
                if let Some(names) = names {
                    self.name = names.get(self.id as usize).cloned();
                }
            }
            Action::StartKyoku { .. } => {
                self.tehais.clear();
                self.furos.clear();
                self.ho.clear();
                self.sutehais.clear();
                self.extra_anpais.clear();
                self.reach = false;
                self.reach_ho_index = None;
            }
            _ => {}
        }

        if action.actor() == Some(self.id) {
            match action {
                Action::Haipai { pais, .. } => {
                    self.tehais = resolve_tiles(pais)?;
                    self.tehais.sort();
                }
                Action::Tsumo { pai, .. } => {
                    self.tehais.push(pai.ok_or(EngineError::ConcealedTile)?);
                }
                Action::Dahai { pai, .. } => {
                    self.delete_tehai(*pai)?;
                    self.tehais.sort();
                    self.ho.push(*pai);
                    self.sutehais.push(*pai);
                    if !self.reach {
                        self.extra_anpais.clear();
                    }
                }
                Action::Chi {
                    target,
                    pai,
                    consumed,
                    ..
                }
                | Action::Pon {
                    target,
                    pai,
                    consumed,
                    ..
                }
                | Action::Daiminkan {
                    target,
                    pai,
                    consumed,
                    ..
                } => {
                    for tile in consumed {
                        self.delete_tehai(*tile)?;
                    }
                    let kind = match action {
                        Action::Chi { .. } => MeldKind::Chi,
                        Action::Pon { .. } => MeldKind::Pon,
                        _ => MeldKind::Daiminkan,
                    };
                    self.furos.push(Meld {
                        kind,
                        taken: Some(*pai),
                        consumed: consumed.clone(),
                        from: Some(*target),
                    });
                }
                Action::Ankan { consumed, .. } => {
                    for tile in consumed {
                        self.delete_tehai(*tile)?;
                    }
                    self.furos.push(Meld {
                        kind: MeldKind::Ankan,
                        taken: None,
                        consumed: consumed.clone(),
                        from: None,
                    });
                }
                Action::Kakan { pai, .. } => {
                    self.delete_tehai(*pai)?;
                    let pon = self
                        .furos
                        .iter_mut()
                        .find(|f| {
                            f.kind == MeldKind::Pon
                                && f.taken.is_some_and(|t| t.same_symbol(*pai))
                        })
                        .ok_or(EngineError::MeldNotFound(*pai))?;
                    pon.kind = MeldKind::Kakan;
                    pon.consumed.push(*pai);
                }
                Action::ReachAccepted { .. } => {
                    self.reach = true;
                    self.reach_ho_index = Some(self.ho.len().saturating_sub(1));
                    self.points -= 1000;
                }
                _ => {}
            }
        }

        // Settlement reaches every seat through the action itself, so a
        // replayed stream reproduces the same point totals.
        match action {
            Action::Hora {
                player_points: Some(points),
                ..
            } => {
                if let Some(total) = points.get(self.id as usize) {
                    self.points = *total;
                }
            }
            Action::Ryukyoku {
                deltas: Some(deltas),
                ..
            } => {
                if let Some(delta) = deltas.get(self.id as usize) {
                    self.points += *delta;
                }
            }
            _ => {}
        }

        if action.target() == Some(self.id) {
            if let Action::Chi { pai, .. } | Action::Pon { pai, .. } | Action::Daiminkan { pai, .. } =
                action
            {
                let taken = self.ho.pop();
                if taken != Some(*pai) {
                    return Err(EngineError::Protocol(format!(
                        "call took {} but the river ends in {:?}",
                        pai, taken
                    )));
                }
            }
        }

        Ok(())
    }

    fn delete_tehai(&mut self, pai: Tile) -> Result<()> {
        let index = self
            .tehais
            .iter()
            .position(|&t| t == pai)
            .ok_or(EngineError::TileNotInHand(pai))?;
        self.tehais.remove(index);
        Ok(())
    }
}

fn resolve_tiles(pais: &[Option<Tile>]) -> Result<Vec<Tile>> {
    pais.iter()
        .map(|p| p.ok_or(EngineError::ConcealedTile))
        .collect()
}
