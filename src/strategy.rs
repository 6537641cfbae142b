use crate::action::Action;
use crate::meld::MeldKind;
use crate::player::Player;
use crate::shanten::ShantenCounter;
use crate::tile::{Suit, Tile};

/// A decision policy: observe a redacted action through this player's eyes
/// and optionally answer with a response action. This is the whole surface;
/// external agents (pipes, processes) plug in behind it.
pub trait Strategy {
    fn respond(&mut self, player: &Player, event: &Action) -> Option<Action>;
}

/// Never responds. Used when the action stream itself supplies every move,
/// as in replay playback.
#[derive(Debug, Default)]
pub struct Puppet;

impl Strategy for Puppet {
    fn respond(&mut self, _player: &Player, _event: &Action) -> Option<Action> {
        None
    }
}

/// Discards whatever it just drew (or whatever sits at the end of the hand
/// after a call). Never calls, never wins.
#[derive(Debug, Default)]
pub struct Tsumogiri;

impl Strategy for Tsumogiri {
    fn respond(&mut self, player: &Player, event: &Action) -> Option<Action> {
        match event {
            Action::Tsumo { actor, .. } | Action::Chi { actor, .. } | Action::Pon { actor, .. }
                if *actor == player.id =>
            {
                Some(Action::Dahai {
                    actor: player.id,
                    pai: *player.tehais.last()?,
                })
            }
            _ => None,
        }
    }
}

/// Plays toward the nearest win: declares the win when complete, declares a
/// wait at tenpai, forms quads when the tiles line up, and otherwise keeps
/// the discard that preserves minimum shanten. With `use_calls` it also
/// claims discards that serve the same goal.
#[derive(Debug, Default)]
pub struct ShantenStrategy {
    pub use_calls: bool,
}

impl Strategy for ShantenStrategy {
    fn respond(&mut self, player: &Player, event: &Action) -> Option<Action> {
        if event.actor() == Some(player.id) {
            match event {
                Action::Tsumo { .. }
                | Action::Chi { .. }
                | Action::Pon { .. }
                | Action::Reach { .. } => self.act_on_turn(player, event),
                _ => None,
            }
        } else if let Action::Dahai { actor, pai } = event {
            self.act_on_discard(player, *actor, *pai)
        } else {
            None
        }
    }
}

impl ShantenStrategy {
    fn act_on_turn(&self, player: &Player, event: &Action) -> Option<Action> {
        let shanten = ShantenCounter::count(&player.tehais).ok()?.shanten();

        if let Action::Tsumo { pai: Some(pai), .. } = event {
            if shanten == -1 {
                return Some(Action::Hora {
                    actor: player.id,
                    target: player.id,
                    pai: *pai,
                    fu: None,
                    fan: None,
                    hora_points: None,
                    deltas: None,
                    player_points: None,
                });
            }
            if shanten == 0 && !player.reach {
                return Some(Action::Reach { actor: player.id });
            }
            for &tile in &player.tehais {
                let copies = held_copies(player, tile);
                if copies.len() >= 4 {
                    return Some(Action::Ankan {
                        actor: player.id,
                        consumed: copies,
                    });
                }
            }
            if let Some(pon) = player
                .furos
                .iter()
                .find(|f| f.kind == MeldKind::Pon && f.taken.is_some_and(|t| t.same_symbol(*pai)))
            {
                return Some(Action::Kakan {
                    actor: player.id,
                    pai: *pai,
                    consumed: pon.tiles(),
                });
            }
        }

        // Keep shanten: walk from the latest tile back and discard the
        // first one whose removal doesn't worsen the hand.
        let mut sutehai = *player.tehais.last()?;
        for i in (0..player.tehais.len()).rev() {
            let mut remains = player.tehais.clone();
            remains.remove(i);
            let kept = ShantenCounter::with_bound(&remains, shanten).ok()?;
            if kept.shanten() == shanten {
                sutehai = player.tehais[i];
                break;
            }
        }
        Some(Action::Dahai {
            actor: player.id,
            pai: sutehai,
        })
    }

    fn act_on_discard(&self, player: &Player, discarder: u8, pai: Tile) -> Option<Action> {
        let mut with_taken = player.tehais.clone();
        with_taken.push(pai);
        if ShantenCounter::count(&with_taken).ok()?.shanten() == -1 {
            return Some(Action::Hora {
                actor: player.id,
                target: discarder,
                pai,
                fu: None,
                fan: None,
                hora_points: None,
                deltas: None,
                player_points: None,
            });
        }
        if !self.use_calls {
            return None;
        }

        let copies = held_copies(player, pai);
        if copies.len() >= 3 {
            return Some(Action::Daiminkan {
                actor: player.id,
                target: discarder,
                pai,
                consumed: copies[..3].to_vec(),
            });
        }
        if copies.len() >= 2 {
            return Some(Action::Pon {
                actor: player.id,
                target: discarder,
                pai,
                consumed: copies[..2].to_vec(),
            });
        }
        if (discarder + 1) % 4 == player.id && pai.suit() != Suit::Honor {
            // The three run windows containing the taken tile.
            for shift in 0..3i32 {
                let offsets: Vec<i32> = (-shift..(-shift + 3)).filter(|&j| j != 0).collect();
                let mut consumed = Vec::new();
                for off in offsets {
                    let rank = pai.rank() as i32 + off;
                    if !(1..=9).contains(&rank) {
                        break;
                    }
                    let Ok(wanted) = Tile::new(pai.suit(), rank as u8) else {
                        break;
                    };
                    match player.tehais.iter().find(|t| t.same_symbol(wanted)) {
                        Some(&held) => consumed.push(held),
                        None => break,
                    }
                }
                if consumed.len() == 2 {
                    return Some(Action::Chi {
                        actor: player.id,
                        target: discarder,
                        pai,
                        consumed,
                    });
                }
            }
        }
        None
    }
}

fn held_copies(player: &Player, pai: Tile) -> Vec<Tile> {
    player
        .tehais
        .iter()
        .filter(|t| t.same_symbol(pai))
        .copied()
        .collect()
}
