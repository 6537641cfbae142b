use crate::action::Action;
use crate::board::Board;
use crate::error::{EngineError, Result};
use crate::score::{ScoreError, Scorer, WinContext, WinKind};
use crate::strategy::Strategy;
use crate::wall::Wall;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameType {
    /// A single hand.
    OneKyoku,
    /// East round only.
    EastOnly,
    /// East and south rounds.
    HalfGame,
}

/// How one hand ended. Returned up the call chain instead of unwinding out
/// of the turn loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandOutcome {
    /// Settled wins, in payment order.
    Won(Vec<u8>),
    /// The live wall ran out.
    Drawn,
}

enum TurnFlow {
    Continue,
    End(HandOutcome),
}

/// Drives the draw/discard/call loop over a [`Board`], settling finished
/// hands through the external scoring collaborator.
///
/// Simultaneous responses resolve as: win declarations beat calls, every
/// simultaneous win is honored in seat order from the discarder, and a
/// triplet or quad call beats a sequence call. A win the scorer rejects as
/// patternless is dropped and play continues.
pub struct MatchDriver<S: Scorer> {
    board: Board,
    wall: Wall,
    scorer: S,
    game_type: GameType,
    next_oya: u8,
    last: bool,
}

impl<S: Scorer> MatchDriver<S> {
    pub fn new(
        strategies: [Box<dyn Strategy>; 4],
        scorer: S,
        game_type: GameType,
        seed: Option<u64>,
    ) -> MatchDriver<S> {
        MatchDriver {
            board: Board::new(strategies),
            wall: Wall::new(seed),
            scorer,
            game_type,
            next_oya: 0,
            last: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn wall(&self) -> &Wall {
        &self.wall
    }

    pub fn play_game(&mut self, names: Option<Vec<String>>) -> Result<()> {
        self.board.do_action(&Action::StartGame { id: None, names })?;
        self.next_oya = 0;
        self.last = false;
        while !self.game_finished() {
            self.play_kyoku()?;
        }
        self.board.do_action(&Action::EndGame)?;
        Ok(())
    }

    fn game_finished(&mut self) -> bool {
        if self.last {
            return true;
        }
        if self.game_type == GameType::OneKyoku {
            self.last = true;
        }
        false
    }

    /// One hand: deal, turn loop, settlement.
    pub fn play_kyoku(&mut self) -> Result<HandOutcome> {
        let marker = self.wall.deal(self.board.all_tiles());
        self.board.do_action(&Action::StartKyoku {
            oya: self.next_oya,
            dora_marker: marker,
        })?;
        for seat in 0..4 {
            let pais = self.wall.draw_many(13).into_iter().map(Some).collect();
            self.board.do_action(&Action::Haipai { actor: seat, pais })?;
        }

        let mut actor = self.next_oya;
        let mut outcome = None;
        while !self.wall.is_exhausted() {
            match self.mota(actor)? {
                TurnFlow::End(ended) => {
                    outcome = Some(ended);
                    break;
                }
                TurnFlow::Continue => {
                    // An accepted call moved the acting seat; the turn
                    // passes from wherever it landed.
                    actor = (self.board.current_actor().unwrap_or(actor) + 1) % 4;
                }
            }
        }
        let outcome = match outcome {
            Some(ended) => ended,
            None => {
                self.process_ryukyoku()?;
                HandOutcome::Drawn
            }
        };
        self.board.do_action(&Action::EndKyoku)?;
        Ok(outcome)
    }

    /// One seat's turn: draw, then follow the response chain until it ends
    /// in a settled win, an accepted call handing the turn over, or silence.
    fn mota(&mut self, actor: u8) -> Result<TurnFlow> {
        let mut reach = false;
        let tsumo_actor = actor;
        let first_draw = self.wall.draw().ok_or(EngineError::WallExhausted)?;
        let mut pending = vec![Action::Tsumo {
            actor,
            pai: Some(first_draw),
        }];

        while let Some(action) = pending.first().cloned() {
            if matches!(action, Action::Hora { .. }) {
                let winners = self.process_horas(&pending)?;
                if !winners.is_empty() {
                    return Ok(TurnFlow::End(HandOutcome::Won(winners)));
                }
                // Every declaration was patternless: rejected, play on.
                pending.clear();
            } else {
                if pending.len() != 1 {
                    return Err(EngineError::Protocol(format!(
                        "{} simultaneous non-win responses",
                        pending.len()
                    )));
                }
                let responses = self.board.do_action(&action)?;
                match &action {
                    Action::Ankan { actor, .. }
                    | Action::Daiminkan { actor, .. }
                    | Action::Kakan { actor, .. } => {
                        // Quad formed: replacement draw from the reserve,
                        // and the next marker comes up with it.
                        let replacement = self
                            .wall
                            .draw_replacement()
                            .ok_or(EngineError::WallExhausted)?;
                        if let Some(marker) = self.wall.reveal_marker() {
                            self.board.do_action(&Action::Dora {
                                dora_marker: marker,
                            })?;
                        }
                        pending = vec![Action::Tsumo {
                            actor: *actor,
                            pai: Some(replacement),
                        }];
                        continue;
                    }
                    Action::Reach { .. } => reach = true,
                    _ => {}
                }
                pending = choose_actions(&responses);
            }

            // A wait declaration is confirmed only once the declarer's
            // discard has survived every interjection short of a win.
            if reach
                && !matches!(
                    pending.first(),
                    Some(Action::Dahai { .. }) | Some(Action::Hora { .. })
                )
            {
                self.board
                    .do_action(&Action::ReachAccepted { actor: tsumo_actor })?;
                reach = false;
            }
        }
        Ok(TurnFlow::Continue)
    }

    /// Settles win declarations through the scorer. Declarations the scorer
    /// rejects are dropped; the settled winners come back in order.
    fn process_horas(&mut self, declarations: &[Action]) -> Result<Vec<u8>> {
        let oya = self
            .board
            .oya()
            .ok_or_else(|| EngineError::Protocol("win before any round started".into()))?;
        let bakaze = self
            .board
            .bakaze()
            .ok_or_else(|| EngineError::Protocol("win before any round started".into()))?;

        let mut winners = Vec::new();
        let mut sticks_taken = false;
        for declaration in declarations {
            let Action::Hora {
                actor, target, pai, ..
            } = declaration
            else {
                return Err(EngineError::Protocol(format!(
                    "{} mixed into win declarations",
                    declaration.kind()
                )));
            };
            let kind = if actor == target {
                WinKind::SelfDraw
            } else {
                WinKind::Discard
            };
            let player = self.board.player(*actor);
            let tehais = match kind {
                // The drawn tile sits at the end of the hand and is passed
                // separately as the winning tile.
                WinKind::SelfDraw => player.tehais[..player.tehais.len() - 1].to_vec(),
                WinKind::Discard => player.tehais.clone(),
            };
            let context = WinContext {
                tehais,
                furos: player.furos.clone(),
                taken: *pai,
                kind,
                oya: *actor == oya,
                bakaze,
                jikaze: player.jikaze(oya),
                doras: self.board.doras(),
                uradoras: Vec::new(),
                reach: player.reach,
                double_reach: false,
                ippatsu: false,
                rinshan: false,
                haitei: self.wall.is_exhausted(),
                first_turn: false,
                chankan: false,
            };
            let score = match self.scorer.score(&context) {
                Ok(score) => score,
                Err(ScoreError::NoYaku) => continue,
            };

            let honba = self.board.honba() as i32;
            let mut deltas = [0i32; 4];
            deltas[*actor as usize] += score.points + honba * 300;
            if !sticks_taken {
                let sticks = self.board.players().iter().filter(|p| p.reach).count() as i32;
                deltas[*actor as usize] += sticks * 1000;
                sticks_taken = true;
            }
            match kind {
                WinKind::SelfDraw => {
                    for seat in 0..4u8 {
                        if seat != *actor {
                            let payment = if seat == oya {
                                score.oya_payment
                            } else {
                                score.ko_payment
                            };
                            deltas[seat as usize] -= payment + honba * 100;
                        }
                    }
                }
                WinKind::Discard => {
                    deltas[*target as usize] -= score.points + honba * 300;
                }
            }
            let player_points: Vec<i32> = self
                .board
                .players()
                .iter()
                .enumerate()
                .map(|(seat, p)| p.points + deltas[seat])
                .collect();
            self.board.do_action(&Action::Hora {
                actor: *actor,
                target: *target,
                pai: *pai,
                fu: Some(score.fu),
                fan: Some(score.fan),
                hora_points: Some(score.points),
                deltas: Some(deltas.to_vec()),
                player_points: Some(player_points),
            })?;
            winners.push(*actor);
        }

        if !winners.is_empty() {
            let renchan = winners.contains(&oya);
            self.update_next_oya(renchan);
        }
        Ok(winners)
    }

    /// Exhaustive draw: tenpai hands collect the noten payment and dealer
    /// rotation follows the dealer's tenpai status.
    fn process_ryukyoku(&mut self) -> Result<()> {
        let mut tenpai = [false; 4];
        for seat in 0..4u8 {
            tenpai[seat as usize] = self.board.player(seat).is_tenpai()?;
        }
        let tenpai_count = tenpai.iter().filter(|&&t| t).count();
        let mut deltas = [0i32; 4];
        if (1..=3).contains(&tenpai_count) {
            let gain = 3000 / tenpai_count as i32;
            let loss = 3000 / (4 - tenpai_count) as i32;
            for seat in 0..4 {
                deltas[seat] = if tenpai[seat] { gain } else { -loss };
            }
        }
        self.board.do_action(&Action::Ryukyoku {
            reason: "exhaustive_draw".into(),
            deltas: Some(deltas.to_vec()),
        })?;
        let oya = self.board.oya().unwrap_or(0);
        self.update_next_oya(tenpai[oya as usize]);
        Ok(())
    }

    fn update_next_oya(&mut self, renchan: bool) {
        let oya = self.board.oya().unwrap_or(0);
        if renchan {
            self.next_oya = oya;
            return;
        }
        let final_wind = match self.game_type {
            GameType::OneKyoku => None,
            GameType::EastOnly => Some("E"),
            GameType::HalfGame => Some("S"),
        };
        let at_final_seat = final_wind
            .map(|wind| self.board.bakaze() == wind.parse().ok() && oya == 3)
            .unwrap_or(false);
        if at_final_seat {
            self.last = true;
        } else {
            self.next_oya = (oya + 1) % 4;
        }
    }
}

/// Response arbitration. Wins outrank everything and all of them proceed,
/// ordered by seat distance from the seat they target; otherwise a single
/// call is kept, triplet and quad calls outranking sequence calls.
fn choose_actions(responses: &[Option<Action>; 4]) -> Vec<Action> {
    let mut horas: Vec<Action> = responses
        .iter()
        .flatten()
        .filter(|r| matches!(r, Action::Hora { .. }))
        .cloned()
        .collect();
    if !horas.is_empty() {
        horas.sort_by_key(|declaration| {
            let actor = declaration.actor().unwrap_or(0);
            let target = declaration.target().unwrap_or(actor);
            (4 + actor - target) % 4
        });
        return horas;
    }

    let mut chosen: Option<Action> = None;
    for response in responses.iter().flatten() {
        match response {
            Action::Pon { .. } | Action::Daiminkan { .. } => {
                if !matches!(
                    chosen,
                    Some(Action::Pon { .. }) | Some(Action::Daiminkan { .. })
                ) {
                    chosen = Some(response.clone());
                }
            }
            _ => {
                if chosen.is_none() {
                    chosen = Some(response.clone());
                }
            }
        }
    }
    chosen.into_iter().collect()
}
