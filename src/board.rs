use crate::action::{encode_action, Action};
use crate::error::{EngineError, Result};
use crate::player::Player;
use crate::strategy::Strategy;
use crate::tile::Tile;

/// Shared match state: the four seats, the round context, and the protocol.
///
/// `do_action` is the only way state advances. It applies one action, shows
/// each seat its own redacted view, collects the four optional responses and
/// checks them against the legality table before handing them back to the
/// caller. Players never touch the board directly; they only see views and
/// propose responses.
pub struct Board {
    players: [Player; 4],
    strategies: [Box<dyn Strategy>; 4],
    all_tiles: Vec<Tile>,
    bakaze: Option<Tile>,
    honba: u32,
    oya: Option<u8>,
    dora_markers: Vec<Tile>,
    previous_action: Option<Action>,
    current_actor: Option<u8>,
    journal: Vec<String>,
    /// Live seats must answer when the protocol demands it. A board fed
    /// from a prerecorded stream expects silence instead.
    expect_responses: bool,
}

impl Board {
    pub fn new(strategies: [Box<dyn Strategy>; 4]) -> Board {
        Board {
            players: [Player::new(0), Player::new(1), Player::new(2), Player::new(3)],
            strategies,
            all_tiles: Vec::new(),
            bakaze: None,
            honba: 0,
            oya: None,
            dora_markers: Vec::new(),
            previous_action: None,
            current_actor: None,
            journal: Vec::new(),
            expect_responses: true,
        }
    }

    /// A board that only absorbs an action stream: seats are not required
    /// (or allowed) to answer, as in replay playback.
    pub fn passive(strategies: [Box<dyn Strategy>; 4]) -> Board {
        let mut board = Board::new(strategies);
        board.expect_responses = false;
        board
    }

    pub fn players(&self) -> &[Player; 4] {
        &self.players
    }

    pub fn player(&self, seat: u8) -> &Player {
        &self.players[seat as usize]
    }

    /// The full 136-tile set, fixed at game start.
    pub fn all_tiles(&self) -> &[Tile] {
        &self.all_tiles
    }

    pub fn bakaze(&self) -> Option<Tile> {
        self.bakaze
    }

    pub fn honba(&self) -> u32 {
        self.honba
    }

    pub fn oya(&self) -> Option<u8> {
        self.oya
    }

    pub fn dora_markers(&self) -> &[Tile] {
        &self.dora_markers
    }

    /// Bonus tiles the revealed markers indicate.
    pub fn doras(&self) -> Vec<Tile> {
        self.dora_markers.iter().map(|m| m.succ()).collect()
    }

    pub fn previous_action(&self) -> Option<&Action> {
        self.previous_action.as_ref()
    }

    /// The seat that acted last. A call moves this to the caller, which is
    /// what reorders the turn after an accepted claim.
    pub fn current_actor(&self) -> Option<u8> {
        self.current_actor
    }

    /// Unredacted event journal, one JSON action per line.
    pub fn journal(&self) -> &[String] {
        &self.journal
    }

    /// Applies one action: round bookkeeping, per-seat redacted delivery,
    /// response collection, protocol validation.
    pub fn do_action(&mut self, action: &Action) -> Result<[Option<Action>; 4]> {
        if let Some(actor) = action.actor() {
            self.current_actor = Some(actor);
        }
        match action {
            Action::StartGame { .. } => {
                self.all_tiles = Tile::full_set();
            }
            Action::StartKyoku { oya, dora_marker } => {
                if self.oya == Some(*oya) {
                    self.honba += 1;
                } else {
                    if *oya == 0 {
                        self.bakaze = Some(match self.bakaze {
                            Some(wind) => wind.succ(),
                            None => "E".parse()?,
                        });
                    }
                    self.honba = 0;
                }
                self.oya = Some(*oya);
                self.dora_markers = vec![*dora_marker];
            }
            Action::Dora { dora_marker } => {
                self.dora_markers.push(*dora_marker);
            }
            _ => {}
        }

        self.journal.push(encode_action(action)?);

        let views = [
            self.action_in_view(action, 0),
            self.action_in_view(action, 1),
            self.action_in_view(action, 2),
            self.action_in_view(action, 3),
        ];
        for (seat, view) in views.iter().enumerate() {
            self.players[seat].process_action(view, self.previous_action.as_ref())?;
        }

        let mut responses: [Option<Action>; 4] = [None, None, None, None];
        for (seat, view) in views.iter().enumerate() {
            responses[seat] = self.strategies[seat].respond(&self.players[seat], view);
        }
        self.validate_responses(&responses, action)?;

        self.previous_action = Some(action.clone());
        Ok(responses)
    }

    /// The action as the given seat is entitled to see it. Game start tells
    /// each seat who it is; deals and draws conceal tiles from everyone but
    /// the actor; every other action is public.
    pub fn action_in_view(&self, action: &Action, viewer: u8) -> Action {
        match action {
            Action::StartGame { names, .. } => Action::StartGame {
                id: Some(viewer),
                names: names.clone(),
            },
            Action::Haipai { actor, pais } if *actor != viewer => Action::Haipai {
                actor: *actor,
                pais: vec![None; pais.len()],
            },
            Action::Tsumo { actor, .. } if *actor != viewer => Action::Tsumo {
                actor: *actor,
                pai: None,
            },
            _ => action.clone(),
        }
    }

    fn validate_responses(
        &self,
        responses: &[Option<Action>; 4],
        action: &Action,
    ) -> Result<()> {
        for seat in 0..4u8 {
            let response = responses[seat as usize].as_ref();
            if let Some(r) = response {
                if r.actor() != Some(seat) {
                    return Err(EngineError::Protocol(format!(
                        "seat {seat} answered as actor {:?}",
                        r.actor()
                    )));
                }
            }
            let is_actor = action.actor() == Some(seat);
            if !self.expect_responses {
                if response.is_some() {
                    return Err(EngineError::Protocol(format!(
                        "seat {seat} answered on a passive board"
                    )));
                }
                continue;
            }
            let valid = match action {
                Action::StartGame { .. }
                | Action::StartKyoku { .. }
                | Action::Haipai { .. }
                | Action::EndKyoku
                | Action::EndGame
                | Action::Hora { .. }
                | Action::Ryukyoku { .. }
                | Action::Dora { .. }
                | Action::ReachAccepted { .. } => response.is_none(),
                Action::Tsumo { .. } => {
                    if is_actor {
                        matches!(
                            response,
                            Some(
                                Action::Dahai { .. }
                                    | Action::Reach { .. }
                                    | Action::Ankan { .. }
                                    | Action::Kakan { .. }
                                    | Action::Hora { .. }
                            )
                        )
                    } else {
                        response.is_none()
                    }
                }
                Action::Dahai { .. } => {
                    if is_actor {
                        response.is_none()
                    } else {
                        matches!(
                            response,
                            None | Some(
                                Action::Chi { .. }
                                    | Action::Pon { .. }
                                    | Action::Daiminkan { .. }
                                    | Action::Hora { .. }
                            )
                        )
                    }
                }
                Action::Chi { .. } | Action::Pon { .. } | Action::Reach { .. } => {
                    if is_actor {
                        matches!(response, Some(Action::Dahai { .. }))
                    } else {
                        response.is_none()
                    }
                }
                // The actor waits for the replacement draw; nobody else
                // may interject on these quads.
                Action::Ankan { .. } | Action::Daiminkan { .. } => response.is_none(),
                Action::Kakan { .. } => {
                    if is_actor {
                        response.is_none()
                    } else {
                        matches!(response, None | Some(Action::Hora { .. }))
                    }
                }
            };
            if !valid {
                return Err(EngineError::Protocol(format!(
                    "seat {seat} answered {} to {}",
                    response.map(|r| r.kind()).unwrap_or("nothing"),
                    action.kind()
                )));
            }
        }
        Ok(())
    }
}
