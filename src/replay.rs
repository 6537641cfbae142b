use crate::action::{decode_action, Action};
use crate::board::Board;
use crate::error::Result;
use crate::strategy::Puppet;

/// Plays a prerecorded action stream into a board of silent seats.
///
/// The stream is injected exactly as if the match driver had produced it:
/// every action goes through the same redaction, per-seat delivery and
/// response validation. The loader producing the stream is an external
/// collaborator; its only obligation is the per-kind field contract of
/// [`Action`].
pub struct ReplayBoard {
    board: Board,
}

impl ReplayBoard {
    pub fn new() -> ReplayBoard {
        ReplayBoard {
            board: Board::passive([
                Box::new(Puppet),
                Box::new(Puppet),
                Box::new(Puppet),
                Box::new(Puppet),
            ]),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn apply(&mut self, action: &Action) -> Result<()> {
        self.board.do_action(action)?;
        Ok(())
    }

    pub fn play<I>(&mut self, actions: I) -> Result<()>
    where
        I: IntoIterator<Item = Action>,
    {
        for action in actions {
            self.apply(&action)?;
        }
        Ok(())
    }

    /// Replays a journal: one JSON action per non-empty line.
    pub fn play_json_lines(&mut self, text: &str) -> Result<()> {
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            self.apply(&decode_action(line)?)?;
        }
        Ok(())
    }
}

impl Default for ReplayBoard {
    fn default() -> Self {
        ReplayBoard::new()
    }
}
