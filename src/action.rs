use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tile::Tile;

/// Every event and command exchanged during a match, one variant per kind.
///
/// An `Action` is both the internal event applied to the board and the unit
/// handed to external collaborators; the serialized form is one JSON object
/// per action, tagged by `type`. Seats are indices 0..3. Tile fields that a
/// viewer may not be entitled to see are `Option<Tile>`, with `None` as the
/// concealed sentinel a redacted view carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    StartGame {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        names: Option<Vec<String>>,
    },
    StartKyoku {
        oya: u8,
        dora_marker: Tile,
    },
    Haipai {
        actor: u8,
        pais: Vec<Option<Tile>>,
    },
    Tsumo {
        actor: u8,
        pai: Option<Tile>,
    },
    Dahai {
        actor: u8,
        pai: Tile,
    },
    Chi {
        actor: u8,
        target: u8,
        pai: Tile,
        consumed: Vec<Tile>,
    },
    Pon {
        actor: u8,
        target: u8,
        pai: Tile,
        consumed: Vec<Tile>,
    },
    Daiminkan {
        actor: u8,
        target: u8,
        pai: Tile,
        consumed: Vec<Tile>,
    },
    Ankan {
        actor: u8,
        consumed: Vec<Tile>,
    },
    Kakan {
        actor: u8,
        pai: Tile,
        consumed: Vec<Tile>,
    },
    Reach {
        actor: u8,
    },
    ReachAccepted {
        actor: u8,
    },
    Hora {
        actor: u8,
        target: u8,
        pai: Tile,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fu: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fan: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hora_points: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deltas: Option<Vec<i32>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_points: Option<Vec<i32>>,
    },
    Ryukyoku {
        reason: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deltas: Option<Vec<i32>>,
    },
    Dora {
        dora_marker: Tile,
    },
    EndKyoku,
    EndGame,
}

impl Action {
    /// The seat performing this action, when one is named.
    pub fn actor(&self) -> Option<u8> {
        match *self {
            Action::Haipai { actor, .. }
            | Action::Tsumo { actor, .. }
            | Action::Dahai { actor, .. }
            | Action::Chi { actor, .. }
            | Action::Pon { actor, .. }
            | Action::Daiminkan { actor, .. }
            | Action::Ankan { actor, .. }
            | Action::Kakan { actor, .. }
            | Action::Reach { actor }
            | Action::ReachAccepted { actor }
            | Action::Hora { actor, .. } => Some(actor),
            _ => None,
        }
    }

    /// The seat this action is directed at (the discarder of a called tile,
    /// or the dealt-in seat of a win).
    pub fn target(&self) -> Option<u8> {
        match *self {
            Action::Chi { target, .. }
            | Action::Pon { target, .. }
            | Action::Daiminkan { target, .. }
            | Action::Hora { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Action::StartGame { .. } => "start_game",
            Action::StartKyoku { .. } => "start_kyoku",
            Action::Haipai { .. } => "haipai",
            Action::Tsumo { .. } => "tsumo",
            Action::Dahai { .. } => "dahai",
            Action::Chi { .. } => "chi",
            Action::Pon { .. } => "pon",
            Action::Daiminkan { .. } => "daiminkan",
            Action::Ankan { .. } => "ankan",
            Action::Kakan { .. } => "kakan",
            Action::Reach { .. } => "reach",
            Action::ReachAccepted { .. } => "reach_accepted",
            Action::Hora { .. } => "hora",
            Action::Ryukyoku { .. } => "ryukyoku",
            Action::Dora { .. } => "dora",
            Action::EndKyoku => "end_kyoku",
            Action::EndGame => "end_game",
        }
    }
}

/// Encodes one action as a single JSON object.
pub fn encode_action(action: &Action) -> Result<String> {
    Ok(serde_json::to_string(action)?)
}

/// Decodes one action from a single JSON object.
pub fn decode_action(text: &str) -> Result<Action> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_round_trip() {
        let action = Action::Pon {
            actor: 2,
            target: 1,
            pai: "5pr".parse().unwrap(),
            consumed: vec!["5p".parse().unwrap(), "5p".parse().unwrap()],
        };
        let json = encode_action(&action).unwrap();
        assert_eq!(
            json,
            r#"{"type":"pon","actor":2,"target":1,"pai":"5pr","consumed":["5p","5p"]}"#
        );
        assert_eq!(decode_action(&json).unwrap(), action);
    }

    #[test]
    fn optional_fields_stay_absent() {
        let action = Action::Hora {
            actor: 0,
            target: 3,
            pai: "E".parse().unwrap(),
            fu: None,
            fan: None,
            hora_points: None,
            deltas: None,
            player_points: None,
        };
        let json = encode_action(&action).unwrap();
        assert_eq!(json, r#"{"type":"hora","actor":0,"target":3,"pai":"E"}"#);
        assert_eq!(decode_action(&json).unwrap(), action);
    }

    #[test]
    fn concealed_draw_serializes_as_null() {
        let action = Action::Tsumo { actor: 1, pai: None };
        let json = encode_action(&action).unwrap();
        assert_eq!(json, r#"{"type":"tsumo","actor":1,"pai":null}"#);
        assert_eq!(decode_action(&json).unwrap(), action);
    }
}
