// Decoding of the client's pushed event frames into typed domain events.
// Frames look like [8, "OnJsonApiEvent", {uri, eventType, data}]; everything
// off the two tracked URIs is dropped silently.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AgentError, Result};

pub const GAMEFLOW_PHASE_URI: &str = "/lol-gameflow/v1/gameflow-phase";
pub const CHAMP_SELECT_SESSION_URI: &str = "/lol-champ-select/v1/session";

const EVENT_OPCODE: i64 = 8;

/// Gameflow phase as reported by the client. Wire values outside the closed
/// set collapse onto `None`; the in-game aliases (`GameStart`, `Reconnect`)
/// and the post-game trio fold into their logical phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameflowPhase {
    None,
    Lobby,
    Matchmaking,
    ReadyCheck,
    ChampSelect,
    InProgress,
    PostGame,
}

impl GameflowPhase {
    pub fn parse(value: &str) -> GameflowPhase {
        match value {
            "Lobby" => GameflowPhase::Lobby,
            "Matchmaking" => GameflowPhase::Matchmaking,
            "ReadyCheck" => GameflowPhase::ReadyCheck,
            "ChampSelect" => GameflowPhase::ChampSelect,
            "InProgress" | "GameStart" | "Reconnect" => GameflowPhase::InProgress,
            "PostGame" | "PreEndOfGame" | "EndOfGame" | "WaitingForStats" => GameflowPhase::PostGame,
            _ => GameflowPhase::None,
        }
    }
}

/// Full champion-select session snapshot. The decoder never diffs; the draft
/// model folds each snapshot against its own state.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChampSelectSession {
    pub game_id: i64,
    #[serde(default = "missing_cell_id")]
    pub local_player_cell_id: i64,
    pub actions: Vec<Vec<ChampSelectAction>>,
    pub my_team: Vec<ChampSelectCell>,
    pub their_team: Vec<ChampSelectCell>,
    pub bans: ChampSelectBans,
}

fn missing_cell_id() -> i64 {
    -1
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChampSelectAction {
    pub id: i64,
    pub actor_cell_id: i64,
    pub champion_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub completed: bool,
    pub is_in_progress: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChampSelectCell {
    pub cell_id: i64,
    pub champion_id: i64,
    pub champion_pick_intent: i64,
    pub assigned_position: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChampSelectBans {
    pub my_team_bans: Vec<i64>,
    pub their_team_bans: Vec<i64>,
}

#[derive(Debug, Clone)]
pub enum LcuEvent {
    PhaseChanged(GameflowPhase),
    ChampSelectSnapshot(Box<ChampSelectSession>),
}

/// Decode one WebSocket text frame. `Ok(None)` means irrelevant traffic
/// (wrong opcode, untracked uri, deletion events, keepalive blanks);
/// `Err(Decode)` means the frame claimed to be relevant but did not parse.
pub fn decode(text: &str) -> Result<Option<LcuEvent>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let frame: Value = serde_json::from_str(text)
        .map_err(|e| AgentError::Decode(format!("unparsable frame: {}", e)))?;
    let parts = match frame.as_array() {
        Some(parts) => parts,
        None => return Ok(None),
    };
    if parts.first().and_then(Value::as_i64) != Some(EVENT_OPCODE) {
        return Ok(None);
    }
    let body = match parts.get(2) {
        Some(body) => body,
        None => return Err(AgentError::Decode("event frame without body".into())),
    };
    let uri = body.get("uri").and_then(Value::as_str).unwrap_or_default();
    let event_type = body
        .get("eventType")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let data = body.get("data").cloned().unwrap_or(Value::Null);

    match uri {
        GAMEFLOW_PHASE_URI => decode_phase(&data).map(Some),
        CHAMP_SELECT_SESSION_URI => {
            if event_type == "Delete" {
                // The session resource disappears when champ select ends; the
                // gameflow phase event carries the actual transition.
                return Ok(None);
            }
            decode_session(data).map(Some)
        }
        _ => Ok(None),
    }
}

pub fn decode_phase(data: &Value) -> Result<LcuEvent> {
    let phase = data
        .as_str()
        .ok_or_else(|| AgentError::Decode("gameflow phase payload is not a string".into()))?;
    Ok(LcuEvent::PhaseChanged(GameflowPhase::parse(phase)))
}

pub fn decode_session(data: Value) -> Result<LcuEvent> {
    let session: ChampSelectSession = serde_json::from_value(data)
        .map_err(|e| AgentError::Decode(format!("bad champ select session: {}", e)))?;
    Ok(LcuEvent::ChampSelectSnapshot(Box::new(session)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_phase_event() {
        let frame = r#"[8, "OnJsonApiEvent", {
            "uri": "/lol-gameflow/v1/gameflow-phase",
            "eventType": "Update",
            "data": "ChampSelect"
        }]"#;
        match decode(frame).expect("frame should decode") {
            Some(LcuEvent::PhaseChanged(phase)) => {
                assert_eq!(phase, GameflowPhase::ChampSelect)
            }
            other => panic!("unexpected decode result: {:?}", other),
        }
    }

    #[test]
    fn decodes_champ_select_snapshot() {
        let frame = r#"[8, "OnJsonApiEvent", {
            "uri": "/lol-champ-select/v1/session",
            "eventType": "Update",
            "data": {
                "gameId": 712,
                "localPlayerCellId": 2,
                "actions": [[
                    {"id": 1, "actorCellId": 2, "championId": 103,
                     "type": "pick", "completed": true, "isInProgress": false}
                ]],
                "myTeam": [{"cellId": 2, "championId": 103,
                            "championPickIntent": 0, "assignedPosition": "middle"}],
                "theirTeam": [],
                "bans": {"myTeamBans": [157], "theirTeamBans": []}
            }
        }]"#;
        match decode(frame).expect("frame should decode") {
            Some(LcuEvent::ChampSelectSnapshot(session)) => {
                assert_eq!(session.game_id, 712);
                assert_eq!(session.local_player_cell_id, 2);
                assert_eq!(session.actions[0][0].champion_id, 103);
                assert_eq!(session.my_team[0].assigned_position, "middle");
                assert_eq!(session.bans.my_team_bans, vec![157]);
            }
            other => panic!("unexpected decode result: {:?}", other),
        }
    }

    #[test]
    fn ignores_untracked_uris() {
        let frame = r#"[8, "OnJsonApiEvent", {
            "uri": "/lol-chat/v1/friends",
            "eventType": "Update",
            "data": {}
        }]"#;
        assert!(decode(frame).expect("frame should decode").is_none());
    }

    #[test]
    fn ignores_non_event_opcodes_and_blanks() {
        assert!(decode("[3, \"ack\"]").unwrap().is_none());
        assert!(decode("").unwrap().is_none());
        assert!(decode("   ").unwrap().is_none());
    }

    #[test]
    fn ignores_session_deletion() {
        let frame = r#"[8, "OnJsonApiEvent", {
            "uri": "/lol-champ-select/v1/session",
            "eventType": "Delete",
            "data": null
        }]"#;
        assert!(decode(frame).unwrap().is_none());
    }

    #[test]
    fn malformed_relevant_frame_is_a_decode_error() {
        let frame = r#"[8, "OnJsonApiEvent", {
            "uri": "/lol-gameflow/v1/gameflow-phase",
            "eventType": "Update",
            "data": 42
        }]"#;
        assert!(matches!(decode(frame), Err(AgentError::Decode(_))));
    }

    #[test]
    fn unknown_phase_maps_to_none() {
        assert_eq!(
            GameflowPhase::parse("TerminatedInError"),
            GameflowPhase::None
        );
        assert_eq!(GameflowPhase::parse("Reconnect"), GameflowPhase::InProgress);
        assert_eq!(GameflowPhase::parse("EndOfGame"), GameflowPhase::PostGame);
    }

    #[test]
    fn partial_session_fills_defaults() {
        let session: ChampSelectSession = serde_json::from_str(r#"{"myTeam": []}"#).unwrap();
        assert_eq!(session.local_player_cell_id, -1);
        assert!(session.actions.is_empty());
        assert_eq!(session.game_id, 0);
    }
}
