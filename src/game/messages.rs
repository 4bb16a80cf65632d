use serde::{Deserialize, Serialize};

/// Messages sent from a game client over the WebSocket.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join { name: String },
    Chat { text: String },
    StartGame,
    GetRole,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    Discussion,
    Voting,
    Ended,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Innocents,
    Impostor,
}

/// Per-player role payload sent at round start and re-sent on `get_role`.
/// The impostor only ever sees the hint; everyone else sees the word.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleReveal {
    Impostor { hint: String },
    Innocent { word: String },
}

/// Messages sent from the server to game clients.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    LobbyUpdate {
        players: Vec<String>,
    },
    Error {
        message: String,
    },
    Chat {
        from: String,
        text: String,
    },
    System {
        message: String,
    },
    PhaseChange {
        phase: Phase,
        message: String,
    },
    Role(RoleReveal),
    /// Counts only; ballots and voter identities are never broadcast.
    VoteUpdate {
        total_votes: usize,
        required_votes: usize,
    },
    GameResult {
        winner: Winner,
        message: String,
        impostor: String,
        word: String,
        hint: String,
    },
}

impl ServerMessage {
    pub fn to_ws_text(&self) -> Result<axum::extract::ws::Message, serde_json::Error> {
        serde_json::to_string(self)
            .map(|json_string| axum::extract::ws::Message::Text(json_string.into()))
    }
}

pub fn client_message_from_ws_text(text: &str) -> Result<ClientMessage, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_messages_use_the_expected_wire_shape() {
        let msg = client_message_from_ws_text(r#"{"type": "join", "name": "Alice"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Join { name } if name == "Alice"));

        let msg = client_message_from_ws_text(r#"{"type": "start_game"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::StartGame));

        assert!(client_message_from_ws_text(r#"{"type": "launch_missiles"}"#).is_err());
    }

    #[test]
    fn role_payloads_flatten_into_the_tagged_object() {
        let impostor = ServerMessage::Role(RoleReveal::Impostor {
            hint: "Fruit".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&impostor).unwrap(),
            json!({"type": "role", "role": "impostor", "hint": "Fruit"})
        );

        let innocent = ServerMessage::Role(RoleReveal::Innocent {
            word: "Apple".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&innocent).unwrap(),
            json!({"type": "role", "role": "innocent", "word": "Apple"})
        );
    }

    #[test]
    fn phases_and_winners_serialize_snake_case() {
        let msg = ServerMessage::PhaseChange {
            phase: Phase::Discussion,
            message: "go".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "phase_change", "phase": "discussion", "message": "go"})
        );

        assert_eq!(serde_json::to_value(Winner::Innocents).unwrap(), json!("innocents"));
    }
}
