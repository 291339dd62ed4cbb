use serde::{Deserialize, Deserializer, Serialize};

use crate::drawing::{PixelPoint, Rgb};
use crate::error::Result;
use crate::game::Guess;

/// Role a connection registers as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientRole {
    Drawer,
    Guesser,
}

/// Message types sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Register {
        role: ClientRole,
    },
    Draw {
        #[serde(deserialize_with = "pixel_coord")]
        x: i32,
        #[serde(deserialize_with = "pixel_coord")]
        y: i32,
        drawing: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<Rgb>,
    },
    Clear,
    /// Pre-encoded canvas pushed by the drawer, relayed as is
    CanvasUpdate {
        #[serde(default)]
        canvas: Option<String>,
    },
    Guess {
        guess: String,
    },
    Reset,
    /// Any unrecognized `type`
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn draw(at: PixelPoint, drawing: bool, color: Option<Rgb>) -> Self {
        ClientMessage::Draw {
            x: at.x,
            y: at.y,
            drawing,
            color,
        }
    }
}

/// Browsers report fractional pointer positions; truncate to pixels
fn pixel_coord<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("coordinate is not finite"));
    }
    Ok(value as i32)
}

/// Message types sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    GameState {
        current_word: String,
        is_game_active: bool,
    },
    CanvasUpdate {
        canvas: String,
    },
    GuessResult {
        guess: String,
        is_correct: bool,
        #[serde(default)]
        guesses: Vec<Guess>,
    },
    GameReset {
        current_word: String,
    },
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_register() {
        let msg = ClientMessage::parse(r#"{"type":"register","role":"guesser"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Register {
                role: ClientRole::Guesser
            }
        );
    }

    #[test]
    fn test_parse_draw_with_and_without_color() {
        let msg =
            ClientMessage::parse(r#"{"type":"draw","x":10,"y":20,"drawing":true,"color":[255,0,0]}"#)
                .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Draw {
                x: 10,
                y: 20,
                drawing: true,
                color: Some(Rgb::RED)
            }
        );

        let msg = ClientMessage::parse(r#"{"type":"draw","x":10.7,"y":20.2,"drawing":false}"#)
            .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Draw {
                x: 10,
                y: 20,
                drawing: false,
                color: None
            }
        );
    }

    #[test]
    fn test_unknown_type() {
        let msg = ClientMessage::parse(r#"{"type":"dance","speed":3}"#).unwrap();
        assert_eq!(msg, ClientMessage::Unknown);
    }

    #[test]
    fn test_malformed_messages_are_errors() {
        assert!(ClientMessage::parse("not json").is_err());
        assert!(ClientMessage::parse(r#"{"role":"drawer"}"#).is_err());
        assert!(ClientMessage::parse(r#"{"type":"guess"}"#).is_err());
        assert!(ClientMessage::parse(r#"{"type":"register","role":"judge"}"#).is_err());
    }

    #[test]
    fn test_canvas_update_without_payload() {
        let msg = ClientMessage::parse(r#"{"type":"canvas_update"}"#).unwrap();
        assert_eq!(msg, ClientMessage::CanvasUpdate { canvas: None });
    }

    #[test]
    fn test_client_draw_serialization() {
        let msg = ClientMessage::draw(PixelPoint::new(3, 4), true, Some(Rgb::GREEN));
        let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"type": "draw", "x": 3, "y": 4, "drawing": true, "color": [0, 255, 0]})
        );
    }

    #[test]
    fn test_server_guess_result_shape() {
        let msg = ServerMessage::GuessResult {
            guess: "apple".to_string(),
            is_correct: false,
            guesses: vec![Guess {
                text: "apple".to_string(),
                correct: false,
            }],
        };
        let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "guess_result",
                "guess": "apple",
                "is_correct": false,
                "guesses": [{"guess": "apple", "is_correct": false}]
            })
        );
    }

    #[test]
    fn test_server_message_roundtrip_game_state() {
        let text = r#"{"type":"game_state","current_word":"banana","is_game_active":true}"#;
        let msg = ServerMessage::parse(text).unwrap();
        assert_eq!(
            msg,
            ServerMessage::GameState {
                current_word: "banana".to_string(),
                is_game_active: true
            }
        );
    }
}
