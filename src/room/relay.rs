use axum::extract::ws::Message;
use std::path::PathBuf;
use tokio::sync::mpsc::Sender;
use uuid::Uuid;

use crate::drawing::{save_snapshot, PixelPoint};
use crate::game::GameState;
use crate::room::connection::{Audience, Connection, ConnectionSet, Delivery};
use crate::websocket::message::{ClientMessage, ServerMessage};

/// Owns the game and every connection, and routes client events.
///
/// All mutation goes through `&mut self`, so callers serialize access
/// behind a single lock.
pub struct Relay {
    connections: ConnectionSet,
    game: GameState,
    snapshot_dir: Option<PathBuf>,
}

impl Relay {
    pub fn new(game: GameState) -> Self {
        Self {
            connections: ConnectionSet::new(),
            game,
            snapshot_dir: None,
        }
    }

    /// Archive the finished canvas here whenever a round is won
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    /// Register a new connection with no role
    pub fn connect(&mut self, id: Uuid, sender: Sender<Message>) -> bool {
        self.connections.add(id, Connection::new(sender))
    }

    /// Drop a connection from every set
    pub fn disconnect(&mut self, id: &Uuid) -> bool {
        self.connections.remove(id).is_some()
    }

    /// Apply one client event to completion
    pub fn dispatch(&mut self, id: Uuid, msg: ClientMessage) {
        match msg {
            ClientMessage::Register { role } => {
                if !self.connections.assign_role(id, role) {
                    tracing::warn!("Register from unknown connection {}", id);
                    return;
                }
                tracing::info!("Connection {} registered as {:?}", id, role);
                let state = ServerMessage::GameState {
                    current_word: self.game.secret_word().to_string(),
                    is_game_active: self.game.is_active(),
                };
                self.send(Audience::Only(id), &state);
            }
            ClientMessage::Draw {
                x,
                y,
                drawing,
                color,
            } => {
                self.game.apply_draw(PixelPoint::new(x, y), drawing, color);
                self.broadcast_canvas();
            }
            ClientMessage::Clear => {
                self.game.clear();
                self.broadcast_canvas();
            }
            ClientMessage::CanvasUpdate { canvas } => match canvas {
                Some(canvas) if !canvas.is_empty() => {
                    self.send(Audience::Guessers, &ServerMessage::CanvasUpdate { canvas });
                }
                _ => tracing::debug!("Empty canvas_update from {} ignored", id),
            },
            ClientMessage::Guess { guess } => {
                let is_correct = self.game.submit_guess(&guess);
                tracing::info!("Guess {:?} from {}: correct={}", guess, id, is_correct);

                let result = ServerMessage::GuessResult {
                    guess,
                    is_correct,
                    guesses: self.game.guesses().to_vec(),
                };
                self.send(Audience::All, &result);

                if is_correct {
                    self.archive_canvas();
                    self.reset_round();
                }
            }
            ClientMessage::Reset => self.reset_round(),
            ClientMessage::Unknown => {
                tracing::warn!("Unknown message type from {} ignored", id);
            }
        }
    }

    fn reset_round(&mut self) {
        self.game.reset();
        let reset = ServerMessage::GameReset {
            current_word: self.game.secret_word().to_string(),
        };
        self.send(Audience::All, &reset);
    }

    fn broadcast_canvas(&mut self) {
        match self.game.canvas().to_base64_jpeg() {
            Ok(canvas) => self.send(Audience::Guessers, &ServerMessage::CanvasUpdate { canvas }),
            Err(e) => tracing::warn!("Failed to encode canvas: {}", e),
        }
    }

    fn archive_canvas(&self) {
        if let Some(dir) = &self.snapshot_dir {
            if let Err(e) = save_snapshot(dir, self.game.canvas()) {
                tracing::warn!("Failed to save snapshot: {}", e);
            }
        }
    }

    /// Queue a message for an audience. Peers whose writer is gone are pruned.
    fn send(&mut self, audience: Audience, msg: &ServerMessage) {
        let text = match msg.to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to serialize {:?}: {}", msg, e);
                return;
            }
        };

        let mut closed = Vec::new();
        for id in self.connections.recipients(audience) {
            let Some(conn) = self.connections.get(&id) else {
                continue;
            };
            match conn.send(Message::Text(text.clone())) {
                Delivery::Sent => {}
                Delivery::Dropped => {
                    tracing::warn!("Outbound queue full for {}, message dropped", id);
                }
                Delivery::Closed => closed.push(id),
            }
        }

        for id in closed {
            self.connections.remove(&id);
            tracing::info!("Removed disconnected connection {}", id);
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn connections(&self) -> &ConnectionSet {
        &self.connections
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_full(&self) -> bool {
        self.connections.is_full()
    }
}
