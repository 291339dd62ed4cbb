use std::path::Path;
use std::time::Instant;

use crate::client::guess::{guess_or_none, GuessCapability};
use crate::drawing::{save_snapshot, Canvas, STROKE_WIDTH};
use crate::error::Result;
use crate::game::Guess;
use crate::gesture::{InputConfig, InputEvent, InputStateMachine, LandmarkFrame};
use crate::websocket::message::{ClientMessage, ServerMessage};

/// Operator command typed on the drawer's console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Clear,
    Reset,
    Upload,
    Guess,
    Hint(String),
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        match head {
            "c" => Some(Command::Clear),
            "r" => Some(Command::Reset),
            "f" => Some(Command::Upload),
            "g" => Some(Command::Guess),
            "h" if !rest.is_empty() => Some(Command::Hint(rest.to_string())),
            "q" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// What the drawer knows about the shared round
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteView {
    pub current_word: String,
    pub is_game_active: bool,
    pub guesses: Vec<Guess>,
    pub show_correct_answer: bool,
    pub hint: Option<String>,
    pub ai_guess: Option<String>,
}

/// Drawer side of a session: gesture input, local canvas and the remote view
pub struct DrawerSession {
    input: InputStateMachine,
    canvas: Canvas,
    view: RemoteView,
}

impl DrawerSession {
    pub fn new(config: InputConfig) -> Result<Self> {
        let canvas = Canvas::new(config.frame_size.width, config.frame_size.height)?;
        Ok(Self {
            input: InputStateMachine::new(config),
            canvas,
            view: RemoteView::default(),
        })
    }

    /// Feed one captured frame. Returns the messages to send to the relay.
    pub fn on_frame(&mut self, frame: Option<&LandmarkFrame>, now: Instant) -> Vec<ClientMessage> {
        let mut outbound = Vec::new();
        for event in self.input.process(frame, now) {
            match event {
                InputEvent::StrokeStart { at, color } => {
                    outbound.push(ClientMessage::draw(at, true, Some(color)));
                }
                InputEvent::StrokeSegment { from, to, color } => {
                    self.canvas.draw_line(from, to, color, STROKE_WIDTH);
                    outbound.push(ClientMessage::draw(to, true, Some(color)));
                }
                InputEvent::StrokeEnd { at, color } => {
                    outbound.push(ClientMessage::draw(at, false, Some(color)));
                }
                InputEvent::ColorSelected { .. } => {}
            }
        }
        outbound
    }

    pub fn handle_server_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::GameState {
                current_word,
                is_game_active,
            } => {
                tracing::info!("Current word: {}", current_word);
                self.view.current_word = current_word;
                self.view.is_game_active = is_game_active;
            }
            ServerMessage::GuessResult {
                guess,
                is_correct,
                guesses,
            } => {
                tracing::info!("Guess {:?}: correct={}", guess, is_correct);
                if guesses.is_empty() {
                    self.view.guesses.push(Guess {
                        text: guess,
                        correct: is_correct,
                    });
                } else {
                    self.view.guesses = guesses;
                }
                if is_correct {
                    self.view.show_correct_answer = true;
                }
            }
            ServerMessage::GameReset { current_word } => {
                tracing::info!("Game reset, new word: {}", current_word);
                self.view.current_word = current_word;
                self.view.is_game_active = true;
                self.view.guesses.clear();
                self.view.show_correct_answer = false;
                self.canvas.clear();
            }
            ServerMessage::CanvasUpdate { .. } => {
                tracing::debug!("Ignoring canvas_update on drawer");
            }
            ServerMessage::Unknown => {
                tracing::warn!("Unknown server message ignored");
            }
        }
    }

    /// Clear locally and ask the relay to clear its canvas
    pub fn clear(&mut self) -> ClientMessage {
        self.canvas.clear();
        ClientMessage::Clear
    }

    pub fn reset(&self) -> ClientMessage {
        ClientMessage::Reset
    }

    /// Push the local canvas to guessers, saving a snapshot first when a directory is given
    pub fn upload(&self, snapshot_dir: Option<&Path>) -> Result<ClientMessage> {
        if let Some(dir) = snapshot_dir {
            save_snapshot(dir, &self.canvas)?;
        }
        Ok(ClientMessage::CanvasUpdate {
            canvas: Some(self.canvas.to_base64_jpeg()?),
        })
    }

    /// Ask the image-guess capability what the local canvas shows
    pub async fn guess<G: GuessCapability>(&mut self, capability: &G) -> Option<String> {
        let jpeg = match self.canvas.to_jpeg() {
            Ok(jpeg) => jpeg,
            Err(e) => {
                tracing::warn!("Failed to encode canvas: {}", e);
                return None;
            }
        };
        let label = guess_or_none(capability, &jpeg, self.view.hint.as_deref()).await;
        if let Some(label) = &label {
            tracing::info!("AI guess: {}", label);
        }
        self.view.ai_guess = label.clone();
        label
    }

    pub fn set_hint(&mut self, hint: impl Into<String>) {
        self.view.hint = Some(hint.into());
    }

    pub fn view(&self) -> &RemoteView {
        &self.view
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn input(&self) -> &InputStateMachine {
        &self.input
    }
}
