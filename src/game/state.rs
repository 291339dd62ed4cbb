use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::drawing::{Canvas, PixelPoint, Rgb, STROKE_WIDTH};
use crate::error::Result;
use crate::game::WordPool;

/// One entry of the guess log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guess {
    #[serde(rename = "guess")]
    pub text: String,
    #[serde(rename = "is_correct")]
    pub correct: bool,
}

/// Authoritative record of the current round
pub struct GameState {
    words: WordPool,
    rng: StdRng,
    secret: String,
    canvas: Canvas,
    guesses: Vec<Guess>,
    active: bool,
    pen: Option<PixelPoint>,
    color: Rgb,
}

impl GameState {
    pub fn new(words: WordPool) -> Result<Self> {
        Self::with_rng(words, StdRng::from_entropy())
    }

    pub fn with_rng(words: WordPool, mut rng: StdRng) -> Result<Self> {
        let secret = words.choose(&mut rng, None);
        Ok(Self {
            words,
            rng,
            secret,
            canvas: Canvas::standard()?,
            guesses: Vec::new(),
            active: true,
            pen: None,
            color: Rgb::BLACK,
        })
    }

    /// Start with a known secret word
    pub fn with_initial_word(words: WordPool, word: impl Into<String>) -> Result<Self> {
        let mut state = Self::new(words)?;
        state.secret = word.into();
        Ok(state)
    }

    /// Draw a fresh word from the pool, different from the current one when possible
    pub fn new_random_word(&mut self) -> String {
        self.words.choose(&mut self.rng, Some(&self.secret))
    }

    /// Start a new round: new word, blank canvas, no guesses
    pub fn reset(&mut self) {
        self.secret = self.new_random_word();
        self.canvas.clear();
        self.guesses.clear();
        self.active = true;
        self.pen = None;
        tracing::info!("New round started");
    }

    pub fn apply_stroke(&mut self, from: PixelPoint, to: PixelPoint, color: Rgb) {
        self.canvas.draw_line(from, to, color, STROKE_WIDTH);
    }

    /// Apply a relayed `draw` event.
    ///
    /// Pen-down draws from the previous pen point, if any, and moves the pen.
    /// Pen-up lifts it. Returns whether a segment was rasterized.
    pub fn apply_draw(&mut self, at: PixelPoint, drawing: bool, color: Option<Rgb>) -> bool {
        if let Some(color) = color {
            self.color = color;
        }

        if !drawing {
            self.pen = None;
            return false;
        }

        let drew = match self.pen {
            Some(from) => {
                self.apply_stroke(from, at, self.color);
                true
            }
            None => false,
        };
        self.pen = Some(at);
        drew
    }

    pub fn clear(&mut self) {
        self.canvas.clear();
    }

    /// Record a guess and report whether it matches the secret word exactly.
    /// A correct guess ends the round but does not reset it.
    pub fn submit_guess(&mut self, text: &str) -> bool {
        let correct = text == self.secret;
        self.guesses.push(Guess {
            text: text.to_string(),
            correct,
        });
        if correct {
            self.active = false;
        }
        correct
    }

    pub fn secret_word(&self) -> &str {
        &self.secret
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn guesses(&self) -> &[Guess] {
        &self.guesses
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current_color(&self) -> Rgb {
        self.color
    }
}
