use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;

use crate::error::{DrawguessError, Result};

/// Built-in secret words
pub const DEFAULT_WORDS: &[&str] = &[
    "apple", "banana", "cat", "dog", "house", "car", "airplane", "boat", "tree", "flower",
    "sun", "moon", "star", "umbrella", "glasses", "hat", "shoe", "shirt", "phone", "computer",
    "television", "fridge", "washing machine", "bicycle", "motorcycle", "train", "rocket",
    "football", "basketball", "ping pong",
];

#[derive(Debug, Clone)]
pub struct WordPool {
    words: Vec<String>,
}

impl WordPool {
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(Into::into)
            .filter(|w| !w.trim().is_empty())
            .collect();

        if words.is_empty() {
            return Err(DrawguessError::EmptyWordPool);
        }
        Ok(Self { words })
    }

    /// Load one word per line. Blank lines and `#` comments are skipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.starts_with('#'))
                .map(str::to_string),
        )
    }

    /// Pick a word, avoiding `previous` whenever another word is available
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R, previous: Option<&str>) -> String {
        let candidates: Vec<&String> = self
            .words
            .iter()
            .filter(|w| Some(w.as_str()) != previous)
            .collect();

        candidates
            .choose(rng)
            .map(|w| w.to_string())
            .unwrap_or_else(|| self.words[0].clone())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }
}

impl Default for WordPool {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}
