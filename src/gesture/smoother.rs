//! Fingertip smoothing over a short FIFO of raw positions.
//!
//! The newest sample is blended with the one before it, which removes
//! single-frame jitter from the landmark model while adding at most one
//! frame of lag.

use std::collections::VecDeque;

use super::landmarks::Point;

/// Number of raw positions kept
pub const HISTORY_CAPACITY: usize = 5;

/// Weight applied to the newest sample
pub const SMOOTHING_FACTOR: f32 = 0.7;

pub struct Smoother {
    history: VecDeque<Point>,
    capacity: usize,
    alpha: f32,
}

impl Smoother {
    pub fn new(capacity: usize, alpha: f32) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            alpha,
        }
    }

    /// Push a raw position and return the smoothed one
    pub fn smooth(&mut self, raw: Point) -> Point {
        self.history.push_back(raw);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }

        let n = self.history.len();
        if n < 2 {
            return raw;
        }

        let newest = self.history[n - 1];
        let previous = self.history[n - 2];
        Point::new(
            newest.x * self.alpha + previous.x * (1.0 - self.alpha),
            newest.y * self.alpha + previous.y * (1.0 - self.alpha),
        )
    }

    /// Drop all history so the next sample passes through unchanged
    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn history(&self) -> impl Iterator<Item = &Point> {
        self.history.iter()
    }
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY, SMOOTHING_FACTOR)
    }
}
