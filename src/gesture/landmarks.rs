use serde::{Deserialize, Serialize};

use crate::drawing::{PixelPoint, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::error::{DrawguessError, Result};

// ============================================================================
// HAND LANDMARK INDICES
// ============================================================================

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

pub const LANDMARK_COUNT: usize = 21;

/// A 2D point, either normalized [0,1] or in pixels depending on context
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Truncate to integer pixel coordinates
    pub fn to_pixel(self) -> PixelPoint {
        PixelPoint::new(self.x as i32, self.y as i32)
    }
}

/// Pixel dimensions used to project normalized landmarks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl Default for FrameSize {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }
}

/// One hand's keypoints for a single captured frame
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    points: [Point; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn new(points: [Point; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    pub fn from_slice(points: &[Point]) -> Result<Self> {
        let points: [Point; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| DrawguessError::InvalidLandmarkCount(points.len()))?;
        Ok(Self { points })
    }

    /// Normalized position of a landmark
    pub fn get(&self, index: usize) -> Point {
        self.points[index]
    }

    pub fn set(&mut self, index: usize, point: Point) {
        self.points[index] = point;
    }

    /// Landmark position projected into pixel space
    pub fn pixel(&self, index: usize, size: FrameSize) -> Point {
        let p = self.points[index];
        Point::new(p.x * size.width as f32, p.y * size.height as f32)
    }

    /// Horizontally flipped copy, for selfie-view capture
    pub fn mirrored(&self) -> Self {
        let mut points = self.points;
        for p in points.iter_mut() {
            p.x = 1.0 - p.x;
        }
        Self { points }
    }

    pub fn points(&self) -> &[Point; LANDMARK_COUNT] {
        &self.points
    }
}
