use serde::{Deserialize, Serialize};
use std::fmt;

/// A stroke color on the wire and on the raster, in `[r, g, b]` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Rgb = Rgb([255, 255, 255]);
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const RED: Rgb = Rgb([255, 0, 0]);
    pub const GREEN: Rgb = Rgb([0, 255, 0]);
    pub const BLUE: Rgb = Rgb([0, 0, 255]);
    pub const YELLOW: Rgb = Rgb([255, 255, 0]);

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }

    /// Human readable name for palette colors, used in logs
    pub fn name(&self) -> &'static str {
        match *self {
            Rgb::BLACK => "black",
            Rgb::RED => "red",
            Rgb::GREEN => "green",
            Rgb::BLUE => "blue",
            Rgb::YELLOW => "yellow",
            Rgb::WHITE => "white",
            _ => "custom",
        }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::BLACK
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r(), self.g(), self.b())
    }
}
