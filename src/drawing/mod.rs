pub mod canvas;
pub mod color;
pub mod snapshot;

pub use canvas::{Canvas, PixelPoint, CANVAS_HEIGHT, CANVAS_WIDTH, STROKE_WIDTH};
pub use color::Rgb;
pub use snapshot::save_snapshot;
