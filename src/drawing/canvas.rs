use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tiny_skia::{Color, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::drawing::Rgb;
use crate::error::{DrawguessError, Result};

/// Reference frame and canvas resolution
pub const CANVAS_WIDTH: u32 = 640;
pub const CANVAS_HEIGHT: u32 = 480;

/// Stroke thickness in pixels
pub const STROKE_WIDTH: f32 = 2.0;

/// An integer pixel position in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Fixed-size raster with a white background
pub struct Canvas {
    pixmap: Pixmap,
    width: u32,
    height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let mut pixmap =
            Pixmap::new(width, height).ok_or(DrawguessError::InvalidCanvasSize(width, height))?;
        pixmap.fill(Color::WHITE);

        Ok(Self {
            pixmap,
            width,
            height,
        })
    }

    /// Canvas at the reference resolution
    pub fn standard() -> Result<Self> {
        Self::new(CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    /// Draw a line segment. Coincident endpoints leave a dot.
    pub fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: Rgb, width: f32) {
        let mut paint = Paint::default();
        paint.set_color(Color::from_rgba8(color.r(), color.g(), color.b(), 255));
        paint.anti_alias = true;

        let stroke = Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };

        let mut pb = PathBuilder::new();
        if from == to {
            pb.push_circle(from.x as f32, from.y as f32, width / 2.0);
            if let Some(path) = pb.finish() {
                self.pixmap.fill_path(
                    &path,
                    &paint,
                    tiny_skia::FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }
            return;
        }

        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);

        if let Some(path) = pb.finish() {
            self.pixmap
                .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    /// Reset every pixel to the white background
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::WHITE);
    }

    /// True when no pixel differs from the background
    pub fn is_blank(&self) -> bool {
        self.pixmap
            .data()
            .chunks_exact(4)
            .all(|px| px == [255, 255, 255, 255])
    }

    /// Color of a single pixel, `None` outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        let px = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgb([px.red(), px.green(), px.blue()]))
    }

    /// Flatten onto the white background as an RGB image
    pub fn to_rgb_image(&self) -> RgbImage {
        let data = self.pixmap.data();
        let mut img = RgbImage::new(self.width, self.height);

        for (i, pixel) in img.pixels_mut().enumerate() {
            let offset = i * 4;
            // Premultiplied RGBA over white
            let a = data[offset + 3] as u16;
            let blend = |c: u8| (c as u16 + (255 - a)).min(255) as u8;
            *pixel = image::Rgb([
                blend(data[offset]),
                blend(data[offset + 1]),
                blend(data[offset + 2]),
            ]);
        }

        img
    }

    fn encode(&self, format: ImageFormat) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(self.to_rgb_image()).write_to(&mut buffer, format)?;
        Ok(buffer.into_inner())
    }

    /// Export canvas to JPEG bytes
    pub fn to_jpeg(&self) -> Result<Vec<u8>> {
        self.encode(ImageFormat::Jpeg)
    }

    /// Export canvas to PNG bytes
    pub fn to_png(&self) -> Result<Vec<u8>> {
        self.encode(ImageFormat::Png)
    }

    /// JPEG payload as carried by `canvas_update`
    pub fn to_base64_jpeg(&self) -> Result<String> {
        Ok(STANDARD.encode(self.to_jpeg()?))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
