use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::Result;
use crate::gesture::{LandmarkFrame, Point};

/// One captured frame
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Hand(LandmarkFrame),
    NoHand,
}

impl Sample {
    pub fn frame(&self) -> Option<&LandmarkFrame> {
        match self {
            Sample::Hand(frame) => Some(frame),
            Sample::NoHand => None,
        }
    }
}

/// Produces one landmark sample per captured frame
pub trait LandmarkSource {
    /// `None` once the source is exhausted
    fn next_sample(&mut self) -> Option<Sample>;
}

/// Reads landmarks as JSON lines: `null` or 21 `[x, y]` normalized points.
///
/// Frames are mirrored horizontally to match a selfie camera view. A line
/// that does not parse is reported as no hand.
pub struct JsonLinesSource<R> {
    reader: R,
    line: String,
    mirror: bool,
}

impl JsonLinesSource<BufReader<File>> {
    /// Opening failures are returned to the caller; they are fatal at startup
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl JsonLinesSource<BufReader<io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            mirror: true,
        }
    }

    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    fn parse_line(&self, line: &str) -> Sample {
        let points: Option<Vec<[f32; 2]>> = match serde_json::from_str(line) {
            Ok(points) => points,
            Err(e) => {
                tracing::debug!("Unreadable landmark line: {}", e);
                return Sample::NoHand;
            }
        };
        let Some(points) = points else {
            return Sample::NoHand;
        };

        let points: Vec<Point> = points.iter().map(|[x, y]| Point::new(*x, *y)).collect();
        match LandmarkFrame::from_slice(&points) {
            Ok(frame) if self.mirror => Sample::Hand(frame.mirrored()),
            Ok(frame) => Sample::Hand(frame),
            Err(e) => {
                tracing::debug!("Rejected landmark line: {}", e);
                Sample::NoHand
            }
        }
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn next_sample(&mut self) -> Option<Sample> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {
                    let line = self.line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    return Some(self.parse_line(line));
                }
                Err(e) => {
                    tracing::warn!("Landmark source read failed: {}", e);
                    return None;
                }
            }
        }
    }
}
