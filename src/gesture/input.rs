//! Per-frame input state machine.
//!
//! Turns landmark frames into drawing events. Pinching the index fingertip
//! against the thumb draws; finger-count poses pick a color. Recognition is
//! gated on two timers so a held pinch or a lingering pose cannot fire a
//! color change:
//!
//! - activity window: no stroke activity within the last 0.5s
//! - cooldown: more than 1.0s since the last accepted gesture

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::classifier::{GestureClassifier, GestureSymbol, EXTENSION_MARGIN_PX};
use super::landmarks::{FrameSize, LandmarkFrame, INDEX_TIP, THUMB_TIP};
use super::smoother::{Smoother, HISTORY_CAPACITY, SMOOTHING_FACTOR};
use crate::drawing::{PixelPoint, Rgb};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Fingertip-to-thumb distance below which the pen is down
    pub pinch_threshold_px: f32,
    /// Movement needed before a new segment is appended
    pub min_move_px: f32,
    pub activity_window: Duration,
    pub gesture_cooldown: Duration,
    pub history_capacity: usize,
    pub smoothing_factor: f32,
    pub extension_margin_px: f32,
    pub frame_size: FrameSize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            pinch_threshold_px: 40.0,
            min_move_px: 0.5,
            activity_window: Duration::from_millis(500),
            gesture_cooldown: Duration::from_secs(1),
            history_capacity: HISTORY_CAPACITY,
            smoothing_factor: SMOOTHING_FACTOR,
            extension_margin_px: EXTENSION_MARGIN_PX,
            frame_size: FrameSize::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenState {
    Idle,
    Drawing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    StrokeStart { at: PixelPoint, color: Rgb },
    StrokeSegment { from: PixelPoint, to: PixelPoint, color: Rgb },
    StrokeEnd { at: PixelPoint, color: Rgb },
    ColorSelected { symbol: GestureSymbol, color: Rgb },
}

/// The stroke currently being drawn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stroke {
    points: Vec<(PixelPoint, Rgb)>,
}

impl Stroke {
    pub fn push(&mut self, point: PixelPoint, color: Rgb) {
        self.points.push((point, color));
    }

    pub fn points(&self) -> &[(PixelPoint, Rgb)] {
        &self.points
    }

    pub fn last_point(&self) -> Option<PixelPoint> {
        self.points.last().map(|(p, _)| *p)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn clear(&mut self) {
        self.points.clear();
    }
}

/// Color selected by each finger-count symbol
pub fn palette_color(symbol: GestureSymbol) -> Rgb {
    match symbol.value() {
        2 => Rgb::RED,
        3 => Rgb::GREEN,
        4 => Rgb::BLUE,
        5 => Rgb::YELLOW,
        _ => Rgb::BLACK,
    }
}

pub struct InputStateMachine {
    config: InputConfig,
    smoother: Smoother,
    classifier: GestureClassifier,
    pen: PenState,
    stroke: Stroke,
    color: Rgb,
    last_activity: Option<Instant>,
    last_gesture: Option<Instant>,
    classification_attempts: u64,
}

impl InputStateMachine {
    pub fn new(config: InputConfig) -> Self {
        Self {
            smoother: Smoother::new(config.history_capacity, config.smoothing_factor),
            classifier: GestureClassifier::new(config.extension_margin_px),
            config,
            pen: PenState::Idle,
            stroke: Stroke::default(),
            color: Rgb::BLACK,
            last_activity: None,
            last_gesture: None,
            classification_attempts: 0,
        }
    }

    /// Advance the machine by one captured frame.
    ///
    /// `None` means no hand was detected; the pen state is left as is.
    pub fn process(&mut self, frame: Option<&LandmarkFrame>, now: Instant) -> Vec<InputEvent> {
        let Some(frame) = frame else {
            return Vec::new();
        };

        let mut events = Vec::new();
        let size = self.config.frame_size;

        let tip = self.smoother.smooth(frame.pixel(INDEX_TIP, size));
        let thumb = frame.pixel(THUMB_TIP, size);
        let point = tip.to_pixel();

        if tip.distance(thumb) < self.config.pinch_threshold_px {
            match self.stroke.last_point() {
                Some(last) if self.pen == PenState::Drawing => {
                    if pixel_distance(last, point) > self.config.min_move_px {
                        self.stroke.push(point, self.color);
                        events.push(InputEvent::StrokeSegment {
                            from: last,
                            to: point,
                            color: self.color,
                        });
                    }
                }
                _ => {
                    self.pen = PenState::Drawing;
                    self.stroke.clear();
                    self.stroke.push(point, self.color);
                    tracing::debug!("Stroke started at ({}, {})", point.x, point.y);
                    events.push(InputEvent::StrokeStart {
                        at: point,
                        color: self.color,
                    });
                }
            }
            self.last_activity = Some(now);
        } else if self.pen == PenState::Drawing {
            self.pen = PenState::Idle;
            self.smoother.clear();
            self.last_activity = Some(now);
            tracing::debug!("Stroke ended with {} points", self.stroke.len());
            events.push(InputEvent::StrokeEnd {
                at: point,
                color: self.color,
            });
        }

        if self.gesture_eligible(now) {
            self.classification_attempts += 1;
            if let Some(symbol) = self.classifier.classify(frame, size) {
                self.color = palette_color(symbol);
                self.last_gesture = Some(now);
                tracing::info!("Gesture {} selected {}", symbol, self.color.name());
                events.push(InputEvent::ColorSelected {
                    symbol,
                    color: self.color,
                });
            }
        }

        events
    }

    /// Whether classification may run at `now`
    pub fn gesture_eligible(&self, now: Instant) -> bool {
        let idle = self.last_activity.map_or(true, |t| {
            now.saturating_duration_since(t) > self.config.activity_window
        });
        let cooled = self.last_gesture.map_or(true, |t| {
            now.saturating_duration_since(t) > self.config.gesture_cooldown
        });
        idle && cooled
    }

    pub fn pen_state(&self) -> PenState {
        self.pen
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn current_stroke(&self) -> &Stroke {
        &self.stroke
    }

    /// Number of times the classifier has been invoked
    pub fn classification_attempts(&self) -> u64 {
        self.classification_attempts
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }
}

impl Default for InputStateMachine {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}

fn pixel_distance(a: PixelPoint, b: PixelPoint) -> f32 {
    let dx = (a.x - b.x) as f32;
    let dy = (a.y - b.y) as f32;
    (dx * dx + dy * dy).sqrt()
}
