//! Finger-count gesture recognition.
//!
//! A finger is extended when its tip clears its base joint by a margin:
//! along +x for the thumb, along -y (upwards) for the other four. Only five
//! exact poses map to a symbol, counting up from the index finger.

use std::fmt;

use super::landmarks::{
    FrameSize, LandmarkFrame, INDEX_MCP, INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP, PINKY_MCP, PINKY_TIP,
    RING_MCP, RING_TIP, THUMB_MCP, THUMB_TIP,
};

/// Margin in pixels a tip must clear its base joint by
pub const EXTENSION_MARGIN_PX: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn tip(self) -> usize {
        match self {
            Finger::Thumb => THUMB_TIP,
            Finger::Index => INDEX_TIP,
            Finger::Middle => MIDDLE_TIP,
            Finger::Ring => RING_TIP,
            Finger::Pinky => PINKY_TIP,
        }
    }

    pub fn base(self) -> usize {
        match self {
            Finger::Thumb => THUMB_MCP,
            Finger::Index => INDEX_MCP,
            Finger::Middle => MIDDLE_MCP,
            Finger::Ring => RING_MCP,
            Finger::Pinky => PINKY_MCP,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Which fingers are extended, thumb first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtendedFingers([bool; 5]);

impl ExtendedFingers {
    pub fn from_fingers(fingers: &[Finger]) -> Self {
        let mut set = [false; 5];
        for f in fingers {
            set[f.slot()] = true;
        }
        Self(set)
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0[finger.slot()]
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|e| **e).count()
    }
}

/// A recognized finger-count symbol, 1 to 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GestureSymbol(u8);

impl GestureSymbol {
    pub fn new(value: u8) -> Option<Self> {
        (1..=5).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for GestureSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Map an exact extended-finger subset to its symbol
pub fn symbol_for(extended: ExtendedFingers) -> Option<GestureSymbol> {
    use Finger::*;

    let expected: [&[Finger]; 5] = [
        &[Index],
        &[Index, Middle],
        &[Index, Middle, Ring],
        &[Index, Middle, Ring, Pinky],
        &[Thumb, Index, Middle, Ring, Pinky],
    ];

    expected
        .iter()
        .position(|fingers| ExtendedFingers::from_fingers(fingers) == extended)
        .and_then(|i| GestureSymbol::new(i as u8 + 1))
}

/// Stateless classifier over pixel-space landmarks
#[derive(Debug, Clone, Copy)]
pub struct GestureClassifier {
    margin: f32,
}

impl GestureClassifier {
    pub fn new(margin: f32) -> Self {
        Self { margin }
    }

    pub fn extended_fingers(&self, frame: &LandmarkFrame, size: FrameSize) -> ExtendedFingers {
        let mut set = [false; 5];
        for finger in Finger::ALL {
            let tip = frame.pixel(finger.tip(), size);
            let base = frame.pixel(finger.base(), size);
            set[finger.slot()] = match finger {
                Finger::Thumb => tip.x > base.x + self.margin,
                _ => tip.y < base.y - self.margin,
            };
        }
        ExtendedFingers(set)
    }

    pub fn classify(&self, frame: &LandmarkFrame, size: FrameSize) -> Option<GestureSymbol> {
        symbol_for(self.extended_fingers(frame, size))
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(EXTENSION_MARGIN_PX)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gesture::landmarks::{Point, LANDMARK_COUNT};

    /// Build a hand where exactly `fingers` are extended
    pub(crate) fn hand_with(fingers: &[Finger]) -> LandmarkFrame {
        let mut frame = LandmarkFrame::new([Point::new(0.5, 0.6); LANDMARK_COUNT]);
        let extended = ExtendedFingers::from_fingers(fingers);

        for finger in Finger::ALL {
            let base = Point::new(0.4 + finger.slot() as f32 * 0.05, 0.6);
            frame.set(finger.base(), base);

            let tip = match (finger, extended.is_extended(finger)) {
                (Finger::Thumb, true) => Point::new(base.x + 0.1, base.y),
                (Finger::Thumb, false) => Point::new(base.x - 0.02, base.y),
                (_, true) => Point::new(base.x, base.y - 0.25),
                (_, false) => Point::new(base.x, base.y + 0.05),
            };
            frame.set(finger.tip(), tip);
        }

        frame
    }

    fn classify(fingers: &[Finger]) -> Option<u8> {
        GestureClassifier::default()
            .classify(&hand_with(fingers), FrameSize::default())
            .map(GestureSymbol::value)
    }

    #[test]
    fn test_enumerated_poses() {
        use Finger::*;
        assert_eq!(classify(&[Index]), Some(1));
        assert_eq!(classify(&[Index, Middle]), Some(2));
        assert_eq!(classify(&[Index, Middle, Ring]), Some(3));
        assert_eq!(classify(&[Index, Middle, Ring, Pinky]), Some(4));
        assert_eq!(classify(&[Thumb, Index, Middle, Ring, Pinky]), Some(5));
    }

    #[test]
    fn test_wrong_subset_with_right_count() {
        use Finger::*;
        assert_eq!(classify(&[Middle]), None);
        assert_eq!(classify(&[Index, Ring]), None);
        assert_eq!(classify(&[Thumb, Index]), None);
        assert_eq!(classify(&[Middle, Ring, Pinky]), None);
    }

    #[test]
    fn test_fist_has_no_symbol() {
        assert_eq!(classify(&[]), None);
    }

    #[test]
    fn test_margin() {
        let size = FrameSize::default();
        let classifier = GestureClassifier::default();
        let mut frame = hand_with(&[Finger::Index]);
        let base = frame.pixel(INDEX_MCP, size);
        let x = frame.get(INDEX_MCP).x;

        frame.set(INDEX_TIP, Point::new(x, (base.y - 19.0) / 480.0));
        assert!(!classifier.extended_fingers(&frame, size).is_extended(Finger::Index));

        frame.set(INDEX_TIP, Point::new(x, (base.y - 21.0) / 480.0));
        assert!(classifier.extended_fingers(&frame, size).is_extended(Finger::Index));
    }

    #[test]
    fn test_symbol_range() {
        assert!(GestureSymbol::new(0).is_none());
        assert!(GestureSymbol::new(6).is_none());
        assert_eq!(GestureSymbol::new(3).map(|s| s.value()), Some(3));
    }
}
