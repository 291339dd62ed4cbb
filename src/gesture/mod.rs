pub mod classifier;
pub mod input;
pub mod landmarks;
pub mod smoother;

pub use classifier::{ExtendedFingers, Finger, GestureClassifier, GestureSymbol};
pub use input::{palette_color, InputConfig, InputEvent, InputStateMachine, PenState, Stroke};
pub use landmarks::{FrameSize, LandmarkFrame, Point};
pub use smoother::Smoother;
