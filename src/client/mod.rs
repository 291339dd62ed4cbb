//! Client side of the relay: the gesture-driven drawer session and its
//! connection, capture and image-guess collaborators.

pub mod capture;
pub mod guess;
pub mod reconnect;
pub mod session;

pub use capture::{JsonLinesSource, LandmarkSource, Sample};
pub use guess::{guess_or_none, GuessCapability, VisionConfig, VisionGuesser};
pub use reconnect::{connect_and_register, ReconnectPolicy, Reconnector, RelayStream};
pub use session::{Command, DrawerSession, RemoteView};
