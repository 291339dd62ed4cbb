pub mod handler;
pub mod message;

pub use message::{ClientMessage, ClientRole, ServerMessage};
