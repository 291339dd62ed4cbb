pub mod state;
pub mod words;

pub use state::{GameState, Guess};
pub use words::{WordPool, DEFAULT_WORDS};
