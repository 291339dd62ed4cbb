use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrawguessError {
    #[error("Invalid landmark frame: expected 21 points, got {0}")]
    InvalidLandmarkCount(usize),

    #[error("Invalid canvas size: {0}x{1}")]
    InvalidCanvasSize(u32, u32),

    #[error("Word pool is empty")]
    EmptyWordPool,

    #[error("Gave up connecting after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Guess capability error: {0}")]
    GuessError(String),

    #[error("WebSocket error: {0}")]
    WebSocketError(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, DrawguessError>;
