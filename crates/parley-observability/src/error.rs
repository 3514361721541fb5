use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Transcript I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transcript serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TranscriptError>;
