use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    #[cfg(feature = "mongodb")]
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Search backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, RagError>;
