use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to load {artifact}: {reason}")]
    LoadFailure { artifact: String, reason: String },

    #[error("Scoring model is not available")]
    ModelUnavailable,

    #[error("Invalid vector dimension for item {item_id}: expected {expected}, got {actual}")]
    InvalidDimension {
        item_id: u64,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate embedding for item {0}")]
    DuplicateEmbedding(u64),

    #[error("Invalid model: {0}")]
    InvalidModel(String),
}

impl Error {
    /// Wrap any error raised while fetching or decoding an artifact
    pub fn load_failure(artifact: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::LoadFailure {
            artifact: artifact.into(),
            reason: reason.to_string(),
        }
    }
}
