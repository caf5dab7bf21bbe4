use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact deserialization error: {0}")]
    Deserialization(#[from] bincode::Error),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Descriptor dimension mismatch: artifact expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),
}

pub type Result<T> = std::result::Result<T, Error>;
