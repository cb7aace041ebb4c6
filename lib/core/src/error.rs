use crate::ItemId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Embedding cannot be empty")]
    EmptyEmbedding,

    #[error("Rating for item {item} out of range [0, 5]: {rating}")]
    InvalidRating { item: ItemId, rating: f64 },

    #[error("Blend weight out of range [0, 1]: {0}")]
    InvalidWeight(f64),

    #[error("Invalid top_n: {0}")]
    InvalidTopN(i64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Signal source error: {0}")]
    Source(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
