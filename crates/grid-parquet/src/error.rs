//! Codec error type.

use thiserror::Error;

/// Errors from the gridded-dataset Parquet codec.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("dataset is missing CRS and grid mapping info in attributes")]
    MissingSpatialMetadata,

    #[error("stored dataset is malformed: {0}")]
    MalformedStoredDataset(String),

    #[error("variable {name} has {actual} values but the dimensions require {expected}")]
    Shape {
        name: String,
        actual: usize,
        expected: usize,
    },

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("attribute serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
