//! Persistence errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
