use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WardrobeError {
    #[error("Key \"{0}\" not found")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("Upload timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    // Display must stay exactly "Invalid URL"; callers surface it verbatim.
    #[error("Invalid URL")]
    InvalidUrl,

    #[error("Failed to export data")]
    Export,

    #[error("Failed to import data")]
    Import,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WardrobeError>;
