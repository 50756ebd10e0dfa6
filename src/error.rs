// Error types for the swr coordinator.
// Fetch failures land in observable state; store failures are logged, never propagated.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwrError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SwrError>;
