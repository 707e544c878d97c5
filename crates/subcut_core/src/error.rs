use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed timestamp: {0:?}")]
    MalformedTimestamp(String),

    #[error("Invalid time range: {start} -> {end}")]
    InvalidTimeRange { start: String, end: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
