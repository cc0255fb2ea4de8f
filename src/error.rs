use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovsetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid filter pattern: {0}")]
    Filter(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Resultset contains no runs")]
    EmptyResultset,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CovsetError>;
