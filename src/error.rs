use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovDeltaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Execution data error: {0}")]
    ExecData(String),

    #[error("Class analysis error: {0}")]
    Analysis(String),
}

pub type Result<T> = std::result::Result<T, CovDeltaError>;
