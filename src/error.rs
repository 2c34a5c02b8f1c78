use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchcovError {
    #[error("Invalid JSON in coverage report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid threshold {0}: expected a percentage between 0 and 100")]
    InvalidThreshold(f64),
}

pub type Result<T> = std::result::Result<T, PatchcovError>;
