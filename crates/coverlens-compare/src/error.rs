use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("materiality threshold must be a finite percentage in (0, 100], got {0}")]
    InvalidThreshold(f64),

    #[error("config json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("comparison needs {min} to {max} quotes, got {count}")]
    SelectionSize { count: usize, min: usize, max: usize },
}
