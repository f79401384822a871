use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid brand colour {0:?}: expected #rrggbb")]
    InvalidColor(String),

    #[error("row {row:?} has {got} values for {expected} quotes")]
    RowWidth {
        row: String,
        got: usize,
        expected: usize,
    },
}
