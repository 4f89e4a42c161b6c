use thiserror::Error;

/// Errors that escape the per-item loop. Per-item validation and fetch
/// failures never reach this type — they are converted into error records at
/// the item boundary.
#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Report error: {0}")]
    Report(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
