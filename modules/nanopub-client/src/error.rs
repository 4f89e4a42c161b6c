use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Timeout after {timeout_secs}s fetching {url}")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("Transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    #[error("No acceptable response for {url} after {attempts} attempts")]
    Exhausted { url: String, attempts: usize },
}
