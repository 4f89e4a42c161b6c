use std::env;
use std::path::PathBuf;

/// Batch configuration, materialized once from the environment and passed
/// into the runner explicitly. Nothing else reads env vars.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub batch_id: String,
    pub urls: Vec<String>,
    pub timeout_secs: u64,
    pub concurrency: usize,
    pub out_dir: PathBuf,
}

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONCURRENCY: usize = 4;

impl BatchConfig {
    /// Load configuration from environment variables.
    ///
    /// `NANOPUB_URLS` is a comma-separated URL list; when missing the list is
    /// empty and the runner reports the empty batch as a failure rather than
    /// panicking here.
    pub fn from_env() -> Self {
        let urls = env::var("NANOPUB_URLS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        let batch_id = env::var("BATCH_ID")
            .unwrap_or_else(|_| format!("batch_{}", chrono::Utc::now().timestamp()));

        Self {
            batch_id,
            urls,
            timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            concurrency: env::var("FETCH_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_CONCURRENCY),
            out_dir: PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "results".to_string())),
        }
    }

    pub fn new(batch_id: impl Into<String>, urls: Vec<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            urls,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            concurrency: DEFAULT_CONCURRENCY,
            out_dir: PathBuf::from("results"),
        }
    }
}
