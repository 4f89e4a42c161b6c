pub mod config;
pub mod error;
pub mod types;

pub use config::BatchConfig;
pub use error::ProcessorError;
pub use types::*;
