use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::error::ModelError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid model input: {source}")]
    Model {
        #[from]
        source: ModelError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Computation was cancelled")]
    Cancelled,

    #[error("Field value at observation {observation} is not finite")]
    NumericDegenerate { observation: usize },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error("Worker failed while processing chunk {chunk}: {message}")]
    WorkerFailed { chunk: usize, message: String },

    #[error("Invalid physical constants: {0}")]
    InvalidConstants(String),

    #[error("Failed to assemble output: {0}")]
    Output(String),
}
