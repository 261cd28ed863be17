use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    // Input errors
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl AnalysisError {
    /// Get error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            AnalysisError::InvalidTransaction(_) | AnalysisError::InvalidAddress(_) => "input",
            AnalysisError::InvalidConfiguration(_) => "configuration",
        }
    }
}

// Result type alias for convenience
pub type AnalysisResult<T> = Result<T, AnalysisError>;
