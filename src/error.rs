//! Error types for the DeFi assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {

    // =============================
    // Boundary Errors
    // =============================

    /// Transport-level failure of a remote chat backend.
    /// The local mock never produces this.
    #[error("Chat backend unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl AssistantError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AssistantError::Unavailable(_))
    }
}
