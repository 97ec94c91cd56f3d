use thiserror::Error;

/// Client-level error type.
///
/// Every failure in the client core degrades to a fallback state; this type
/// carries enough detail for the caller to pick that fallback and for logs to
/// tell the failure kinds apart.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Authentication rejected (status {status})")]
    AuthRejected { status: u16, message: Option<String> },

    #[error("API error (status {status})")]
    Api { status: u16, message: Option<String> },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Token storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl AppError {
    /// True for failures that never reached a well-formed backend answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, AppError::Transport(_) | AppError::Decode(_))
    }

    /// Server-provided message, if the backend sent one with the rejection.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AppError::AuthRejected { message, .. } | AppError::Api { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// Short label used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Transport(_) | AppError::Decode(_) => "transport",
            AppError::AuthRejected { .. } => "auth_rejected",
            AppError::Api { .. } => "api",
            AppError::Validation(_) => "validation",
            AppError::Configuration(_) => "configuration",
            AppError::Storage(_) => "storage",
        }
    }
}
