//! Error types for Kikitori.

use thiserror::Error;

/// Library-level error type for Kikitori operations.
#[derive(Error, Debug)]
pub enum KikitoriError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Collection error: {0}")]
    Collection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Coarse classification of a [`KikitoriError`].
///
/// Callers branch on this instead of inspecting error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied something unusable (bad URL, empty transcript, ...).
    InvalidInput,
    /// The requested resource does not exist (no captions, unknown collection).
    NotFound,
    /// An external service or tool failed.
    ServiceUnavailable,
    /// Local filesystem failure.
    Io,
}

impl KikitoriError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            KikitoriError::Config(_)
            | KikitoriError::InvalidInput(_)
            | KikitoriError::Collection(_)
            | KikitoriError::TomlParse(_) => ErrorKind::InvalidInput,
            KikitoriError::NotFound(_) => ErrorKind::NotFound,
            KikitoriError::ServiceUnavailable(_)
            | KikitoriError::ToolNotFound(_)
            | KikitoriError::Embedding(_)
            | KikitoriError::Json(_)
            | KikitoriError::Http(_) => ErrorKind::ServiceUnavailable,
            KikitoriError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type alias for Kikitori operations.
pub type Result<T> = std::result::Result<T, KikitoriError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        assert_eq!(
            KikitoriError::InvalidInput("x".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(KikitoriError::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            KikitoriError::ToolNotFound("yt-dlp".into()).kind(),
            ErrorKind::ServiceUnavailable
        );

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(KikitoriError::from(io).kind(), ErrorKind::Io);
    }
}
