use std::io;
use thiserror::Error;

/// Application-wide error type for the extraction pipeline and its boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// The entity recognizer could not be loaded or failed while recognizing.
    /// No entity output can be trusted, so the extraction call fails.
    #[error("Entity recognizer unavailable: {0}")]
    RecognizerUnavailable(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input text could not be obtained (unsupported document, bad encoding).
    #[error("Input error: {0}")]
    Input(String),

    /// Represents configuration-related errors (e.g., invalid environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The record could not be serialized to JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            AppError::RecognizerUnavailable(s) => AppError::RecognizerUnavailable(s.clone()),
            AppError::Io(e) => AppError::Io(io::Error::new(e.kind(), e.to_string())),
            AppError::Input(s) => AppError::Input(s.clone()),
            AppError::Config(s) => AppError::Config(s.clone()),
            AppError::Serialization(e) => AppError::Serialization(serde_json::Error::io(
                io::Error::other(e.to_string()),
            )),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Config(format!("Validation errors: {}", err))
    }
}

impl From<std::string::FromUtf8Error> for AppError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        AppError::Input(format!("Invalid UTF-8 content: {}", err))
    }
}

/// Convenience alias used across the crate.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizer_error_message() {
        let err = AppError::RecognizerUnavailable("model missing".to_string());
        assert_eq!(err.to_string(), "Entity recognizer unavailable: model missing");
    }

    #[test]
    fn test_clone_preserves_message() {
        let err = AppError::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }

    #[test]
    fn test_utf8_error_maps_to_input() {
        let bad = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let err: AppError = bad.into();
        assert!(matches!(err, AppError::Input(_)));
    }
}
