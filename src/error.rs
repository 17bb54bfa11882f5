use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
///
/// Staging, navigation and reorder operations never produce these: invalid
/// ids and indices are absorbed as no-ops. Errors only come from the edges
/// (terminal, disk, image decoding, manifest output).
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from reading staged files or writing exports.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A staged image could not be decoded for preview.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The submission manifest could not be serialized.
    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
        assert!(app_err.to_string().contains("file not found"));
    }

    #[test]
    fn terminal_error_display() {
        let err = AppError::Terminal("event channel closed".into());
        assert_eq!(err.to_string(), "Terminal error: event channel closed");
    }

    #[test]
    fn invalid_path_error_display() {
        let err = AppError::InvalidPath("/nonexistent".into());
        assert_eq!(err.to_string(), "Invalid path: /nonexistent");
    }

    #[test]
    fn image_error_conversion() {
        let err = image::load_from_memory(b"definitely not an image").unwrap_err();
        let app_err: AppError = err.into();
        assert!(matches!(app_err, AppError::Image(_)));
        assert!(app_err.to_string().starts_with("Image error:"));
    }

    #[test]
    fn manifest_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let app_err: AppError = err.into();
        assert!(matches!(app_err, AppError::Manifest(_)));
    }
}
