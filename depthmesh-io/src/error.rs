//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Manifest error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for depthmesh_core::Error {
    fn from(err: IoError) -> Self {
        use depthmesh_core::Error;
        match err {
            IoError::Io(e) => Error::Io(e),
            IoError::FileNotFound { path } => {
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, path))
            }
            IoError::InvalidFormat { format } => Error::UnsupportedFormat(format),
            IoError::Image(image::ImageError::IoError(e)) => Error::Io(e),
            IoError::Image(image::ImageError::Unsupported(e)) => Error::UnsupportedFormat(e.to_string()),
            other => Error::InvalidData(other.to_string()),
        }
    }
}
