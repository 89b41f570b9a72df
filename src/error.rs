//! Error handling for the alignment viewer

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for viewer operations
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Alignment contains no sequences")]
    EmptyAlignment,

    #[error("Input/Output error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown job: {job}")]
    UnknownJob { job: String },

    #[error("Invalid regular expression pattern: {message}")]
    InvalidPattern { message: String },

    #[error("Invalid position '{input}': expected a number of at least 1")]
    InvalidPosition { input: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ViewerError {
    pub fn parse<S: Into<String>>(line: usize, message: S) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Parse failures and empty input mean "nothing to render" rather than a fault.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::EmptyAlignment)
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message() {
        let err = ViewerError::parse(7, "missing sequence");
        assert_eq!(err.to_string(), "Parse error at line 7: missing sequence");
        assert!(err.is_no_data());
    }

    #[test]
    fn test_io_error_is_not_no_data() {
        let err = ViewerError::io(
            "missing.aln",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(!err.is_no_data());
        assert!(err.to_string().contains("missing.aln"));
    }
}
