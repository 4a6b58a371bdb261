//! Error types for the passage ranker.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, RankerError>;

/// Errors that can occur while loading collections, scoring and evaluating.
#[derive(Error, Debug)]
pub enum RankerError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The collection file does not exist.
    #[error("Collection not found at '{0}'")]
    CollectionNotFound(PathBuf),

    /// The corpus directory does not exist or is not a directory.
    #[error("Corpus path '{0}' does not exist or is not a directory")]
    InvalidCorpusPath(PathBuf),

    /// No collection files found in the corpus directory.
    #[error("No collections found in corpus at '{0}'")]
    EmptyCorpus(PathBuf),

    /// A question id was requested that the collection does not contain.
    #[error("Question '{0}' not found in collection")]
    QuestionNotFound(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A composite scorer was asked to score without any constituents.
    #[error("Composite scorer '{0}' has no constituent scorers")]
    NoScorers(String),

    /// Aggregate metrics were requested over an empty question sample.
    #[error("Cannot aggregate metrics over an empty question sample")]
    EmptySample,

    /// Error writing a report row.
    #[error("Report error: {0}")]
    Report(String),
}

impl RankerError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for RankerError {
    fn from(err: serde_json::Error) -> Self {
        RankerError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for RankerError {
    fn from(err: serde_yaml::Error) -> Self {
        RankerError::Config(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for RankerError {
    fn from(err: bincode::error::EncodeError) -> Self {
        RankerError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for RankerError {
    fn from(err: bincode::error::DecodeError) -> Self {
        RankerError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for RankerError {
    fn from(err: csv::Error) -> Self {
        RankerError::Report(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_keeps_path() {
        let err = RankerError::io(
            "/tmp/out.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/out.csv"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_no_scorers_message() {
        let err = RankerError::NoScorers("composite".to_string());
        assert_eq!(
            err.to_string(),
            "Composite scorer 'composite' has no constituent scorers"
        );
    }
}
