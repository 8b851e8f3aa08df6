//! Errors raised while loading, validating or writing the config file.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Failed to read configuration file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or type mismatch. `line` and `column` are one-based, 0 if
    /// unknown.
    #[error("Invalid configuration at {path}:{line}:{column}: {message}")]
    ParseError {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// A value parsed but is out of range or meaningless.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// An explicitly requested file does not exist.
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Configuration file already exists: {path}")]
    AlreadyExists { path: PathBuf },

    #[error("Failed to write configuration file: {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_error_includes_position() {
        let err = ConfigError::ParseError {
            path: PathBuf::from("config.toml"),
            line: 3,
            column: 9,
            message: "invalid type".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("config.toml:3:9"), "got: {msg}");
        assert!(msg.contains("invalid type"));
    }

    #[test]
    fn display_invalid_value_names_key() {
        let err = ConfigError::InvalidValue {
            key: "feedback.rate_window".to_string(),
            message: "expected duration".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for feedback.rate_window: expected duration"
        );
    }

    #[test]
    fn display_already_exists() {
        let err = ConfigError::AlreadyExists {
            path: PathBuf::from("/home/u/.config/pictrikit/config.toml"),
        };
        let msg = err.to_string();
        assert!(msg.contains("already exists"));
        assert!(msg.contains("pictrikit/config.toml"));
    }

    #[test]
    fn read_error_source_chain() {
        let err = ConfigError::ReadError {
            path: PathBuf::from("/secret"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
