//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::lookup::LookupError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or engine construction error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Bad command-line argument
    InvalidArgument,
    /// Lookup failed
    LookupFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CSVINDEX_CLI_CONFIG_ERROR",
            Self::IoError => "CSVINDEX_CLI_IO_ERROR",
            Self::InvalidArgument => "CSVINDEX_CLI_INVALID_ARGUMENT",
            Self::LookupFailed => "CSVINDEX_CLI_LOOKUP_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Invalid argument
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<LookupError> for CliError {
    fn from(e: LookupError) -> Self {
        let code = if e.is_config_error() {
            CliErrorCode::ConfigError
        } else {
            CliErrorCode::LookupFailed
        };
        Self::new(code, format!("{}: {}", e.code(), e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_lookup_config_error_maps_to_config() {
        let err: CliError = LookupError::DataFileMissing(PathBuf::from("rows.csv")).into();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
        assert!(err.message().contains("CSVINDEX_DATA_FILE_MISSING"));
    }

    #[test]
    fn test_lookup_runtime_error_maps_to_lookup_failed() {
        let err: CliError = LookupError::KeyTooShort {
            len: 1,
            required: 3,
        }
        .into();
        assert_eq!(err.code(), &CliErrorCode::LookupFailed);
        assert!(err.to_string().starts_with("CSVINDEX_CLI_LOOKUP_FAILED"));
    }
}
