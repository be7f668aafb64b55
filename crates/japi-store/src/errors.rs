//! Error handling for japi-store
//!
//! Wraps japi-core `JapiError` with store-specific helpers

use japi_core::errors::JapiError;
use std::path::Path;

/// Result type alias using JapiError
pub type Result<T> = std::result::Result<T, JapiError>;

/// Create a storage error from an I/O error
pub fn io_error(op: &'static str, path: &Path, err: std::io::Error) -> JapiError {
    JapiError::storage(op, path, err)
}

/// Create a storage error that has no underlying I/O error
pub fn storage_error(op: &'static str, path: &Path, message: impl Into<String>) -> JapiError {
    JapiError::StorageFailure {
        op,
        path: path.to_path_buf(),
        message: message.into(),
    }
}

/// Create a corrupt history entry error
pub fn corrupt_entry(path: &Path, reason: impl Into<String>) -> JapiError {
    JapiError::CorruptHistoryEntry {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Create a configuration error
pub fn config_error(err: ::config::ConfigError) -> JapiError {
    JapiError::InvalidConfig {
        message: err.to_string(),
    }
}
