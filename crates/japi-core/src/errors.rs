use crate::key::Depth;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using JapiError
pub type Result<T> = std::result::Result<T, JapiError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing and log assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Addressing
    InvalidSegment,

    // Codec
    PayloadUnserializable,

    // Storage
    StorageFailure,
    CorruptHistoryEntry,

    // Ambient
    InvalidConfig,
    ExtractionFailed,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidSegment => "ERR_INVALID_SEGMENT",
            ExErrorKind::PayloadUnserializable => "ERR_PAYLOAD_UNSERIALIZABLE",
            ExErrorKind::StorageFailure => "ERR_STORAGE_FAILURE",
            ExErrorKind::CorruptHistoryEntry => "ERR_CORRUPT_HISTORY_ENTRY",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::ExtractionFailed => "ERR_EXTRACTION_FAILED",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and context
/// (operation, entity key, path) for the log line the driver emits.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_key: Option<String>,
    path: Option<PathBuf>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_key: None,
            path: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity key context
    pub fn with_entity_key(mut self, key: impl Into<String>) -> Self {
        self.entity_key = Some(key.into());
        self
    }

    /// Add filesystem path context
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_key(&self) -> Option<&str> {
        self.entity_key.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(key) = &self.entity_key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for snapshot store operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JapiError {
    /// A key segment is blank, contains a separator or is a relative component
    #[error("{level} segment {segment:?} is invalid: {reason}")]
    InvalidSegment {
        level: Depth,
        segment: String,
        reason: &'static str,
    },

    /// Payload could not be canonically serialized
    #[error("Payload cannot be serialized: {message}")]
    PayloadUnserializable { message: String },

    /// Directory or file operation failed
    #[error("Storage failure during {op} at {}: {message}", .path.display())]
    StorageFailure {
        op: &'static str,
        path: PathBuf,
        message: String,
    },

    /// A timestamp container is missing an artifact or fails verification
    #[error("Corrupt history entry at {}: {reason}", .path.display())]
    CorruptHistoryEntry { path: PathBuf, reason: String },

    /// Configuration could not be loaded
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The extractor could not produce its records
    #[error("Extraction failed: {message}")]
    ExtractionFailed { message: String },
}

impl JapiError {
    /// Build a `StorageFailure` from an I/O error
    pub fn storage(op: &'static str, path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        JapiError::StorageFailure {
            op,
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// The canonical kind of this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            JapiError::InvalidSegment { .. } => ExErrorKind::InvalidSegment,
            JapiError::PayloadUnserializable { .. } => ExErrorKind::PayloadUnserializable,
            JapiError::StorageFailure { .. } => ExErrorKind::StorageFailure,
            JapiError::CorruptHistoryEntry { .. } => ExErrorKind::CorruptHistoryEntry,
            JapiError::InvalidConfig { .. } => ExErrorKind::InvalidConfig,
            JapiError::ExtractionFailed { .. } => ExErrorKind::ExtractionFailed,
        }
    }
}

/// Conversion from JapiError to the structured ExError
impl From<JapiError> for ExError {
    fn from(err: JapiError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            JapiError::InvalidSegment { .. } => ExError::new(kind)
                .with_op("resolve_path")
                .with_message(message),
            JapiError::PayloadUnserializable { .. } => ExError::new(kind)
                .with_op("serialize_payload")
                .with_message(message),
            JapiError::StorageFailure { op, path, .. } => {
                ExError::new(kind).with_op(op).with_path(path).with_message(message)
            }
            JapiError::CorruptHistoryEntry { path, .. } => ExError::new(kind)
                .with_op("read_history")
                .with_path(path)
                .with_message(message),
            JapiError::InvalidConfig { .. } => ExError::new(kind)
                .with_op("load_config")
                .with_message(message),
            JapiError::ExtractionFailed { .. } => ExError::new(kind)
                .with_op("extract")
                .with_message(message),
        }
    }
}

/// Conversion from serde_json::Error to JapiError
impl From<serde_json::Error> for JapiError {
    fn from(err: serde_json::Error) -> Self {
        JapiError::PayloadUnserializable {
            message: err.to_string(),
        }
    }
}
