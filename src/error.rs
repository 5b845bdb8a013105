//! Error types for notesync.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=workspace, 3=not_found, 4=validation, etc.)
//! - Retryability flags for scripted callers
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Backend operations report failures as [`ApiError`], the closed failure
//! half of every call the workspace core makes. The core turns those into
//! transient status messages; the CLI turns them into [`Error::Backend`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for notesync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type returned by every backend operation.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

// ── Backend failure ───────────────────────────────────────────

/// Failure reported by a backend operation.
///
/// The message is optional: some failures carry nothing useful, in which
/// case callers substitute an action-specific fallback via [`ApiError::message_or`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", self.message.as_deref().unwrap_or("operation failed"))]
pub struct ApiError {
    pub message: Option<String>,
}

impl ApiError {
    /// Failure with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Failure without a message.
    #[must_use]
    pub const fn silent() -> Self {
        Self { message: None }
    }

    /// The failure's message, or `fallback` if it has none (or an empty one).
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        match self.message.as_deref() {
            Some(msg) if !msg.trim().is_empty() => msg.to_string(),
            _ => fallback.to_string(),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Workspace (exit 2)
    WorkspaceNotFound,
    NoRemote,

    // Not Found (exit 3)
    DocumentNotFound,

    // Validation (exit 4)
    InvalidArgument,
    InvalidPath,

    // Backend (exit 6)
    BackendError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::WorkspaceNotFound => "WORKSPACE_NOT_FOUND",
            Self::NoRemote => "NO_REMOTE",
            Self::DocumentNotFound => "DOCUMENT_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidPath => "INVALID_PATH",
            Self::BackendError => "BACKEND_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::WorkspaceNotFound | Self::NoRemote => 2,
            Self::DocumentNotFound => 3,
            Self::InvalidArgument | Self::InvalidPath => 4,
            Self::BackendError => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether a caller should retry, either as-is or with corrected input.
    ///
    /// Backend failures are usually transient (network, lock contention).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument | Self::InvalidPath | Self::BackendError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in notesync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Workspace not found: {path}")]
    WorkspaceNotFound { path: PathBuf },

    #[error("The {provider} provider has no remote")]
    NoRemote { provider: String },

    #[error("Document not found: {path}")]
    DocumentNotFound { path: String },

    #[error("Invalid document path: {0}")]
    InvalidPath(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Backend(#[from] ApiError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::WorkspaceNotFound { .. } => ErrorCode::WorkspaceNotFound,
            Self::NoRemote { .. } => ErrorCode::NoRemote,
            Self::DocumentNotFound { .. } => ErrorCode::DocumentNotFound,
            Self::InvalidPath(_) => ErrorCode::InvalidPath,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Backend(_) => ErrorCode::BackendError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::WorkspaceNotFound { path } => Some(format!(
                "No workspace at {}. Pass --workspace <dir> or set NOTESYNC_WORKSPACE.",
                path.display()
            )),

            Self::NoRemote { .. } => Some(
                "Local workspaces keep notes on disk only.\n  \
                 Use a git repository or configure a bucket to sync."
                    .to_string(),
            ),

            Self::DocumentNotFound { path } => Some(format!(
                "No document at '{path}'. Use `ns tree` to list documents."
            )),

            Self::InvalidPath(_) => Some(
                "Document paths are relative to the workspace root and may not contain '..'"
                    .to_string(),
            ),

            Self::Config(_) => Some(
                "Check ~/.notesync/config.json, or point NOTESYNC_CONFIG at another file."
                    .to_string(),
            ),

            Self::InvalidArgument(_)
            | Self::Backend(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_or_fallback() {
        assert_eq!(ApiError::new("disk full").message_or("Failed to save"), "disk full");
        assert_eq!(ApiError::silent().message_or("Failed to save"), "Failed to save");
        assert_eq!(ApiError::new("  ").message_or("Failed to save"), "Failed to save");
    }

    #[test]
    fn test_backend_error_code() {
        let err: Error = ApiError::new("remote rejected").into();
        assert_eq!(err.error_code(), ErrorCode::BackendError);
        assert_eq!(err.exit_code(), 6);
        assert_eq!(err.to_string(), "remote rejected");
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let err = Error::InvalidPath("../x.md".into());
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "INVALID_PATH");
        assert_eq!(json["error"]["exit_code"], 4);
        assert!(json["error"]["hint"].as_str().unwrap().contains(".."));
    }
}
