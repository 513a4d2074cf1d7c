//! Error types shared across Decal crates.

use std::path::PathBuf;

/// Top-level error type for Decal operations.
///
/// Every failure is local to the action that triggered it: nothing here
/// is stored in a global error state and nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum DecalError {
    /// An image source is malformed, unreadable, or in an unsupported format.
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// The composited surface cannot be read back (cross-origin taint).
    #[error("Export blocked: {message}")]
    ExportBlocked { message: String },

    /// The requested capability is not present on this platform.
    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    /// The share facility exists but rejected the payload.
    #[error("Share failed: {message}")]
    ShareFailed { message: String },

    /// Export or selection attempted before the container was measured
    /// or the relevant image finished decoding.
    #[error("Geometry not ready: {message}")]
    GeometryNotReady { message: String },

    #[error("Unknown overlay id: {id}")]
    UnknownOverlay { id: u32 },

    #[error("Overlay gallery is full ({capacity} items)")]
    GalleryFull { capacity: usize },

    #[error("Invalid image source: {message}")]
    InvalidSource { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using DecalError.
pub type DecalResult<T> = Result<T, DecalError>;

impl DecalError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    pub fn export_blocked(msg: impl Into<String>) -> Self {
        Self::ExportBlocked {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    pub fn share_failed(msg: impl Into<String>) -> Self {
        Self::ShareFailed {
            message: msg.into(),
        }
    }

    pub fn geometry_not_ready(msg: impl Into<String>) -> Self {
        Self::GeometryNotReady {
            message: msg.into(),
        }
    }

    pub fn invalid_source(msg: impl Into<String>) -> Self {
        Self::InvalidSource {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error means "capability missing", which callers log
    /// and fall back from instead of surfacing as a failure.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}
