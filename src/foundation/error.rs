/// Convenience result type used across cardreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by library APIs.
///
/// Skipping an already-produced item and declining the confirmation gate are not errors; they are
/// reported through [`JobOutcome::Skipped`](crate::JobOutcome::Skipped) and
/// [`BatchOutcome::Cancelled`](crate::BatchOutcome::Cancelled).
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid user-provided configuration, timeline, or command-line input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A requested source record, file, or asset could not be located.
    #[error("not found: {0}")]
    NotFound(String),

    /// A per-item production pipeline failed.
    #[error("worker failure: {0}")]
    Worker(String),

    /// Failures from external media tooling (`ffmpeg`, `ffprobe`) or image decoding.
    #[error("media error: {0}")]
    Media(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`ReelError::Worker`] value.
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::Worker(msg.into())
    }

    /// Build a [`ReelError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for ReelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
