use std::path::PathBuf;

use thiserror::Error;

/// Subclip's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Subclip's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// A textual time representation could not be normalized or converted.
    ///
    /// Always caused by bad input; never worth retrying.
    #[error("malformed timecode: {0:?}")]
    MalformedTimecode(String),

    /// One segment block in a model reply did not match the expected shape.
    ///
    /// Callers skip the offending block and keep parsing.
    #[error("malformed segment block: {0}")]
    SegmentBlockMalformed(String),

    /// The language-model collaborator could not produce a reply.
    ///
    /// Aborts the current transcript's remaining chunks, but not other transcripts.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// A cut was requested for an empty, inverted, or out-of-bounds time range.
    #[error("invalid time range: {start}s --> {end}s")]
    InvalidRange { start: f64, end: f64 },

    /// The source video for a cut does not exist.
    #[error("source not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}
