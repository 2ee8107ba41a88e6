//! Error types produced by the ingest crate.
//!
//! All errors are typed, cloneable, and comparable so callers can decide per
//! variant whether a unit is skipped or the run is aborted.
//!
//! | Error | Description |
//! |-------|-------------|
//! | [`MissingOrigin`](IngestError::MissingOrigin) | Origin identifier empty after trimming |
//! | [`InvalidUtf8`](IngestError::InvalidUtf8) | Raw bytes are not valid UTF-8 |
//! | [`UnsupportedLanguage`](IngestError::UnsupportedLanguage) | Language tag or extension not recognized |
//!
//! # Examples
//!
//! ```rust
//! use ingest::{IngestError, Language, SourceUnit};
//!
//! match SourceUnit::from_bytes("  ", Language::Py, b"x = 1".to_vec()) {
//!     Err(IngestError::MissingOrigin) => {}
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```
use thiserror::Error;

/// Errors that can occur while materializing a [`SourceUnit`](crate::SourceUnit).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    /// The origin identifier (path or URL) is empty or whitespace-only.
    #[error("source unit requires a non-empty origin identifier")]
    MissingOrigin,

    /// Raw bytes could not be decoded as UTF-8.
    ///
    /// The message carries the origin and the decoder's byte offset.
    #[error("invalid utf-8 payload: {0}")]
    InvalidUtf8(String),

    /// The language tag or file extension is not one of the supported languages.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
}
