//! Codeplag ingest layer.
//!
//! This is where works enter the pipeline. The loader (filesystem, network,
//! tests) hands us raw bytes or text plus an origin identifier and a language
//! tag; we validate them and return an immutable [`SourceUnit`] that every
//! downstream stage can share across threads.
//!
//! ## What we do here
//!
//! - **Validate origins** - the origin identifier is the cache and report key,
//!   so it must be non-empty after trimming.
//! - **Decode text** - raw bytes must be UTF-8; anything else is rejected with a
//!   typed error rather than lossily decoded.
//! - **Map languages** - [`Language`] knows its file extensions so loaders can
//!   filter directories without hard-coding the table.
//!
//! ## Example
//!
//! ```
//! use ingest::{ingest_bytes, Language};
//!
//! let unit = ingest_bytes("works/a.py", Language::Py, b"print(1)\n".to_vec()).unwrap();
//! assert_eq!(unit.origin(), "works/a.py");
//! ```
use std::time::Instant;

use tracing::{debug, warn};

mod error;
mod types;

pub use crate::error::IngestError;
pub use crate::types::{Language, SourceUnit};

/// Validate raw bytes and wrap them into a [`SourceUnit`], logging the outcome.
pub fn ingest_bytes(
    origin: impl Into<String>,
    language: Language,
    bytes: Vec<u8>,
) -> Result<SourceUnit, IngestError> {
    let start = Instant::now();
    let origin = origin.into();
    let raw_len = bytes.len();

    match SourceUnit::from_bytes(origin.clone(), language, bytes) {
        Ok(unit) => {
            debug!(
                origin = %unit.origin(),
                language = %language,
                raw_len,
                elapsed_micros = start.elapsed().as_micros(),
                "ingest_success"
            );
            Ok(unit)
        }
        Err(err) => {
            warn!(
                origin = %origin,
                language = %language,
                error = %err,
                elapsed_micros = start.elapsed().as_micros(),
                "ingest_failure"
            );
            Err(err)
        }
    }
}
