//! Core data model types for the ingest crate.
//!
//! ```text
//! (origin, language, bytes | text)
//!
//!         ↓ SourceUnit::new / SourceUnit::from_bytes
//!
//! SourceUnit
//! ├── origin: String   (trimmed, non-empty)
//! ├── language: Language
//! └── text: Arc<str>   (immutable, shared)
//! ```
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// Source languages the pipeline can reduce to structural features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Python source (`.py`).
    Py,
    /// C or C++ source (`.cpp`, `.c`, `.h`).
    Cpp,
}

impl Language {
    /// All supported languages, in a stable order.
    pub const ALL: [Language; 2] = [Language::Py, Language::Cpp];

    /// Short lowercase tag, as used on the command line and in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Py => "py",
            Language::Cpp => "cpp",
        }
    }

    /// File extensions (without the leading dot) that belong to this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Py => &["py"],
            Language::Cpp => &["cpp", "c", "h"],
        }
    }

    /// Returns `true` when `path` carries one of this language's extensions.
    pub fn matches_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Detect the language from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.matches_path(path))
            .ok_or_else(|| IngestError::UnsupportedLanguage(path.display().to_string()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "py" | "python" => Ok(Language::Py),
            "cpp" | "c++" | "c" => Ok(Language::Cpp),
            other => Err(IngestError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// A single work: raw source text plus where it came from and how to parse it.
///
/// Immutable once constructed. The text is held behind an `Arc` so units can
/// be handed to worker threads without copying the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    origin: String,
    language: Language,
    text: Arc<str>,
}

impl SourceUnit {
    /// Build a unit from already-decoded text.
    pub fn new(
        origin: impl Into<String>,
        language: Language,
        text: impl Into<Arc<str>>,
    ) -> Result<Self, IngestError> {
        let origin = sanitize_origin(origin.into())?;
        Ok(Self {
            origin,
            language,
            text: text.into(),
        })
    }

    /// Build a unit from raw bytes, rejecting anything that is not UTF-8.
    pub fn from_bytes(
        origin: impl Into<String>,
        language: Language,
        bytes: Vec<u8>,
    ) -> Result<Self, IngestError> {
        let origin = sanitize_origin(origin.into())?;
        let text = String::from_utf8(bytes).map_err(|err| {
            IngestError::InvalidUtf8(format!(
                "{origin}: invalid byte at offset {}",
                err.utf8_error().valid_up_to()
            ))
        })?;
        Ok(Self {
            origin,
            language,
            text: Arc::from(text),
        })
    }

    /// Origin identifier (path or URL). Unique key for caching and reports.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

fn sanitize_origin(origin: String) -> Result<String, IngestError> {
    let trimmed = origin.trim();
    if trimmed.is_empty() {
        return Err(IngestError::MissingOrigin);
    }
    if trimmed.len() == origin.len() {
        Ok(origin)
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn language_extensions_follow_supported_table() {
        assert_eq!(Language::Py.extensions(), &["py"]);
        assert_eq!(Language::Cpp.extensions(), &["cpp", "c", "h"]);
    }

    #[test]
    fn language_from_path() {
        assert_eq!(
            Language::from_path(&PathBuf::from("a/b/main.py")).unwrap(),
            Language::Py
        );
        assert_eq!(
            Language::from_path(&PathBuf::from("lib/util.H")).unwrap(),
            Language::Cpp
        );
        assert!(matches!(
            Language::from_path(&PathBuf::from("README.md")),
            Err(IngestError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn language_parses_aliases() {
        assert_eq!("Python".parse::<Language>().unwrap(), Language::Py);
        assert_eq!("cpp".parse::<Language>().unwrap(), Language::Cpp);
        assert!("rust".parse::<Language>().is_err());
    }

    #[test]
    fn language_serializes_lowercase() {
        let json = serde_json::to_string(&Language::Cpp).unwrap();
        assert_eq!(json, "\"cpp\"");
    }

    #[test]
    fn source_unit_trims_origin() {
        let unit = SourceUnit::new("  src/a.py ", Language::Py, "x = 1\n").unwrap();
        assert_eq!(unit.origin(), "src/a.py");
        assert_eq!(unit.text(), "x = 1\n");
        assert_eq!(unit.language(), Language::Py);
    }

    #[test]
    fn source_unit_rejects_empty_origin() {
        let err = SourceUnit::new("   ", Language::Py, "x = 1").unwrap_err();
        assert_eq!(err, IngestError::MissingOrigin);
    }

    #[test]
    fn source_unit_rejects_invalid_utf8() {
        let err = SourceUnit::from_bytes("bad.cpp", Language::Cpp, vec![b'a', 0xff, b'b'])
            .unwrap_err();
        match err {
            IngestError::InvalidUtf8(msg) => {
                assert!(msg.contains("bad.cpp"));
                assert!(msg.contains("offset 1"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn clones_share_text() {
        let unit = SourceUnit::new("a.py", Language::Py, "pass").unwrap();
        let copy = unit.clone();
        assert_eq!(unit, copy);
        assert!(std::ptr::eq(unit.text(), copy.text()));
    }
}
