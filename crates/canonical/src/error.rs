use std::fmt;

use ingest::Language;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 1-based line/column position inside a source unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A unit could not be reduced to canonical features.
///
/// Per-unit and recoverable: callers skip the unit and keep going.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{origin}: source is empty")]
    EmptySource { origin: String },
    #[error("{origin}: syntax error{}", .position.map(|p| format!(" at {p}")).unwrap_or_default())]
    Syntax {
        origin: String,
        position: Option<SourcePosition>,
    },
    #[error("{origin}: {language} parser unavailable: {reason}")]
    Parser {
        origin: String,
        language: Language,
        reason: String,
    },
}

impl ParseError {
    /// Origin identifier of the unit that failed.
    pub fn origin(&self) -> &str {
        match self {
            ParseError::EmptySource { origin }
            | ParseError::Syntax { origin, .. }
            | ParseError::Parser { origin, .. } => origin,
        }
    }

    /// Source position of the failure, when the parser reported one.
    pub fn position(&self) -> Option<SourcePosition> {
        match self {
            ParseError::Syntax { position, .. } => *position,
            _ => None,
        }
    }
}

/// Invalid extraction configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractConfigError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
