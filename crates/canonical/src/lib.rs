//! Codeplag structural feature layer.
//!
//! This crate reduces a [`SourceUnit`] to [`CanonicalFeatures`]: the pre-order
//! sequence of structural node kinds, the operator multiset and the literal
//! set. Downstream comparison never sees source text again.
//!
//! ## What we do
//!
//! - Parse with tree-sitter (Python and C/C++ grammars)
//! - Map native node kinds onto the closed [`NodeKind`] vocabulary
//! - Skip subtrees in the per-language ignore set (comments, imports,
//!   preprocessor noise)
//! - Normalize operators into shared buckets (`+=` counts as `=` and `+`)
//! - Record the source line range of every emitted token
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock-dependent output. The same text and config give the same
//! features on any machine. Identifier names and whitespace never reach the
//! features; control-flow and expression shape always do.
//!
//! ## Example
//!
//! ```
//! use canonical::{extract, ExtractConfig, NodeKind};
//! use ingest::{Language, SourceUnit};
//!
//! let unit = SourceUnit::new("a.py", Language::Py, "x = 1\n").unwrap();
//! let features = extract(&unit, &ExtractConfig::default()).unwrap();
//! assert_eq!(features.head_sequence[0], NodeKind::Module);
//! assert!(features.literal_set.contains("num:1"));
//! ```

use std::time::Instant;

use ingest::{Language, SourceUnit};
use tracing::{debug, warn};

mod config;
mod cpp;
mod error;
mod features;
mod kind;
mod literal;
mod operator;
mod python;
mod walker;

pub use crate::config::ExtractConfig;
pub use crate::cpp::CppBackend;
pub use crate::error::{ExtractConfigError, ParseError, SourcePosition};
pub use crate::features::{CanonicalFeatures, LineRange, FEATURES_VERSION};
pub use crate::kind::NodeKind;
pub use crate::operator::{normalize_operator, Operator};
pub use crate::python::PythonBackend;
pub use crate::walker::{first_syntax_error, walk, LanguageBackend};

/// Backend for `language` configured with the ignore set from `cfg`.
pub fn backend_for(language: Language, cfg: &ExtractConfig) -> Box<dyn LanguageBackend> {
    let ignore = cfg.ignore_set(language).clone();
    match language {
        Language::Py => Box::new(PythonBackend::new(ignore)),
        Language::Cpp => Box::new(CppBackend::new(ignore)),
    }
}

/// Reduce one unit to its canonical features.
///
/// Failures are per-unit: callers record the [`ParseError`] and carry on with
/// the rest of the corpus.
pub fn extract(unit: &SourceUnit, cfg: &ExtractConfig) -> Result<CanonicalFeatures, ParseError> {
    let start = Instant::now();
    match extract_features(unit, cfg) {
        Ok(features) => {
            debug!(
                origin = %unit.origin(),
                language = %unit.language(),
                tokens = features.total_node_count,
                operators = features.operator_total(),
                literals = features.literal_set.len(),
                elapsed_micros = start.elapsed().as_micros(),
                "extract_success"
            );
            Ok(features)
        }
        Err(err) => {
            warn!(
                origin = %unit.origin(),
                language = %unit.language(),
                error = %err,
                elapsed_micros = start.elapsed().as_micros(),
                "extract_failure"
            );
            Err(err)
        }
    }
}

fn extract_features(unit: &SourceUnit, cfg: &ExtractConfig) -> Result<CanonicalFeatures, ParseError> {
    let text = unit.text();
    if text.trim().is_empty() {
        return Err(ParseError::EmptySource {
            origin: unit.origin().to_string(),
        });
    }

    let mut backend = backend_for(unit.language(), cfg);
    let tree = backend.parse(unit.origin(), text)?;

    if cfg.reject_syntax_errors && tree.root_node().has_error() {
        return Err(ParseError::Syntax {
            origin: unit.origin().to_string(),
            position: first_syntax_error(&tree),
        });
    }

    backend.prepare(&tree, text.as_bytes());
    Ok(walk(backend.as_ref(), &tree, text.as_bytes()))
}
