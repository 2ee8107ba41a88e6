//! Configuration for structural feature extraction.
//!
//! # Versioning
//!
//! Any change to extraction behavior (ignore sets, kind mapping, literal
//! normalization) must be accompanied by a version bump so previously
//! written reports stay attributable to the rules that produced them.
//!
//! # Examples
//!
//! ```rust
//! use canonical::{ExtractConfig, NodeKind};
//! use ingest::Language;
//!
//! let config = ExtractConfig::default();
//! assert!(config.ignore_set(Language::Cpp).contains(&NodeKind::Include));
//! assert!(config.ignore_set(Language::Py).contains(&NodeKind::Docstring));
//!
//! // Keep comments out of the ignore set to study them structurally.
//! let config = ExtractConfig::default().with_ignored(Language::Py, [NodeKind::Import]);
//! assert!(!config.ignore_set(Language::Py).contains(&NodeKind::Comment));
//! ```

use std::collections::BTreeSet;

use ingest::Language;
use serde::{Deserialize, Serialize};

use crate::error::ExtractConfigError;
use crate::kind::NodeKind;

/// Configuration for the language walkers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Configuration schema version; must be >= 1.
    pub version: u32,
    /// Fail units whose syntax tree contains error or missing nodes.
    ///
    /// When `false`, tree-sitter's error recovery is trusted and the
    /// recovered tree is walked as-is.
    pub reject_syntax_errors: bool,
    /// Node kinds whose subtrees are skipped for Python.
    pub python_ignore: BTreeSet<NodeKind>,
    /// Node kinds whose subtrees are skipped for C/C++.
    pub cpp_ignore: BTreeSet<NodeKind>,
}

impl ExtractConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore set in effect for `language`.
    pub fn ignore_set(&self, language: Language) -> &BTreeSet<NodeKind> {
        match language {
            Language::Py => &self.python_ignore,
            Language::Cpp => &self.cpp_ignore,
        }
    }

    /// Replace the ignore set for one language.
    pub fn with_ignored(
        mut self,
        language: Language,
        kinds: impl IntoIterator<Item = NodeKind>,
    ) -> Self {
        let set: BTreeSet<NodeKind> = kinds.into_iter().collect();
        match language {
            Language::Py => self.python_ignore = set,
            Language::Cpp => self.cpp_ignore = set,
        }
        self
    }

    pub fn with_reject_syntax_errors(mut self, reject: bool) -> Self {
        self.reject_syntax_errors = reject;
        self
    }

    pub fn validate(&self) -> Result<(), ExtractConfigError> {
        if self.version < 1 {
            return Err(ExtractConfigError::InvalidConfig(
                "extract version must be >= 1".into(),
            ));
        }
        for (language, set) in [
            (Language::Py, &self.python_ignore),
            (Language::Cpp, &self.cpp_ignore),
        ] {
            if set.contains(&NodeKind::Module) {
                return Err(ExtractConfigError::InvalidConfig(format!(
                    "{language} ignore set must not contain the module root"
                )));
            }
        }
        Ok(())
    }

    pub fn default_python_ignore() -> BTreeSet<NodeKind> {
        BTreeSet::from([NodeKind::Comment, NodeKind::Docstring, NodeKind::Import])
    }

    pub fn default_cpp_ignore() -> BTreeSet<NodeKind> {
        BTreeSet::from([
            NodeKind::Comment,
            NodeKind::Preprocessor,
            NodeKind::MacroInvocation,
            NodeKind::Include,
            NodeKind::Using,
            NodeKind::NamespaceAlias,
        ])
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            version: 1,
            reject_syntax_errors: true,
            python_ignore: Self::default_python_ignore(),
            cpp_ignore: Self::default_cpp_ignore(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = ExtractConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(cfg.reject_syntax_errors);
        assert_eq!(cfg.version, 1);
    }

    #[test]
    fn default_ignore_sets_cover_non_structural_kinds() {
        let cfg = ExtractConfig::default();
        let py = cfg.ignore_set(Language::Py);
        assert!(py.contains(&NodeKind::Import));
        assert!(py.contains(&NodeKind::Comment));
        assert!(!py.contains(&NodeKind::For));

        let cpp = cfg.ignore_set(Language::Cpp);
        for kind in [
            NodeKind::Preprocessor,
            NodeKind::Include,
            NodeKind::Using,
            NodeKind::NamespaceAlias,
            NodeKind::MacroInvocation,
        ] {
            assert!(cpp.contains(&kind), "{kind} should be ignored");
        }
        assert!(!cpp.contains(&NodeKind::Namespace));
    }

    #[test]
    fn version_zero_rejected() {
        let cfg = ExtractConfig {
            version: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ExtractConfigError::InvalidConfig(msg)) if msg.contains("version")
        ));
    }

    #[test]
    fn ignoring_module_rejected() {
        let cfg = ExtractConfig::default().with_ignored(Language::Cpp, [NodeKind::Module]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn serde_roundtrip_uses_kind_names() {
        let cfg = ExtractConfig::default().with_ignored(Language::Py, [NodeKind::Docstring]);
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"docstring\""));
        let back: ExtractConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
