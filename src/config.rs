//! YAML configuration file support.
//!
//! One file describes every stage of a run. Missing sections and fields take
//! the defaults listed below; command-line flags override file values.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "lab 3 check"
//!
//! extract:
//!   version: 1
//!   reject_syntax_errors: true
//!   python_ignore: [comment, import, docstring]
//!   cpp_ignore: [comment, include, preprocessor, macro_invocation, using, namespace_alias]
//!
//! compare:
//!   threshold: 65
//!   prefilter_cutoff: 0.3
//!   weights:
//!     operators: 0.5
//!     literals: 0.2
//!     size: 0.3
//!   max_alignment_cells: 16000000
//!
//! run:
//!   mode: many_to_many
//!   workers: 8
//!   show_progress: true
//!
//! logging:
//!   level: info
//!   json: false
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use canonical::{ExtractConfig, NodeKind};
use matcher::CompareConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::corpus::RunConfig;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for a whole run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct CodeplagConfig {
    /// Configuration format version
    #[serde(default = "default_format_version")]
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub extract: ExtractYamlConfig,

    #[serde(default)]
    pub compare: CompareConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CodeplagConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: CodeplagConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.extract
            .to_extract_config()
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("extract: {err}")))?;
        self.compare
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("compare: {err}")))?;
        self.run
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("run: {err}")))?;
        Ok(())
    }

    pub fn extract_config(&self) -> ExtractConfig {
        self.extract.to_extract_config()
    }
}

impl Default for CodeplagConfig {
    fn default() -> Self {
        Self {
            version: default_format_version(),
            name: None,
            extract: ExtractYamlConfig::default(),
            compare: CompareConfig::default(),
            run: RunConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Extraction section. Omitted ignore lists keep the built-in sets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "true_value")]
    pub reject_syntax_errors: bool,

    #[serde(default)]
    pub python_ignore: Option<BTreeSet<NodeKind>>,

    #[serde(default)]
    pub cpp_ignore: Option<BTreeSet<NodeKind>>,
}

impl ExtractYamlConfig {
    pub fn to_extract_config(&self) -> ExtractConfig {
        let defaults = ExtractConfig::default();
        ExtractConfig {
            version: self.version,
            reject_syntax_errors: self.reject_syntax_errors,
            python_ignore: self
                .python_ignore
                .clone()
                .unwrap_or(defaults.python_ignore),
            cpp_ignore: self.cpp_ignore.clone().unwrap_or(defaults.cpp_ignore),
        }
    }
}

impl Default for ExtractYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            reject_syntax_errors: true,
            python_ignore: None,
            cpp_ignore: None,
        }
    }
}

/// Logging section, consumed by the binary when it installs the subscriber.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_format_version() -> String {
    "1.0".to_string()
}

fn default_version() -> u32 {
    1
}

fn true_value() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
