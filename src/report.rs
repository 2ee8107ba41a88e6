//! Report records and their on-disk layout.
//!
//! ```text
//! reports/
//! └── <sha256(first \0 second)>.json   one WorksReport per compared pair
//! ```
//!
//! The reports directory holds pair records only. The [`RunSummary`] goes to
//! a separate path chosen by the caller.
//!
//! Every file is written to a hidden temp file in the same directory and then
//! renamed into place, so a reader never observes a partial record.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use canonical::NodeKind;
use matcher::{CompareConfig, ComparisonResult, FastBreakdown, Fragment};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::cache::FeatureCache;
use crate::corpus::{RunOutcome, SkippedPair, SkippedUnit};
use crate::plan::Mode;

/// Persisted record for one compared pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorksReport {
    pub first_path: String,
    pub second_path: String,
    pub first_heads: Vec<NodeKind>,
    pub second_heads: Vec<NodeKind>,
    pub fast: FastBreakdown,
    pub fast_metric: f64,
    /// `null` when the pair was prefiltered or could not be aligned.
    pub precise_metric: Option<f64>,
    pub matched: bool,
    pub matched_fragments: Vec<Fragment>,
    pub threshold: u8,
    pub mode: Mode,
}

/// Run-level record: counts plus skipped units and pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub mode: Mode,
    pub threshold: u8,
    pub planned_pairs: usize,
    pub compared_pairs: usize,
    pub matched_pairs: usize,
    pub interrupted: bool,
    pub skipped_units: Vec<SkippedUnit>,
    pub skipped_pairs: Vec<SkippedPair>,
}

impl RunSummary {
    /// Write the summary as JSON to `path`, outside any reports directory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf, ReportError> {
        let bytes = serde_json::to_vec_pretty(self)?;
        persist(path.as_ref(), &bytes)
    }
}

/// Turns comparison results into [`WorksReport`]s without touching metrics.
#[derive(Debug, Clone, Copy)]
pub struct ReportBuilder {
    threshold: u8,
    mode: Mode,
}

impl ReportBuilder {
    pub fn new(compare: &CompareConfig, mode: Mode) -> Self {
        Self {
            threshold: compare.threshold,
            mode,
        }
    }

    pub fn build(&self, result: &ComparisonResult, features: &FeatureCache) -> WorksReport {
        let heads = |origin: &str| {
            features
                .get(origin)
                .map(|f| f.head_sequence.clone())
                .unwrap_or_default()
        };
        WorksReport {
            first_path: result.first.clone(),
            second_path: result.second.clone(),
            first_heads: heads(&result.first),
            second_heads: heads(&result.second),
            fast: result.fast,
            fast_metric: result.fast_metric,
            precise_metric: result.precise_metric,
            matched: result.matched,
            matched_fragments: result.matched_fragments.clone(),
            threshold: self.threshold,
            mode: self.mode,
        }
    }

    /// Reports for every scored pair, in plan order.
    pub fn build_all(&self, outcome: &RunOutcome) -> Vec<WorksReport> {
        outcome
            .results
            .iter()
            .map(|result| self.build(result, &outcome.features))
            .collect()
    }

    pub fn summary(&self, outcome: &RunOutcome) -> RunSummary {
        RunSummary {
            mode: self.mode,
            threshold: self.threshold,
            planned_pairs: outcome.planned_pairs,
            compared_pairs: outcome.results.len(),
            matched_pairs: outcome.results.iter().filter(|r| r.matched).count(),
            interrupted: outcome.interrupted,
            skipped_units: outcome.skipped_units.clone(),
            skipped_pairs: outcome.skipped_pairs.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writes reports into a directory, one JSON file per pair.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Use `dir` as the reports directory, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| ReportError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for the ordered pair `(first, second)`.
    pub fn file_name(first: &str, second: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(first.as_bytes());
        hasher.update([0u8]);
        hasher.update(second.as_bytes());
        format!("{}.json", hex::encode(hasher.finalize()))
    }

    pub fn write(&self, report: &WorksReport) -> Result<PathBuf, ReportError> {
        let name = Self::file_name(&report.first_path, &report.second_path);
        let bytes = serde_json::to_vec_pretty(report)?;
        persist(&self.dir.join(name), &bytes)
    }

    /// Write every report; stops at the first I/O failure.
    pub fn write_all<'a>(
        &self,
        reports: impl IntoIterator<Item = &'a WorksReport>,
    ) -> Result<usize, ReportError> {
        let mut written = 0;
        for report in reports {
            self.write(report)?;
            written += 1;
        }
        debug!(dir = %self.dir.display(), written, "reports_written");
        Ok(written)
    }
}

fn persist(target: &Path, bytes: &[u8]) -> Result<PathBuf, ReportError> {
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = target.with_file_name(format!(".{name}.tmp"));
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&tmp, bytes).map_err(|source| ReportError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, target).map_err(|source| ReportError::Io {
        path: target.to_path_buf(),
        source,
    })?;
    Ok(target.to_path_buf())
}
