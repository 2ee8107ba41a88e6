//! Workspace umbrella crate for codeplag, a structural plagiarism detector.
//!
//! The stage crates do the heavy lifting: `ingest` validates works,
//! `canonical` reduces them to structural features and `matcher` scores
//! pairs. This crate plans and executes whole runs over a corpus, turns the
//! results into persisted reports, and loads works from the filesystem.
//!
//! ```no_run
//! use codeplag::{CompareConfig, CorpusOrchestrator, ExtractConfig, Language, RunConfig, WorkLoader};
//!
//! let units = WorkLoader::new(Language::Py)
//!     .directory("submissions")
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//! let orchestrator = CorpusOrchestrator::new(
//!     ExtractConfig::default(),
//!     CompareConfig::default(),
//!     RunConfig::default(),
//! )
//! .unwrap();
//! let outcome = orchestrator.many_to_many(units);
//! println!("{} pairs scored", outcome.results.len());
//! ```

pub use canonical::{
    extract, CanonicalFeatures, ExtractConfig, ExtractConfigError, LineRange, NodeKind, Operator,
    ParseError, SourcePosition,
};
pub use ingest::{ingest_bytes, IngestError, Language, SourceUnit};
pub use matcher::{
    Comparator, CompareConfig, CompareError, ComparisonResult, FastBreakdown, Fragment,
    MetricWeights,
};

mod cache;
mod config;
mod corpus;
mod loader;
mod plan;
mod report;

pub use crate::cache::FeatureCache;
pub use crate::config::{CodeplagConfig, ConfigLoadError, ExtractYamlConfig, LoggingConfig};
pub use crate::corpus::{CorpusOrchestrator, RunConfig, RunOutcome, SkippedPair, SkippedUnit};
pub use crate::loader::{LoadError, WorkLoader};
pub use crate::plan::{ComparisonPlan, Mode, PlannedPair};
pub use crate::report::{ReportBuilder, ReportError, ReportWriter, RunSummary, WorksReport};

use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use thiserror::Error;

/// Errors that stop a run before any work starts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RunError {
    #[error("invalid run configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Compare(#[from] CompareError),
    #[error(transparent)]
    Extract(#[from] ExtractConfigError),
    #[error("one_to_one needs lists of equal length, got {first} and {second}")]
    UnequalLists { first: usize, second: usize },
    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}

/// Metrics observer for the extraction and comparison stages.
pub trait PipelineMetrics: Send + Sync {
    fn record_extract(&self, latency: Duration, result: Result<(), ParseError>);
    fn record_compare(&self, latency: Duration, escalated: bool, result: Result<(), CompareError>);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

pub(crate) struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    pub(crate) fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    pub(crate) fn record_extract(self, result: Result<(), ParseError>) {
        self.recorder.record_extract(self.start.elapsed(), result);
    }

    pub(crate) fn record_compare(self, result: &ComparisonResult) {
        let outcome = match &result.precise_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        };
        self.recorder
            .record_compare(self.start.elapsed(), result.escalated(), outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingMetrics {
        events: Mutex<Vec<&'static str>>,
    }

    impl CountingMetrics {
        fn snapshot(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().clone()
        }
    }

    impl PipelineMetrics for CountingMetrics {
        fn record_extract(&self, _latency: Duration, result: Result<(), ParseError>) {
            let label = if result.is_ok() { "extract_ok" } else { "extract_err" };
            self.events.lock().unwrap().push(label);
        }

        fn record_compare(
            &self,
            _latency: Duration,
            escalated: bool,
            result: Result<(), CompareError>,
        ) {
            let label = match (escalated, result.is_ok()) {
                (_, false) => "compare_err",
                (true, true) => "compare_escalated",
                (false, true) => "compare_fast_only",
            };
            self.events.lock().unwrap().push(label);
        }
    }

    #[test]
    fn metrics_recorder_tracks_run_outcome() {
        let metrics = Arc::new(CountingMetrics::default());
        set_pipeline_metrics(Some(metrics.clone()));

        let units = vec![
            SourceUnit::new("a.py", Language::Py, "x = 1\nprint(x + 2)\n").unwrap(),
            SourceUnit::new("b.py", Language::Py, "y = 1\nprint(y + 2)\n").unwrap(),
            SourceUnit::new("c.py", Language::Py, "   \n").unwrap(),
        ];
        let orchestrator = CorpusOrchestrator::new(
            ExtractConfig::default(),
            CompareConfig::default(),
            RunConfig::default().with_workers(2),
        )
        .unwrap();
        let outcome = orchestrator.many_to_many(units);
        assert_eq!(outcome.results.len(), 1);

        let events = metrics.snapshot();
        assert!(events.iter().filter(|e| **e == "extract_ok").count() >= 2);
        assert!(events.contains(&"extract_err"));
        assert!(events.contains(&"compare_escalated"));

        set_pipeline_metrics(None);
    }

    #[test]
    fn run_error_messages_are_readable() {
        let err = RunError::UnequalLists { first: 3, second: 2 };
        assert_eq!(
            err.to_string(),
            "one_to_one needs lists of equal length, got 3 and 2"
        );
        let err: RunError = CompareError::InvalidConfig("threshold must be between 0 and 100".into()).into();
        assert!(err.to_string().contains("threshold"));
    }
}
