//! Corpus orchestration: extraction, pair scheduling and result collection.
//!
//! ```text
//!              extraction jobs (one per unit)
//!   units ──► [pool] ──► mpsc ──► scheduler ──► compare jobs ──► [pool]
//!                                   │                               │
//!                        pending counters per pair        Mutex<Vec<(seq, result)>>
//! ```
//!
//! Extraction and comparison share one bounded rayon pool. A pair is
//! scheduled as soon as both of its units have features, so comparisons start
//! while the rest of the corpus is still being parsed.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use canonical::{ExtractConfig, ParseError};
use ingest::SourceUnit;
use matcher::{Comparator, CompareConfig, ComparisonResult};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::FeatureCache;
use crate::plan::{ComparisonPlan, Mode};
use crate::{MetricsSpan, RunError};

/// Execution settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunConfig {
    #[serde(default)]
    pub mode: Mode,
    /// Worker threads; `None` uses the available parallelism.
    #[serde(default)]
    pub workers: Option<usize>,
    /// Log completion in 10% steps.
    #[serde(default)]
    pub show_progress: bool,
}

impl RunConfig {
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn validate(&self) -> Result<(), RunError> {
        if self.workers == Some(0) {
            return Err(RunError::InvalidConfig(
                "workers must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Worker count actually used for the pool.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        })
    }
}

/// A unit that never produced features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedUnit {
    pub origin: String,
    pub reason: String,
}

/// A pair that was compared but could not be fully scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPair {
    pub seq: usize,
    pub first: String,
    pub second: String,
    pub reason: String,
}

/// Everything a run produced, in plan order.
#[derive(Debug)]
pub struct RunOutcome {
    pub mode: Mode,
    /// Scored pairs ordered by their position in the plan.
    pub results: Vec<ComparisonResult>,
    pub features: FeatureCache,
    /// Units whose extraction failed, sorted by origin.
    pub skipped_units: Vec<SkippedUnit>,
    /// Pairs left without a precise metric because alignment failed.
    pub skipped_pairs: Vec<SkippedPair>,
    pub planned_pairs: usize,
    /// `true` when cancellation stopped the run early.
    pub interrupted: bool,
}

/// Runs comparison plans on a bounded worker pool.
pub struct CorpusOrchestrator {
    extract: ExtractConfig,
    comparator: Comparator,
    run: RunConfig,
    pool: ThreadPool,
    cancel: Arc<AtomicBool>,
}

impl CorpusOrchestrator {
    /// Validate every stage's configuration and start the worker pool.
    pub fn new(
        extract: ExtractConfig,
        compare: CompareConfig,
        run: RunConfig,
    ) -> Result<Self, RunError> {
        extract.validate()?;
        let comparator = Comparator::new(compare)?;
        run.validate()?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(run.effective_workers())
            .thread_name(|idx| format!("codeplag-worker-{idx}"))
            .build()
            .map_err(|err| RunError::WorkerPool(err.to_string()))?;

        Ok(Self {
            extract,
            comparator,
            run,
            pool,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Share an externally owned cancellation flag, e.g. one set on SIGINT.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run
    }

    pub fn compare_config(&self) -> &CompareConfig {
        self.comparator.config()
    }

    pub fn many_to_many(&self, units: Vec<SourceUnit>) -> RunOutcome {
        self.execute(ComparisonPlan::many_to_many(units))
    }

    pub fn one_to_one(
        &self,
        first: Vec<SourceUnit>,
        second: Vec<SourceUnit>,
    ) -> Result<RunOutcome, RunError> {
        Ok(self.execute(ComparisonPlan::one_to_one(first, second)?))
    }

    /// Plan according to the configured mode. `reference` is the second list
    /// for `one_to_one` and joins the corpus for `many_to_many`.
    pub fn run(
        &self,
        mut primary: Vec<SourceUnit>,
        reference: Vec<SourceUnit>,
    ) -> Result<RunOutcome, RunError> {
        match self.run.mode {
            Mode::ManyToMany => {
                primary.extend(reference);
                Ok(self.many_to_many(primary))
            }
            Mode::OneToOne => self.one_to_one(primary, reference),
        }
    }

    /// Extract every unit of the plan and score every pair whose units both
    /// parsed. Never fails: per-unit and per-pair problems are reported on
    /// the outcome.
    pub fn execute(&self, plan: ComparisonPlan) -> RunOutcome {
        let start = Instant::now();
        let units = plan.units();
        let pairs = plan.pairs();
        info!(
            mode = %plan.mode(),
            units = units.len(),
            pairs = pairs.len(),
            workers = self.pool.current_num_threads(),
            "run_started"
        );

        let cache = FeatureCache::new();
        let collected: Mutex<Vec<(usize, ComparisonResult)>> =
            Mutex::new(Vec::with_capacity(pairs.len()));
        let progress = Progress::new(pairs.len(), self.run.show_progress);
        let mut pending: Vec<u8> = pairs.iter().map(|pair| pair.dependencies()).collect();
        let mut failed: Vec<SkippedUnit> = Vec::new();

        let cancel = self.cancel.as_ref();
        let extract_cfg = &self.extract;
        let comparator = &self.comparator;
        let (cache_ref, collected_ref, progress_ref) = (&cache, &collected, &progress);

        // in_place_scope keeps the scheduler on the calling thread, so a
        // blocking recv never occupies a pool worker.
        self.pool.in_place_scope(|scope| {
            let (tx, rx) = mpsc::channel::<(usize, Option<Result<(), ParseError>>)>();
            for (idx, unit) in units.iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let outcome = if cancel.load(Ordering::Relaxed) {
                        None
                    } else {
                        Some(cache_ref.get_or_extract(unit, extract_cfg).map(|_| ()))
                    };
                    // The receiver outlives every job in this scope.
                    let _ = tx.send((idx, outcome));
                });
            }
            drop(tx);

            for (idx, outcome) in rx {
                match outcome {
                    None => {}
                    Some(Err(err)) => {
                        failed.push(SkippedUnit {
                            origin: units[idx].origin().to_string(),
                            reason: err.to_string(),
                        });
                    }
                    Some(Ok(())) => {
                        for &seq in plan.pairs_for(idx) {
                            pending[seq] -= 1;
                            if pending[seq] > 0 || cancel.load(Ordering::Relaxed) {
                                continue;
                            }
                            let pair = pairs[seq];
                            let (first, second) = (&units[pair.first], &units[pair.second]);
                            scope.spawn(move |_| {
                                if cancel.load(Ordering::Relaxed) {
                                    return;
                                }
                                let (Some(a), Some(b)) =
                                    (cache_ref.get(first.origin()), cache_ref.get(second.origin()))
                                else {
                                    return;
                                };
                                let span = MetricsSpan::start();
                                let result =
                                    comparator.compare(first.origin(), &a, second.origin(), &b);
                                if let Some(span) = span {
                                    span.record_compare(&result);
                                }
                                collected_ref
                                    .lock()
                                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                                    .push((pair.seq, result));
                                progress_ref.tick();
                            });
                        }
                    }
                }
            }
        });

        let mut collected = collected
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collected.sort_by_key(|(seq, _)| *seq);

        let skipped_pairs: Vec<SkippedPair> = collected
            .iter()
            .filter_map(|(seq, result)| {
                result.precise_error.as_ref().map(|err| SkippedPair {
                    seq: *seq,
                    first: result.first.clone(),
                    second: result.second.clone(),
                    reason: err.to_string(),
                })
            })
            .collect();
        let results: Vec<ComparisonResult> =
            collected.into_iter().map(|(_, result)| result).collect();

        failed.sort_by(|a, b| a.origin.cmp(&b.origin));
        let interrupted = cancel.load(Ordering::Relaxed);
        if interrupted {
            warn!(
                completed = results.len(),
                planned = pairs.len(),
                "run_interrupted"
            );
        }
        debug!(
            extracted = cache.builds(),
            skipped_units = failed.len(),
            skipped_pairs = skipped_pairs.len(),
            "run_details"
        );
        info!(
            compared = results.len(),
            matched = results.iter().filter(|r| r.matched).count(),
            elapsed_millis = start.elapsed().as_millis(),
            "run_finished"
        );

        RunOutcome {
            mode: plan.mode(),
            results,
            features: cache,
            skipped_units: failed,
            skipped_pairs,
            planned_pairs: pairs.len(),
            interrupted,
        }
    }
}

struct Progress {
    total: usize,
    done: AtomicUsize,
    enabled: bool,
}

impl Progress {
    fn new(total: usize, enabled: bool) -> Self {
        Self {
            total,
            done: AtomicUsize::new(0),
            enabled,
        }
    }

    fn tick(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if !self.enabled || self.total == 0 {
            return;
        }
        let decile = done * 10 / self.total;
        if decile > (done - 1) * 10 / self.total {
            info!(done, total = self.total, percent = decile * 10, "run_progress");
        }
    }
}
