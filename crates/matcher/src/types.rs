use canonical::LineRange;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relative weights of the three fast-metric components.
///
/// Weights need not sum to one; the fast metric divides by their total.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricWeights {
    /// Weight of the operator-multiset Jaccard.
    #[serde(default = "MetricWeights::default_operators")]
    pub operators: f64,
    /// Weight of the literal-set Jaccard. Literals are cheap to change, so
    /// the default keeps this below the operator weight.
    #[serde(default = "MetricWeights::default_literals")]
    pub literals: f64,
    /// Weight of the head-sequence length ratio.
    #[serde(default = "MetricWeights::default_size")]
    pub size: f64,
}

impl MetricWeights {
    pub(crate) fn default_operators() -> f64 {
        0.5
    }

    pub(crate) fn default_literals() -> f64 {
        0.2
    }

    pub(crate) fn default_size() -> f64 {
        0.3
    }

    /// Sum of the weights, always accumulated in the same order.
    pub fn total(&self) -> f64 {
        self.operators + self.literals + self.size
    }

    fn validate(&self) -> Result<(), CompareError> {
        for (name, value) in [
            ("operators", self.operators),
            ("literals", self.literals),
            ("size", self.size),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CompareError::InvalidConfig(format!(
                    "weights.{name} must be a finite, non-negative number"
                )));
            }
        }
        if self.total() <= 0.0 {
            return Err(CompareError::InvalidConfig(
                "at least one fast-metric weight must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            operators: Self::default_operators(),
            literals: Self::default_literals(),
            size: Self::default_size(),
        }
    }
}

/// Configuration for pairwise comparison.
///
/// Cheap to clone and serde-friendly so it can be embedded in the run config
/// and echoed into reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompareConfig {
    /// Configuration schema version; must be >= 1.
    #[serde(default = "CompareConfig::default_version")]
    pub version: u32,
    /// Match threshold as an integer percentage in `0..=100`.
    #[serde(default = "CompareConfig::default_threshold")]
    pub threshold: u8,
    /// Pairs whose fast metric falls below this ratio never reach alignment.
    #[serde(default = "CompareConfig::default_prefilter_cutoff")]
    pub prefilter_cutoff: f64,
    #[serde(default)]
    pub weights: MetricWeights,
    /// Upper bound on `len_a * len_b` for a single alignment table.
    #[serde(default = "CompareConfig::default_max_alignment_cells")]
    pub max_alignment_cells: u64,
}

impl CompareConfig {
    pub(crate) fn default_version() -> u32 {
        1
    }

    pub(crate) fn default_threshold() -> u8 {
        65
    }

    pub(crate) fn default_prefilter_cutoff() -> f64 {
        0.3
    }

    pub(crate) fn default_max_alignment_cells() -> u64 {
        16_000_000
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_prefilter_cutoff(mut self, cutoff: f64) -> Self {
        self.prefilter_cutoff = cutoff;
        self
    }

    pub fn with_weights(mut self, weights: MetricWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_max_alignment_cells(mut self, cells: u64) -> Self {
        self.max_alignment_cells = cells;
        self
    }

    pub fn validate(&self) -> Result<(), CompareError> {
        if self.version < 1 {
            return Err(CompareError::InvalidConfig(
                "compare version must be >= 1".into(),
            ));
        }
        if self.threshold > 100 {
            return Err(CompareError::InvalidConfig(
                "threshold must be between 0 and 100".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.prefilter_cutoff) {
            return Err(CompareError::InvalidConfig(
                "prefilter_cutoff must be between 0.0 and 1.0".into(),
            ));
        }
        if self.max_alignment_cells == 0 {
            return Err(CompareError::InvalidConfig(
                "max_alignment_cells must be greater than zero".into(),
            ));
        }
        self.weights.validate()
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            version: Self::default_version(),
            threshold: Self::default_threshold(),
            prefilter_cutoff: Self::default_prefilter_cutoff(),
            weights: MetricWeights::default(),
            max_alignment_cells: Self::default_max_alignment_cells(),
        }
    }
}

/// Per-component view of the fast metric.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FastBreakdown {
    pub operators: f64,
    pub literals: f64,
    pub size: f64,
    pub weighted_average: f64,
}

/// A pair of source regions covered by one contiguous aligned run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fragment {
    pub first: LineRange,
    pub second: LineRange,
}

/// Output of the precise metric.
#[derive(Debug, Clone, PartialEq)]
pub struct PreciseScore {
    pub score: f64,
    pub lcs_len: usize,
    pub fragments: Vec<Fragment>,
}

/// Outcome of comparing one pair of works.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub first: String,
    pub second: String,
    pub fast: FastBreakdown,
    /// Same value as `fast.weighted_average`.
    pub fast_metric: f64,
    /// `None` when the pair was prefiltered or could not be aligned.
    pub precise_metric: Option<f64>,
    pub matched_fragments: Vec<Fragment>,
    pub matched: bool,
    /// Why alignment failed, when it was attempted and did not complete.
    pub precise_error: Option<CompareError>,
}

impl ComparisonResult {
    /// Whether the pair cleared the prefilter and alignment was attempted.
    pub fn escalated(&self) -> bool {
        self.precise_metric.is_some() || self.precise_error.is_some()
    }
}

/// Errors produced by the comparison layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompareError {
    /// Invalid configuration, detected before any pair is scored.
    #[error("invalid compare config: {0}")]
    InvalidConfig(String),
    /// The alignment table for this pair would exceed the configured bound.
    #[error("alignment of {rows}x{cols} tokens exceeds the limit of {limit} cells")]
    AlignmentTooLarge { rows: usize, cols: usize, limit: u64 },
}
