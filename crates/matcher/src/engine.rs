use canonical::CanonicalFeatures;
use tracing::{debug, trace, warn};

use crate::align::{lcs_alignment, merge_fragments};
use crate::fast::fast_breakdown;
use crate::types::{CompareConfig, CompareError, ComparisonResult, FastBreakdown, PreciseScore};


/// Slack for scores whose exact value is a whole percentage but whose `f64`
/// product lands just below it (`0.57 * 100.0 == 56.99999999999999`).
const PERCENT_TOLERANCE: f64 = 1e-9;

/// Two-tier structural comparator.
///
/// Holds only validated configuration, so one instance is shared by every
/// worker for the whole run.
#[derive(Debug, Clone)]
pub struct Comparator {
    config: CompareConfig,
}

impl Comparator {
    /// Build a comparator, rejecting invalid configuration up front.
    pub fn new(config: CompareConfig) -> Result<Self, CompareError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Weighted fast metric in `[0, 1]`.
    pub fn fast(&self, a: &CanonicalFeatures, b: &CanonicalFeatures) -> f64 {
        self.fast_breakdown(a, b).weighted_average
    }

    pub fn fast_breakdown(&self, a: &CanonicalFeatures, b: &CanonicalFeatures) -> FastBreakdown {
        fast_breakdown(a, b, &self.config.weights)
    }

    /// LCS alignment score and the matched source fragments.
    pub fn precise(
        &self,
        a: &CanonicalFeatures,
        b: &CanonicalFeatures,
    ) -> Result<PreciseScore, CompareError> {
        let alignment = lcs_alignment(
            &a.head_sequence,
            &b.head_sequence,
            self.config.max_alignment_cells,
        )?;
        let score = alignment.score(a.head_sequence.len(), b.head_sequence.len());
        let fragments = merge_fragments(&alignment.pairs, a, b);
        Ok(PreciseScore {
            score,
            lcs_len: alignment.lcs_len,
            fragments,
        })
    }

    /// `max(fast, precise) * 100 >= threshold`.
    pub fn is_match(&self, fast: f64, precise: Option<f64>) -> bool {
        let best = precise.map_or(fast, |p| p.max(fast));
        best * 100.0 + PERCENT_TOLERANCE >= f64::from(self.config.threshold)
    }

    /// Score one pair: fast metric always, precise only past the prefilter.
    ///
    /// Never fails: an alignment that cannot be computed leaves
    /// `precise_metric` empty and records the reason on the result.
    pub fn compare(
        &self,
        first: &str,
        a: &CanonicalFeatures,
        second: &str,
        b: &CanonicalFeatures,
    ) -> ComparisonResult {
        let fast = self.fast_breakdown(a, b);
        let fast_metric = fast.weighted_average;

        let mut precise_metric = None;
        let mut matched_fragments = Vec::new();
        let mut precise_error = None;

        if fast_metric >= self.config.prefilter_cutoff {
            match self.precise(a, b) {
                Ok(precise) => {
                    debug!(
                        first,
                        second,
                        fast = fast_metric,
                        precise = precise.score,
                        lcs = precise.lcs_len,
                        fragments = precise.fragments.len(),
                        "pair_escalated"
                    );
                    precise_metric = Some(precise.score);
                    matched_fragments = precise.fragments;
                }
                Err(err) => {
                    warn!(first, second, error = %err, "pair_unscored");
                    precise_error = Some(err);
                }
            }
        } else {
            trace!(
                first,
                second,
                fast = fast_metric,
                cutoff = self.config.prefilter_cutoff,
                "pair_prefiltered"
            );
        }

        ComparisonResult {
            first: first.to_string(),
            second: second.to_string(),
            fast,
            fast_metric,
            matched: self.is_match(fast_metric, precise_metric),
            precise_metric,
            matched_fragments,
            precise_error,
        }
    }
}
