//! Set-based fast metric.
//!
//! Every component is symmetric in its arguments and lies in `[0, 1]`. Two
//! empty sets agree vacuously (1.0); an empty set against a non-empty one, or
//! two disjoint non-empty sets, score 0.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use canonical::{CanonicalFeatures, Operator};

use crate::types::{FastBreakdown, MetricWeights};

/// Multiset Jaccard over operator counts: `Σ min / Σ max` across the union
/// of buckets.
pub fn operator_jaccard(a: &BTreeMap<Operator, u32>, b: &BTreeMap<Operator, u32>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let mut min_sum: u64 = 0;
    let mut max_sum: u64 = 0;
    let mut left = a.iter().peekable();
    let mut right = b.iter().peekable();
    loop {
        match (left.peek(), right.peek()) {
            (Some((ka, ca)), Some((kb, cb))) => match ka.cmp(kb) {
                Ordering::Less => {
                    max_sum += u64::from(**ca);
                    left.next();
                }
                Ordering::Greater => {
                    max_sum += u64::from(**cb);
                    right.next();
                }
                Ordering::Equal => {
                    min_sum += u64::from((**ca).min(**cb));
                    max_sum += u64::from((**ca).max(**cb));
                    left.next();
                    right.next();
                }
            },
            (Some((_, ca)), None) => {
                max_sum += u64::from(**ca);
                left.next();
            }
            (None, Some((_, cb))) => {
                max_sum += u64::from(**cb);
                right.next();
            }
            (None, None) => break,
        }
    }
    ratio(min_sum, max_sum)
}

/// Plain set Jaccard over literal values.
pub fn literal_jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|v| large.contains(*v)).count() as u64;
    let union = (a.len() + b.len()) as u64 - intersection;
    ratio(intersection, union)
}

/// `min(len) / max(len)` of the two head sequences.
pub fn size_ratio(len_a: usize, len_b: usize) -> f64 {
    ratio(len_a.min(len_b) as u64, len_a.max(len_b) as u64)
}

/// All three components plus their weighted average.
pub fn fast_breakdown(
    a: &CanonicalFeatures,
    b: &CanonicalFeatures,
    weights: &MetricWeights,
) -> FastBreakdown {
    let operators = operator_jaccard(&a.operator_set, &b.operator_set);
    let literals = literal_jaccard(&a.literal_set, &b.literal_set);
    let size = size_ratio(a.head_sequence.len(), b.head_sequence.len());

    let total = weights.total();
    let weighted_average = if total > 0.0 {
        // Numerator accumulated in the same order as `total`, so identical
        // inputs land on exactly 1.0.
        let sum = weights.operators * operators + weights.literals * literals + weights.size * size;
        (sum / total).clamp(0.0, 1.0)
    } else {
        0.0
    };

    FastBreakdown {
        operators,
        literals,
        size,
        weighted_average,
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        1.0
    } else {
        numerator as f64 / denominator as f64
    }
}
