//! # Codeplag Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` scores pairs of [`CanonicalFeatures`](canonical::CanonicalFeatures)
//! for structural similarity. It sits between the feature layer
//! (`canonical`) and the corpus orchestrator at the workspace root, and never
//! touches source text or the filesystem.
//!
//! ## Two tiers
//!
//! - **Fast metric**: weighted average of the operator-multiset Jaccard, the
//!   literal-set Jaccard and the head-sequence size ratio. Linear in the set
//!   sizes and used as the only prefilter.
//! - **Precise metric**: longest common subsequence of the two head sequences,
//!   normalized as `2 * lcs / (len_a + len_b)`. Quadratic, so it only runs for
//!   pairs whose fast metric clears [`CompareConfig::prefilter_cutoff`].
//!   Aligned runs are mapped back to source lines as [`Fragment`]s.
//!
//! A pair is flagged when `max(fast, precise) * 100 >= threshold`.
//!
//! ## Example Usage
//!
//! ```
//! use canonical::{extract, ExtractConfig};
//! use ingest::{Language, SourceUnit};
//! use matcher::{CompareConfig, Comparator};
//!
//! let cfg = ExtractConfig::default();
//! let a = SourceUnit::new("a.py", Language::Py, "x = 1\nprint(x + 2)\n").unwrap();
//! let b = SourceUnit::new("b.py", Language::Py, "y = 1\nprint(y + 2)\n").unwrap();
//! let fa = extract(&a, &cfg).unwrap();
//! let fb = extract(&b, &cfg).unwrap();
//!
//! let comparator = Comparator::new(CompareConfig::default()).unwrap();
//! let result = comparator.compare(a.origin(), &fa, b.origin(), &fb);
//! assert_eq!(result.precise_metric, Some(1.0));
//! assert!(result.matched);
//! ```

pub mod align;
pub mod engine;
pub mod fast;
pub mod types;

pub use crate::engine::Comparator;
pub use crate::types::{
    CompareConfig, CompareError, ComparisonResult, FastBreakdown, Fragment, MetricWeights,
    PreciseScore,
};
