//! Canonical feature model produced by the language walkers.
//!
//! The feature schema is part of the public contract: any change that alters
//! extracted features for the same input must bump [`FEATURES_VERSION`].

use std::collections::{BTreeMap, BTreeSet};

use ingest::Language;
use serde::{Deserialize, Serialize};

use crate::kind::NodeKind;
use crate::operator::Operator;

/// Current feature extraction version.
pub const FEATURES_VERSION: u16 = 1;

/// Inclusive, 1-based line range in the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Smallest range covering both `self` and `other`.
    pub fn merge(&self, other: &LineRange) -> LineRange {
        LineRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Structural representation of one work.
///
/// Built once per unit and shared by reference (`Arc`) across every
/// comparison that involves the unit. Never mutated after construction.
///
/// Equality covers the structural fields only. `position_index` maps tokens
/// back to source lines for fragment localization, so it moves when lines are
/// re-wrapped even though the structure is unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalFeatures {
    /// Language the features were extracted from.
    pub language: Language,
    /// Pre-order sequence of non-ignored node kinds.
    pub head_sequence: Vec<NodeKind>,
    /// Multiset of normalized operators.
    pub operator_set: BTreeMap<Operator, u32>,
    /// Set of literal values, tagged by literal type (`num:`, `str:`, `chr:`).
    pub literal_set: BTreeSet<String>,
    /// Number of distinct kinds in `head_sequence`.
    pub unique_node_count: usize,
    /// Length of `head_sequence`.
    pub total_node_count: usize,
    /// Source line range for each `head_sequence` position, same order.
    pub position_index: Vec<LineRange>,
    /// Extraction algorithm version.
    pub features_version: u16,
}

impl CanonicalFeatures {
    /// Head sequence rendered as stable kind names, for reports and audits.
    pub fn head_names(&self) -> Vec<&'static str> {
        self.head_sequence.iter().map(NodeKind::as_str).collect()
    }

    /// Total number of operator occurrences (multiset cardinality).
    pub fn operator_total(&self) -> u32 {
        self.operator_set.values().sum()
    }

    /// Line range for a head-sequence position, if in bounds.
    pub fn position(&self, idx: usize) -> Option<LineRange> {
        self.position_index.get(idx).copied()
    }
}

impl PartialEq for CanonicalFeatures {
    fn eq(&self, other: &Self) -> bool {
        self.language == other.language
            && self.features_version == other.features_version
            && self.head_sequence == other.head_sequence
            && self.operator_set == other.operator_set
            && self.literal_set == other.literal_set
            && self.unique_node_count == other.unique_node_count
            && self.total_node_count == other.total_node_count
    }
}

impl Eq for CanonicalFeatures {}
