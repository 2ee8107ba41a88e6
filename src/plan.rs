//! Comparison planning: which pairs of works get scored.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ingest::SourceUnit;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::RunError;

/// How works are paired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Every unordered pair of one corpus.
    #[default]
    ManyToMany,
    /// Index-wise pairing of two equal-length lists.
    OneToOne,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::ManyToMany => "many_to_many",
            Mode::OneToOne => "one_to_one",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "many_to_many" => Ok(Mode::ManyToMany),
            "one_to_one" => Ok(Mode::OneToOne),
            other => Err(format!(
                "unknown mode '{other}', expected many_to_many or one_to_one"
            )),
        }
    }
}

/// One scheduled comparison. `first`/`second` index [`ComparisonPlan::units`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedPair {
    /// Stable position of the pair in the plan; results are ordered by it.
    pub seq: usize,
    pub first: usize,
    pub second: usize,
}

impl PlannedPair {
    /// Number of distinct units this pair waits on.
    pub fn dependencies(&self) -> u8 {
        if self.first == self.second { 1 } else { 2 }
    }
}

/// Deduplicated units plus the pairs to compare between them.
#[derive(Debug, Clone)]
pub struct ComparisonPlan {
    mode: Mode,
    units: Vec<SourceUnit>,
    pairs: Vec<PlannedPair>,
    by_unit: Vec<Vec<usize>>,
}

impl ComparisonPlan {
    /// All `N(N-1)/2` unordered pairs of the distinct origins in `units`.
    ///
    /// Units are sorted by origin first, so the plan does not depend on input
    /// order. Repeated origins collapse to one unit (see [`distinct_by_origin`]).
    pub fn many_to_many(units: Vec<SourceUnit>) -> Self {
        let units: Vec<SourceUnit> = distinct_by_origin(units).into_values().collect();

        let n = units.len();
        let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for first in 0..n {
            for second in first + 1..n {
                pairs.push(PlannedPair {
                    seq: pairs.len(),
                    first,
                    second,
                });
            }
        }
        Self::from_parts(Mode::ManyToMany, units, pairs)
    }

    /// `first[i]` against `second[i]` for every `i`.
    pub fn one_to_one(first: Vec<SourceUnit>, second: Vec<SourceUnit>) -> Result<Self, RunError> {
        if first.len() != second.len() {
            return Err(RunError::UnequalLists {
                first: first.len(),
                second: second.len(),
            });
        }

        let origins: Vec<(String, String)> = first
            .iter()
            .zip(&second)
            .map(|(a, b)| (a.origin().to_string(), b.origin().to_string()))
            .collect();
        let units: Vec<SourceUnit> = distinct_by_origin(first.into_iter().chain(second))
            .into_values()
            .collect();
        let index: BTreeMap<&str, usize> = units
            .iter()
            .enumerate()
            .map(|(idx, unit)| (unit.origin(), idx))
            .collect();

        let pairs: Vec<PlannedPair> = origins
            .iter()
            .enumerate()
            .map(|(seq, (a, b))| PlannedPair {
                seq,
                first: index[a.as_str()],
                second: index[b.as_str()],
            })
            .collect();
        Ok(Self::from_parts(Mode::OneToOne, units, pairs))
    }

    fn from_parts(mode: Mode, units: Vec<SourceUnit>, pairs: Vec<PlannedPair>) -> Self {
        let mut by_unit = vec![Vec::new(); units.len()];
        for pair in &pairs {
            by_unit[pair.first].push(pair.seq);
            if pair.second != pair.first {
                by_unit[pair.second].push(pair.seq);
            }
        }
        Self {
            mode,
            units,
            pairs,
            by_unit,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    pub fn pairs(&self) -> &[PlannedPair] {
        &self.pairs
    }

    /// Sequence numbers of the pairs that reference unit `idx`.
    pub fn pairs_for(&self, idx: usize) -> &[usize] {
        self.by_unit.get(idx).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// One unit per origin, ordered by origin.
///
/// When the same origin arrives with different texts the lexicographically
/// smallest text is kept, so the choice never depends on input order.
fn distinct_by_origin(units: impl IntoIterator<Item = SourceUnit>) -> BTreeMap<String, SourceUnit> {
    let mut distinct: BTreeMap<String, SourceUnit> = BTreeMap::new();
    for unit in units {
        match distinct.entry(unit.origin().to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(unit);
            }
            Entry::Occupied(mut slot) if slot.get().text() != unit.text() => {
                warn!(origin = %unit.origin(), "conflicting_origin");
                if unit.text() < slot.get().text() {
                    slot.insert(unit);
                }
            }
            Entry::Occupied(_) => {
                debug!(origin = %unit.origin(), "duplicate_origin");
            }
        }
    }
    distinct
}
