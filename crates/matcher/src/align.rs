//! LCS alignment over head sequences and fragment localization.

use canonical::{CanonicalFeatures, LineRange, NodeKind};

use crate::types::{CompareError, Fragment};

/// Longest common subsequence of two head sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub lcs_len: usize,
    /// Aligned `(index_a, index_b)` pairs, both strictly ascending.
    pub pairs: Vec<(usize, usize)>,
}

impl Alignment {
    /// `2 * lcs / (len_a + len_b)`; two empty sequences align perfectly.
    pub fn score(&self, len_a: usize, len_b: usize) -> f64 {
        let total = len_a + len_b;
        if total == 0 {
            1.0
        } else {
            (2 * self.lcs_len) as f64 / total as f64
        }
    }
}

/// Full-table LCS with a deterministic backtrace.
///
/// On ties the backtrace prefers dropping a token of `a` over dropping one of
/// `b`, so identical inputs always produce identical pairs.
pub fn lcs_alignment(
    a: &[NodeKind],
    b: &[NodeKind],
    max_cells: u64,
) -> Result<Alignment, CompareError> {
    let (n, m) = (a.len(), b.len());
    let cells = (n as u64).saturating_mul(m as u64);
    if cells > max_cells {
        return Err(CompareError::AlignmentTooLarge {
            rows: n,
            cols: m,
            limit: max_cells,
        });
    }
    if n == 0 || m == 0 {
        return Ok(Alignment {
            lcs_len: 0,
            pairs: Vec::new(),
        });
    }

    let width = m + 1;
    let mut table = vec![0u32; (n + 1) * width];
    for i in 1..=n {
        for j in 1..=m {
            table[i * width + j] = if a[i - 1] == b[j - 1] {
                table[(i - 1) * width + (j - 1)] + 1
            } else {
                table[(i - 1) * width + j].max(table[i * width + (j - 1)])
            };
        }
    }

    let lcs_len = table[n * width + m] as usize;
    let mut pairs = Vec::with_capacity(lcs_len);
    let (mut i, mut j) = (n, m);
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            pairs.push((i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if table[(i - 1) * width + j] >= table[i * width + (j - 1)] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    pairs.reverse();

    Ok(Alignment { lcs_len, pairs })
}

/// Merge runs of consecutive aligned pairs into source-line fragments.
///
/// A run continues while both indices advance by exactly one. Each token
/// contributes its start line only: container tokens (`Module`, function
/// bodies) span far past the code they introduce.
pub fn merge_fragments(
    pairs: &[(usize, usize)],
    a: &CanonicalFeatures,
    b: &CanonicalFeatures,
) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut current: Option<(Fragment, (usize, usize))> = None;

    for &(ia, ib) in pairs {
        let (Some(range_a), Some(range_b)) = (start_line(a, ia), start_line(b, ib)) else {
            continue;
        };
        current = match current {
            Some((fragment, (pa, pb))) if ia == pa + 1 && ib == pb + 1 => Some((
                Fragment {
                    first: fragment.first.merge(&range_a),
                    second: fragment.second.merge(&range_b),
                },
                (ia, ib),
            )),
            previous => {
                if let Some((fragment, _)) = previous {
                    fragments.push(fragment);
                }
                Some((
                    Fragment {
                        first: range_a,
                        second: range_b,
                    },
                    (ia, ib),
                ))
            }
        };
    }
    if let Some((fragment, _)) = current {
        fragments.push(fragment);
    }
    fragments
}

fn start_line(features: &CanonicalFeatures, idx: usize) -> Option<LineRange> {
    features
        .position(idx)
        .map(|range| LineRange::new(range.start, range.start))
}
