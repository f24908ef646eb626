//! Token-level Levenshtein distance with operation accounting.
//!
//! For a reference \(r_1..r_m\) and a hypothesis \(h_1..h_n\) we fill the table
//! \[
//! D_{i,j} = \min\left(D_{i-1,j} + 1,\; D_{i,j-1} + 1,\; D_{i-1,j-1} + [r_i \ne h_j]\right)
//! \]
//! with boundary conditions \(D_{i,0}=i\) and \(D_{0,j}=j\). The distance is \(D_{m,n}\).
//!
//! Rows index the reference and columns index the hypothesis, so:
//! - a vertical step (reference token with no hypothesis counterpart) is a **deletion**,
//! - a horizontal step (hypothesis token with no reference counterpart) is an **insertion**.
//!
//! One optimal path is recovered by walking back from \((m,n)\) to \((0,0)\). When several
//! predecessors achieve the minimum, the walk prefers the diagonal, then the deletion,
//! then the insertion. The counters are accumulated along that path, so a tie between one
//! substitution and an insertion/deletion pair is always reported as a substitution.
//!
//! Cost is \(O(mn)\) in both time and memory: the whole table is kept so callers can
//! inspect it.

use ndarray::{s, Array2, ArrayView2};
use tracing::debug;

/// Kind of a single aligned step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operation {
    /// Reference and hypothesis tokens are equal.
    Correct,
    /// Reference and hypothesis tokens differ.
    Substitution,
    /// Hypothesis token with no reference counterpart.
    Insertion,
    /// Reference token with no hypothesis counterpart.
    Deletion,
}

/// One step of the recovered alignment.
///
/// `reference` / `hypothesis` hold the 0-based index of the token consumed on that side,
/// or `None` when the step does not consume a token there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    /// What this step does.
    pub operation: Operation,
    /// Reference token index, if consumed.
    pub reference: Option<usize>,
    /// Hypothesis token index, if consumed.
    pub hypothesis: Option<usize>,
}

/// Operation counts along the recovered alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Counters {
    /// Number of substituted tokens.
    pub substitutions: usize,
    /// Number of inserted (hypothesis-only) tokens.
    pub insertions: usize,
    /// Number of deleted (reference-only) tokens.
    pub deletions: usize,
    /// Number of matching tokens.
    pub correct: usize,
}

impl Counters {
    /// Total number of edits, `substitutions + insertions + deletions`.
    pub fn total(&self) -> usize {
        self.substitutions + self.insertions + self.deletions
    }

    /// Edits per reference token (the word error rate when tokens are words).
    ///
    /// An empty reference scores `0.0` when there are no edits and `1.0` otherwise.
    pub fn error_rate(&self, reference_len: usize) -> f64 {
        let edits = self.total();
        if reference_len == 0 {
            return if edits == 0 { 0.0 } else { 1.0 };
        }
        edits as f64 / reference_len as f64
    }

    fn record(&mut self, operation: Operation) {
        match operation {
            Operation::Correct => self.correct += 1,
            Operation::Substitution => self.substitutions += 1,
            Operation::Insertion => self.insertions += 1,
            Operation::Deletion => self.deletions += 1,
        }
    }
}

/// Result of a token-level Levenshtein computation.
///
/// Built once by [`levenshtein`] and read-only afterwards.
///
/// With the `serde` feature, deserialization checks that the parts agree with each other
/// (see `Error`) so a decoded result is as consistent as a computed one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawLevenshtein<T>")
)]
pub struct Levenshtein<T> {
    distance: usize,
    counters: Counters,
    matrix: Array2<usize>,
    alignment: Vec<Step>,
    reference: Vec<T>,
    hypothesis: Vec<T>,
}

/// Reasons a deserialized result is rejected.
#[cfg(feature = "serde")]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The table does not have one more row and column than there are tokens.
    #[error("matrix has shape {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    MatrixShape {
        /// Rows in the provided table.
        rows: usize,
        /// Columns in the provided table.
        cols: usize,
        /// `reference.len() + 1`.
        expected_rows: usize,
        /// `hypothesis.len() + 1`.
        expected_cols: usize,
    },
    /// `distance` is not the bottom-right cell of the table.
    #[error("distance {distance} does not match matrix corner {corner}")]
    DistanceMismatch {
        /// Stored distance.
        distance: usize,
        /// Bottom-right cell of the table.
        corner: usize,
    },
    /// The counters do not add up to the distance.
    #[error("counters total {total} edits, expected {distance}")]
    CountersMismatch {
        /// `counters.total()`.
        total: usize,
        /// Stored distance.
        distance: usize,
    },
    /// The alignment does not walk both sequences in order or disagrees with the counters.
    #[error("alignment is inconsistent with the counters or token sequences")]
    Alignment,
}

/// Convenience result type for this module.
#[cfg(feature = "serde")]
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawLevenshtein<T> {
    distance: usize,
    counters: Counters,
    matrix: Array2<usize>,
    alignment: Vec<Step>,
    reference: Vec<T>,
    hypothesis: Vec<T>,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<RawLevenshtein<T>> for Levenshtein<T> {
    type Error = Error;

    fn try_from(raw: RawLevenshtein<T>) -> Result<Self> {
        let (m, n) = (raw.reference.len(), raw.hypothesis.len());
        let (rows, cols) = raw.matrix.dim();
        if (rows, cols) != (m + 1, n + 1) {
            return Err(Error::MatrixShape {
                rows,
                cols,
                expected_rows: m + 1,
                expected_cols: n + 1,
            });
        }
        let corner = raw.matrix[[m, n]];
        if raw.distance != corner {
            return Err(Error::DistanceMismatch {
                distance: raw.distance,
                corner,
            });
        }
        if raw.counters.total() != raw.distance {
            return Err(Error::CountersMismatch {
                total: raw.counters.total(),
                distance: raw.distance,
            });
        }

        let mut recount = Counters::default();
        let (mut next_r, mut next_h) = (0, 0);
        for step in &raw.alignment {
            let expected = match step.operation {
                Operation::Correct | Operation::Substitution => (Some(next_r), Some(next_h)),
                Operation::Deletion => (Some(next_r), None),
                Operation::Insertion => (None, Some(next_h)),
            };
            if (step.reference, step.hypothesis) != expected {
                return Err(Error::Alignment);
            }
            next_r += usize::from(step.reference.is_some());
            next_h += usize::from(step.hypothesis.is_some());
            recount.record(step.operation);
        }
        if recount != raw.counters || (next_r, next_h) != (m, n) {
            return Err(Error::Alignment);
        }

        Ok(Self {
            distance: raw.distance,
            counters: raw.counters,
            matrix: raw.matrix,
            alignment: raw.alignment,
            reference: raw.reference,
            hypothesis: raw.hypothesis,
        })
    }
}

impl<T: PartialEq + Clone> Levenshtein<T> {
    /// Same as [`levenshtein`].
    pub fn compute(reference: &[T], hypothesis: &[T]) -> Self {
        levenshtein(reference, hypothesis)
    }
}

impl<T> Levenshtein<T> {
    /// Minimum number of token edits turning the reference into the hypothesis.
    pub fn distance(&self) -> usize {
        self.distance
    }

    /// Operation counts along the recovered alignment.
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Cost matrix without the initialization border.
    ///
    /// Shape is `(reference.len(), hypothesis.len())`; cell `(i, j)` is the distance between
    /// the first `i + 1` reference tokens and the first `j + 1` hypothesis tokens.
    pub fn matrix(&self) -> ArrayView2<'_, usize> {
        self.matrix.slice(s![1.., 1..])
    }

    /// Full `(m+1) x (n+1)` dynamic-programming table, border included.
    pub fn full_matrix(&self) -> ArrayView2<'_, usize> {
        self.matrix.view()
    }

    /// Recovered alignment, in reference order.
    pub fn alignment(&self) -> &[Step] {
        &self.alignment
    }

    /// Reference tokens.
    pub fn reference(&self) -> &[T] {
        &self.reference
    }

    /// Hypothesis tokens.
    pub fn hypothesis(&self) -> &[T] {
        &self.hypothesis
    }

    /// Edits per reference token. See [`Counters::error_rate`].
    pub fn error_rate(&self) -> f64 {
        self.counters.error_rate(self.reference.len())
    }
}

/// Compute the token-level Levenshtein distance between `reference` and `hypothesis`.
///
/// Empty inputs are fine: against an empty hypothesis every reference token is a
/// deletion, against an empty reference every hypothesis token is an insertion.
///
/// Time and memory are both quadratic in the input lengths.
pub fn levenshtein<T: PartialEq + Clone>(reference: &[T], hypothesis: &[T]) -> Levenshtein<T> {
    let matrix = cost_matrix(reference, hypothesis);
    let (counters, alignment) = backtrace(&matrix, reference, hypothesis);
    let distance = matrix[[reference.len(), hypothesis.len()]];
    debug!(
        reference_len = reference.len(),
        hypothesis_len = hypothesis.len(),
        distance,
        "computed levenshtein distance"
    );

    Levenshtein {
        distance,
        counters,
        matrix,
        alignment,
        reference: reference.to_vec(),
        hypothesis: hypothesis.to_vec(),
    }
}

fn substitution_cost<T: PartialEq>(a: &T, b: &T) -> usize {
    usize::from(a != b)
}

fn cost_matrix<T: PartialEq>(reference: &[T], hypothesis: &[T]) -> Array2<usize> {
    let m = reference.len();
    let n = hypothesis.len();

    let mut d = Array2::<usize>::zeros((m + 1, n + 1));
    for i in 0..=m {
        d[[i, 0]] = i;
    }
    for j in 0..=n {
        d[[0, j]] = j;
    }

    for i in 1..=m {
        for j in 1..=n {
            let deletion = d[[i - 1, j]] + 1;
            let insertion = d[[i, j - 1]] + 1;
            let diagonal =
                d[[i - 1, j - 1]] + substitution_cost(&reference[i - 1], &hypothesis[j - 1]);
            d[[i, j]] = diagonal.min(deletion).min(insertion);
        }
    }
    d
}

fn backtrace<T: PartialEq>(
    d: &Array2<usize>,
    reference: &[T],
    hypothesis: &[T],
) -> (Counters, Vec<Step>) {
    let (mut i, mut j) = (reference.len(), hypothesis.len());
    let mut counters = Counters::default();
    let mut steps = Vec::with_capacity(i.max(j));

    while i > 0 || j > 0 {
        let here = d[[i, j]];
        let step = if i > 0
            && j > 0
            && d[[i - 1, j - 1]] + substitution_cost(&reference[i - 1], &hypothesis[j - 1]) == here
        {
            i -= 1;
            j -= 1;
            let operation = if reference[i] == hypothesis[j] {
                Operation::Correct
            } else {
                Operation::Substitution
            };
            Step {
                operation,
                reference: Some(i),
                hypothesis: Some(j),
            }
        } else if i > 0 && d[[i - 1, j]] + 1 == here {
            i -= 1;
            Step {
                operation: Operation::Deletion,
                reference: Some(i),
                hypothesis: None,
            }
        } else {
            // Only the horizontal move can achieve the minimum here, and j > 0.
            j -= 1;
            Step {
                operation: Operation::Insertion,
                reference: None,
                hypothesis: Some(j),
            }
        };
        counters.record(step.operation);
        steps.push(step);
    }

    steps.reverse();
    (counters, steps)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn toks(s: &[&str]) -> Vec<String> {
        s.iter().map(|t| (*t).to_string()).collect()
    }

    fn two_row_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
        // Plain rolling-row DP, independent of the full-table implementation.
        let mut prev: Vec<usize> = (0..=b.len()).collect();
        let mut curr = vec![0usize; b.len() + 1];
        for i in 1..=a.len() {
            curr[0] = i;
            for j in 1..=b.len() {
                let cost = usize::from(a[i - 1] != b[j - 1]);
                curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            }
            std::mem::swap(&mut prev, &mut curr);
        }
        prev[b.len()]
    }

    #[test]
    fn identical_sequences_are_all_correct() {
        let r = toks(&["a", "b", "c"]);
        let res = levenshtein(&r, &r);
        assert_eq!(res.distance(), 0);
        assert_eq!(
            res.counters(),
            Counters {
                substitutions: 0,
                insertions: 0,
                deletions: 0,
                correct: 3
            }
        );
    }

    #[test]
    fn single_substitution() {
        let res = levenshtein(&toks(&["a", "b", "c"]), &toks(&["a", "x", "c"]));
        assert_eq!(res.distance(), 1);
        let c = res.counters();
        assert_eq!(c.substitutions, 1);
        assert_eq!(c.correct, 2);
        assert_eq!(c.insertions + c.deletions, 0);
    }

    #[test]
    fn extra_hypothesis_token_is_an_insertion() {
        let res = levenshtein(&toks(&["a", "b"]), &toks(&["a", "b", "c"]));
        assert_eq!(res.distance(), 1);
        let c = res.counters();
        assert_eq!(c.insertions, 1);
        assert_eq!(c.correct, 2);
        assert_eq!(c.substitutions + c.deletions, 0);
        assert_eq!(
            res.alignment().last(),
            Some(&Step {
                operation: Operation::Insertion,
                reference: None,
                hypothesis: Some(2),
            })
        );
    }

    #[test]
    fn empty_reference_is_all_insertions() {
        let res = levenshtein(&[], &toks(&["a", "b"]));
        assert_eq!(res.distance(), 2);
        let c = res.counters();
        assert_eq!(c.insertions, 2);
        assert_eq!(c.correct + c.substitutions + c.deletions, 0);
        assert_eq!(res.matrix().dim(), (0, 2));
        assert_eq!(res.full_matrix().dim(), (1, 3));
    }

    #[test]
    fn empty_hypothesis_is_all_deletions() {
        let res = levenshtein(&toks(&["a", "b", "c"]), &[]);
        assert_eq!(res.distance(), 3);
        assert_eq!(res.counters().deletions, 3);
        assert_eq!(res.matrix().dim(), (3, 0));
    }

    #[test]
    fn both_empty() {
        let res = levenshtein::<String>(&[], &[]);
        assert_eq!(res.distance(), 0);
        assert_eq!(res.counters(), Counters::default());
        assert!(res.alignment().is_empty());
        assert_eq!(res.error_rate(), 0.0);
    }

    #[test]
    fn ties_prefer_the_diagonal() {
        // Two substitutions and a deletion+insertion pair both cost 2 here.
        let res = levenshtein(&["a", "b"], &["b", "a"]);
        assert_eq!(res.distance(), 2);
        assert_eq!(res.counters().substitutions, 2);
        assert_eq!(res.counters().insertions, 0);
        assert_eq!(res.counters().deletions, 0);
    }

    #[test]
    fn exposed_matrix_drops_the_border() {
        let res = levenshtein(&["kitten", "sat"], &["kitten", "sat", "down"]);
        let full = res.full_matrix();
        assert_eq!(full.row(0).to_vec(), vec![0, 1, 2, 3]);
        assert_eq!(full.column(0).to_vec(), vec![0, 1, 2]);

        let m = res.matrix();
        assert_eq!(m.dim(), (2, 3));
        assert_eq!(m.row(0).to_vec(), vec![0, 1, 2]);
        assert_eq!(m.row(1).to_vec(), vec![1, 0, 1]);
        assert_eq!(m[[1, 2]], res.distance());
    }

    #[test]
    fn alignment_walks_both_sequences_in_order() {
        let res = levenshtein(
            &["the", "cat", "sat", "on", "mat"],
            &["the", "cat", "sit", "on", "the", "mat"],
        );
        assert_eq!(res.distance(), 2);
        let ops: Vec<Operation> = res.alignment().iter().map(|s| s.operation).collect();
        assert_eq!(
            ops,
            vec![
                Operation::Correct,
                Operation::Correct,
                Operation::Substitution,
                Operation::Correct,
                Operation::Insertion,
                Operation::Correct,
            ]
        );
        let refs: Vec<usize> = res.alignment().iter().filter_map(|s| s.reference).collect();
        assert_eq!(refs, vec![0, 1, 2, 3, 4]);
        let hyps: Vec<usize> = res.alignment().iter().filter_map(|s| s.hypothesis).collect();
        assert_eq!(hyps, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn error_rate_is_edits_per_reference_token() {
        let res = levenshtein(&["a", "b", "c", "d"], &["a", "b", "x", "d"]);
        assert!((res.error_rate() - 0.25).abs() < 1e-12);

        let res = levenshtein(&[], &["a"]);
        assert_eq!(res.error_rate(), 1.0);
    }

    #[test]
    fn compute_is_an_alias() {
        let a = Levenshtein::compute(&[1, 2, 3], &[1, 3]);
        let b = levenshtein(&[1, 2, 3], &[1, 3]);
        assert_eq!(a, b);
        assert_eq!(a.counters().deletions, 1);
    }

    #[test]
    fn result_keeps_token_copies() {
        let r = toks(&["x", "y"]);
        let h = toks(&["y"]);
        let res = levenshtein(&r, &h);
        drop((r, h));
        assert_eq!(res.reference(), toks(&["x", "y"]).as_slice());
        assert_eq!(res.hypothesis(), toks(&["y"]).as_slice());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn result_serde_roundtrip() {
        let res = levenshtein(&toks(&["a", "b"]), &toks(&["a", "c", "b"]));
        let json = serde_json::to_string(&res).unwrap();
        let back: Levenshtein<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, res);
    }

    #[cfg(feature = "serde")]
    fn decode_tampered(edit: impl FnOnce(&mut serde_json::Value)) -> String {
        let res = levenshtein(&toks(&["a", "b"]), &toks(&["a", "c", "b"]));
        let mut value = serde_json::to_value(&res).unwrap();
        edit(&mut value);
        serde_json::from_value::<Levenshtein<String>>(value)
            .unwrap_err()
            .to_string()
    }

    #[cfg(feature = "serde")]
    #[test]
    fn inconsistent_results_are_rejected_on_decode() {
        use serde_json::json;

        let err = decode_tampered(|v| v["distance"] = json!(7));
        assert!(err.contains("distance 7 does not match matrix corner 1"), "{err}");

        let err = decode_tampered(|v| v["matrix"] = json!({"v": 1, "dim": [0, 0], "data": []}));
        assert!(err.contains("matrix has shape 0x0, expected 3x4"), "{err}");

        let err = decode_tampered(|v| v["counters"]["insertions"] = json!(0));
        assert!(err.contains("counters total 0 edits, expected 1"), "{err}");

        let err = decode_tampered(|v| v["alignment"][0]["reference"] = json!(5));
        assert!(err.contains("alignment is inconsistent"), "{err}");

        let err = decode_tampered(|v| {
            v["alignment"].as_array_mut().unwrap().pop();
        });
        assert!(err.contains("alignment is inconsistent"), "{err}");
    }

    fn seq() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(0u8..4, 0..12)
    }

    proptest! {
        #[test]
        fn distance_matches_rolling_row_dp(a in seq(), b in seq()) {
            prop_assert_eq!(levenshtein(&a, &b).distance(), two_row_distance(&a, &b));
        }

        #[test]
        fn distance_is_symmetric(a in seq(), b in seq()) {
            prop_assert_eq!(levenshtein(&a, &b).distance(), levenshtein(&b, &a).distance());
        }

        #[test]
        fn self_distance_is_zero(a in seq()) {
            let res = levenshtein(&a, &a);
            prop_assert_eq!(res.distance(), 0);
            prop_assert_eq!(res.counters().correct, a.len());
            prop_assert_eq!(res.counters().total(), 0);
        }

        #[test]
        fn distance_to_empty_is_length(a in seq()) {
            let res = levenshtein(&a, &[]);
            prop_assert_eq!(res.distance(), a.len());
            prop_assert_eq!(res.counters().deletions, a.len());
            prop_assert_eq!(res.counters().substitutions + res.counters().correct, 0);

            let res = levenshtein(&[], &a);
            prop_assert_eq!(res.counters().insertions, a.len());
        }

        #[test]
        fn triangle_inequality(a in seq(), b in seq(), c in seq()) {
            let ac = levenshtein(&a, &c).distance();
            let ab = levenshtein(&a, &b).distance();
            let bc = levenshtein(&b, &c).distance();
            prop_assert!(ac <= ab + bc, "ac={} ab={} bc={}", ac, ab, bc);
        }

        #[test]
        fn counters_account_for_both_sequences(a in seq(), b in seq()) {
            let res = levenshtein(&a, &b);
            let c = res.counters();
            prop_assert_eq!(c.total(), res.distance());
            prop_assert_eq!(c.correct + c.substitutions + c.deletions, a.len());
            prop_assert_eq!(c.correct + c.substitutions + c.insertions, b.len());
            prop_assert_eq!(res.alignment().len(), c.total() + c.correct);
            prop_assert!(res.distance() <= a.len() + b.len());
            prop_assert_eq!(res.distance() == 0, a == b);
        }

        #[test]
        fn every_cell_is_a_prefix_distance(a in seq(), b in seq()) {
            let res = levenshtein(&a, &b);
            let full = res.full_matrix();
            for i in 0..=a.len() {
                for j in 0..=b.len() {
                    let expected = two_row_distance(&a[..i], &b[..j]);
                    prop_assert_eq!(full[[i, j]], expected, "cell ({}, {})", i, j);
                }
            }
        }

        #[test]
        fn matrix_shape_and_corner(a in seq(), b in seq()) {
            let res = levenshtein(&a, &b);
            prop_assert_eq!(res.matrix().dim(), (a.len(), b.len()));
            prop_assert_eq!(res.full_matrix().dim(), (a.len() + 1, b.len() + 1));
            if !a.is_empty() && !b.is_empty() {
                prop_assert_eq!(res.matrix()[[a.len() - 1, b.len() - 1]], res.distance());
            }
        }
    }
}
