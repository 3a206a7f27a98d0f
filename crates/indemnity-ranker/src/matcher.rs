//! Approximate matching of normalized country keys
//!
//! ```text
//! ratio(a, b) = 2·M / (|a| + |b|)      M = longest common subsequence
//! match(a, b) ⇔ ratio(a, b) > threshold
//! ```
//!
//! The ratio is computed over chars of already-normalized keys. Raw names
//! with accents and punctuation make the threshold meaningless.

use crate::SIMILARITY_THRESHOLD;

/// Similarity ratio in `[0, 1]` between two normalized keys.
///
/// Two empty keys are identical (`1.0`); one empty key against a
/// non-empty one scores `0.0`.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matches = lcs_length(&a, &b);
    2.0 * matches as f64 / total as f64
}

/// `true` iff the ratio strictly exceeds [`SIMILARITY_THRESHOLD`]
pub fn is_match(a: &str, b: &str) -> bool {
    Matcher::default().is_match(a, b)
}

/// Threshold carrier, so the CLI can tighten or loosen matching
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matcher {
    pub threshold: f64,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            threshold: SIMILARITY_THRESHOLD,
        }
    }
}

impl Matcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn is_match(&self, a: &str, b: &str) -> bool {
        self.score(a, b).is_some()
    }

    /// Similarity of `a` and `b` when it clears the threshold
    pub fn score(&self, a: &str, b: &str) -> Option<f64> {
        let ratio = similarity_ratio(a, b);
        (ratio > self.threshold).then_some(ratio)
    }
}

/// LCS length using two-row DP
fn lcs_length(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
