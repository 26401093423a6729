// 🔎 Matcher - Resolve noisy user input to a catalog name
//
// Score = round(100 * 2 * LCS(a, b) / (len(a) + len(b))), on lower-cased
// strings, lengths in chars. That is the indel ratio: insertions and
// deletions cost 1, substitutions cost 2. Ties at .5 round to even.
// Best score wins, first candidate wins ties, and anything under the
// threshold (default 80) is a no-match.

use crate::error::MatcherError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum similarity score for a match to count (inclusive)
pub const DEFAULT_THRESHOLD: u8 = 80;

/// Highest possible score
pub const MAX_SCORE: u8 = 100;

// ============================================================================
// SIMILARITY
// ============================================================================

/// Indel similarity in [0, 100], case-insensitive, rounded to an integer.
///
/// Two empty strings score 100.
pub fn similarity(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return MAX_SCORE;
    }

    let matched = 2 * lcs_length(&a, &b);
    round_half_even(100 * matched, total) as u8
}

/// Length of the longest common subsequence.
///
/// Equivalent to `(len(a) + len(b) - indel_distance) / 2`.
fn lcs_length(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Single rolling row over b
    let mut row = vec![0usize; b.len() + 1];

    for &ca in a {
        let mut diagonal = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }

    row[b.len()]
}

/// `numerator / denominator` rounded to the nearest integer, .5 to even.
fn round_half_even(numerator: usize, denominator: usize) -> usize {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;

    match (2 * remainder).cmp(&denominator) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => quotient + (quotient % 2),
    }
}

// ============================================================================
// MATCH RESULT
// ============================================================================

/// Best candidate and its score, whether or not it cleared the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: String,
    pub score: u8,
}

// ============================================================================
// MATCHER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matcher {
    /// Minimum score (0-100) for `find` to return a candidate
    threshold: u8,
}

impl Matcher {
    pub fn new() -> Self {
        Matcher {
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Matcher with a custom threshold. Fails when `threshold` is above 100.
    pub fn with_threshold(threshold: u8) -> Result<Self, MatcherError> {
        if threshold > MAX_SCORE {
            return Err(MatcherError::InvalidThreshold(threshold));
        }

        Ok(Matcher { threshold })
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Highest-scoring candidate regardless of threshold.
    ///
    /// Candidates are scanned in the order given; a later candidate only
    /// replaces the current best when it scores strictly higher. Returns
    /// `None` for an empty query or an empty candidate list.
    pub fn best<'a, S: AsRef<str>>(&self, query: &str, candidates: &'a [S]) -> Option<(&'a str, u8)> {
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(&'a str, u8)> = None;

        for candidate in candidates {
            let candidate = candidate.as_ref();
            let score = similarity(query, candidate);

            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((candidate, score)),
            }
        }

        best
    }

    /// Resolve `query` to the closest candidate scoring at least `threshold`.
    pub fn find<'a, S: AsRef<str>>(&self, query: &str, candidates: &'a [S]) -> Option<&'a str> {
        let (candidate, score) = self.best(query, candidates)?;

        debug!(query, candidate, score, threshold = self.threshold, "best fuzzy candidate");

        if score >= self.threshold {
            Some(candidate)
        } else {
            None
        }
    }

    /// Like [`Matcher::best`] but owned, for reporting.
    pub fn score_best<S: AsRef<str>>(&self, query: &str, candidates: &[S]) -> Option<ScoredCandidate> {
        self.best(query, candidates).map(|(candidate, score)| ScoredCandidate {
            candidate: candidate.to_string(),
            score,
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve `query` against `candidates` with the default threshold of 80.
pub fn fuzzy_match<S: AsRef<str>>(query: &str, candidates: &[S]) -> Option<String> {
    Matcher::new().find(query, candidates).map(str::to_string)
}

// ============================================================================
// TESTS
// ============================================================================
