//! Text similarity for consensus and stalemate checks.
//!
//! The default [`LexicalSimilarity`] takes the larger of two scores over
//! normalised text (lowercased, punctuation stripped):
//!
//! - word-set Jaccard, which catches reordered phrasing
//! - character-bigram Dice, which tolerates inflection and small edits
//!
//! Other measures (embedding-based, agent-judged) plug in through
//! [`SimilarityMeasure`].

use std::collections::HashSet;

/// Similarity of two texts in `[0, 1]`
pub trait SimilarityMeasure: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Lexical similarity over normalised text
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalSimilarity;

impl SimilarityMeasure for LexicalSimilarity {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let a = normalize(a);
        let b = normalize(b);

        if a.is_empty() && b.is_empty() {
            return 1.0;
        }
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b {
            return 1.0;
        }

        word_jaccard(&a, &b).max(bigram_dice(&a, &b))
    }
}

/// Lowercase, replace non-alphanumerics with spaces, collapse whitespace
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn word_jaccard(a: &str, b: &str) -> f64 {
    let words_a: HashSet<&str> = a.split(' ').collect();
    let words_b: HashSet<&str> = b.split(' ').collect();
    jaccard(&words_a, &words_b)
}

fn bigram_dice(a: &str, b: &str) -> f64 {
    let bigrams_a = bigrams(a);
    let bigrams_b = bigrams(b);
    if bigrams_a.is_empty() || bigrams_b.is_empty() {
        return 0.0;
    }

    // Multiset intersection
    let mut remaining = bigrams_b.clone();
    let mut shared = 0usize;
    for bigram in &bigrams_a {
        if let Some(pos) = remaining.iter().position(|other| other == bigram) {
            remaining.swap_remove(pos);
            shared += 1;
        }
    }

    (2 * shared) as f64 / (bigrams_a.len() + bigrams_b.len()) as f64
}

fn bigrams(text: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = text.chars().filter(|c| *c != ' ').collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

fn jaccard<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Overlap between two evidence lists: Jaccard over normalised items.
///
/// Two empty lists overlap `0.0`; agreement on nothing is not agreement.
pub fn evidence_overlap(a: &[String], b: &[String]) -> f64 {
    let items_a: HashSet<String> = a
        .iter()
        .map(|e| normalize(e))
        .filter(|e| !e.is_empty())
        .collect();
    let items_b: HashSet<String> = b
        .iter()
        .map(|e| normalize(e))
        .filter(|e| !e.is_empty())
        .collect();
    jaccard(&items_a, &items_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim(a: &str, b: &str) -> f64 {
        LexicalSimilarity.similarity(a, b)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Use   a B-Tree!  "), "use a b tree");
        assert_eq!(normalize("..."), "");
    }

    #[test]
    fn test_identical_after_normalisation() {
        assert_eq!(sim("Use a B-tree index.", "use a b tree index"), 1.0);
        assert_eq!(sim("", "  "), 1.0);
        assert_eq!(sim("something", ""), 0.0);
    }

    #[test]
    fn test_reordered_words_score_high() {
        assert_eq!(sim("cache the results", "results the cache"), 1.0);
    }

    #[test]
    fn test_unrelated_claims_score_low() {
        assert!(sim("use postgres for storage", "rewrite the frontend in elm") < 0.4);
    }

    #[test]
    fn test_small_edit_scores_high() {
        assert!(sim("retry the request once", "retry the requests once") > 0.85);
    }

    #[test]
    fn test_evidence_overlap() {
        let a = vec!["Benchmarks show 2x".to_string(), "fewer allocations".to_string()];
        let b = vec!["benchmarks show 2x".to_string(), "simpler code".to_string()];
        // 1 shared of 3 distinct
        assert!((evidence_overlap(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(evidence_overlap(&a, &a), 1.0);
        assert_eq!(evidence_overlap(&[], &[]), 0.0);
    }
}
