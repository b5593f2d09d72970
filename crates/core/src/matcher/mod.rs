//! Fuzzy name matcher.
//!
//! Picks the candidate name closest to a spoken query and reports a
//! confidence in `[0, 1]`. No cutoff is applied here; callers gate on their
//! own thresholds.
//!
//! Both names are normalized (lowercase, punctuation folded to spaces) and
//! scored with the Indel ratio, `2 * LCS / (len_a + len_b)` over characters.
//! A name that merely contains the query is not favored over an exact one.

use rapidfuzz::fuzz;
use serde::Serialize;
use tracing::debug;

/// Best candidate for a query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuzzyMatch<'a> {
    pub candidate: &'a str,
    pub confidence: f64,
}

/// Return the best-scoring candidate, or `None` when there are no candidates.
///
/// Ties keep the earliest candidate, so iteration order decides between
/// equally good names.
pub fn best_match<'a, I>(query: &str, candidates: I) -> Option<FuzzyMatch<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let processed_query = process(&query.to_lowercase());
    let mut best: Option<FuzzyMatch<'a>> = None;

    for candidate in candidates {
        let confidence = score_processed(&processed_query, &process(candidate));
        if best.is_none_or(|b| confidence > b.confidence) {
            best = Some(FuzzyMatch {
                candidate,
                confidence,
            });
        }
    }

    if let Some(found) = &best {
        debug!(
            "best_match: query='{}', chose='{}', confidence={:.3}",
            query, found.candidate, found.confidence
        );
    }
    best
}

/// Similarity between two names in `[0, 1]`.
pub fn similarity(query: &str, candidate: &str) -> f64 {
    score_processed(&process(query), &process(candidate))
}

/// Lowercase, turn anything that is not a letter or digit into a space and
/// collapse runs of whitespace.
fn process(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn score_processed(query: &str, candidate: &str) -> f64 {
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    fuzz::ratio(query.chars(), candidate.chars()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_normalizes_punctuation_and_case() {
        assert_eq!(process("  Help!  (Remastered) "), "help remastered");
        assert_eq!(process("AC/DC"), "ac dc");
        assert_eq!(process("!!!"), "");
    }

    #[test]
    fn test_exact_match_ignores_case() {
        let candidates = ["The Beatles", "The Rolling Stones"];
        let found = best_match("the beatles", candidates.iter().copied()).unwrap();
        assert_eq!(found.candidate, "The Beatles");
        assert_eq!(found.confidence, 1.0);
    }

    #[test]
    fn test_empty_candidates_yield_none() {
        let candidates: Vec<&str> = Vec::new();
        assert!(best_match("anything", candidates).is_none());
    }

    #[test]
    fn test_empty_query_scores_zero() {
        assert_eq!(similarity("", "Abbey Road"), 0.0);
        assert_eq!(similarity("?!", "Abbey Road"), 0.0);
    }

    #[test]
    fn test_word_order_counts() {
        let swapped = similarity("road abbey", "Abbey Road");
        assert!(swapped < 1.0, "score was {}", swapped);
        assert_eq!(similarity("abbey road", "Abbey Road"), 1.0);
    }

    #[test]
    fn test_partial_name_scores_by_shared_characters() {
        // 2 * 7 / (7 + 15)
        let score = similarity("kitchen", "Kitchen Speaker");
        assert!((score - 14.0 / 22.0).abs() < 1e-9, "score was {}", score);
        assert!(score > 0.5);
        assert!(score <= 0.7);
    }

    #[test]
    fn test_longer_name_containing_query_loses_to_exact_name() {
        let candidates = ["The Beatles Collection", "The Beatles"];
        let found = best_match("the beatles", candidates.iter().copied()).unwrap();
        assert_eq!(found.candidate, "The Beatles");

        let contained = similarity("the beatles", "The Beatles Collection");
        assert!((contained - 22.0 / 33.0).abs() < 1e-9, "score was {}", contained);
        assert!(contained <= 0.7);
    }

    #[test]
    fn test_unrelated_name_scores_low() {
        let candidates = ["Kitchen Speaker", "Living Room"];
        let found = best_match("xyz123", candidates.iter().copied()).unwrap();
        assert!(found.confidence <= 0.5, "confidence was {}", found.confidence);
    }

    #[test]
    fn test_ties_keep_first_candidate() {
        let candidates = ["Yesterday", "yesterday"];
        let found = best_match("yesterday", candidates.iter().copied()).unwrap();
        assert_eq!(found.candidate, "Yesterday");
    }

    #[test]
    fn test_misspelling_still_matches() {
        let candidates = ["Rachmaninov", "Radiohead", "Rammstein"];
        let found = best_match("rahmaninov", candidates.iter().copied()).unwrap();
        assert_eq!(found.candidate, "Rachmaninov");
        assert!(found.confidence > 0.9);
    }

    #[test]
    fn test_confidence_is_bounded() {
        for (q, c) in [("a", "a a a"), ("b b b", "b"), ("abc", "xyz"), ("x", "x")] {
            let score = similarity(q, c);
            assert!((0.0..=1.0).contains(&score), "{} vs {} = {}", q, c, score);
        }
    }
}
