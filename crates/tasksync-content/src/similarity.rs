//! Text similarity for fuzzy identity matching

use similar::TextDiff;

/// Similarity ratio in `[0, 1]` between two strings.
///
/// Character-level diff ratio (`2 * matched / total`) from the `similar`
/// crate; identical strings are 1.0 and a comparison with an empty string
/// is 0.0.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    TextDiff::from_chars(a, b).ratio() as f64
}

/// Cheap pre-filter: is `candidate` within `tolerance` (a fraction of the
/// query length) of the query's length?
pub fn within_length_tolerance(query: &str, candidate: &str, tolerance: f64) -> bool {
    let query_len = query.chars().count() as f64;
    let candidate_len = candidate.chars().count() as f64;

    if query_len == 0.0 {
        return candidate_len == 0.0;
    }

    (query_len - candidate_len).abs() <= query_len * tolerance
}
