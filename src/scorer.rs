//! BM25-style relevance scoring over already-collected postings.
//!
//! Grounded on the teacher's `models::Model::update_idf`/`search_terms`
//! (per-term idf weighting summed across matched terms), replaced with the
//! exact formula spec §4.6 pins down and verified against
//! `original_source/tests.py`'s `test_bm25_relevance` fixtures.

use std::collections::HashMap;

// `b`, BM25's usual length-normalization factor, is nominally part of this
// scorer but wired as an inert constant (0) rather than applied anywhere in
// the formula below. Preserved as a documented no-op rather than silently
// dropped (spec open question).
const K: f64 = 1.2;

/// Scores one document against a set of query terms, BM25-style.
///
/// # Arguments
/// * `terms` - The query's term set; `|terms|` is used as-is in the
///   normalization denominator, including terms with zero document
///   frequency.
/// * `df` - Document frequency per term, across the whole visible index.
/// * `tf` - This document's term frequency per term; a missing entry is
///   treated as 0.
/// * `n` - The total number of documents currently indexed.
///
/// # Returns
/// A relevance score, nominally in roughly `[0.4, 1.0]`; not comparable
/// across corpora (spec §4.6).
pub fn score(terms: &[String], df: &HashMap<String, u64>, tf: &HashMap<String, u64>, n: u64) -> f64 {
    if terms.is_empty() {
        return 0.5;
    }

    let n = n as f64;
    let mut contributions = 0.0;

    for term in terms {
        let doc_freq = *df.get(term).unwrap_or(&0) as f64;
        if doc_freq == 0.0 {
            continue;
        }

        let term_freq = *tf.get(term).unwrap_or(&0) as f64;
        let idf = ((n - doc_freq + 1.0) / doc_freq).ln() / (1.0 + n).ln();
        contributions += term_freq * idf / (term_freq + K);
    }

    0.5 + contributions / (2.0 * terms.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn counts(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn single_term_low_df() {
        let t = terms(&["hello"]);
        let df = counts(&[("hello", 7)]);
        let tf = counts(&[("hello", 3)]);
        let s = score(&t, &df, &tf, 17);
        assert_eq!(format!("{s:.2}"), "0.56");
    }

    #[test]
    fn single_term_higher_df() {
        let t = terms(&["hello"]);
        let df = counts(&[("hello", 25)]);
        let tf = counts(&[("hello", 5)]);
        let s = score(&t, &df, &tf, 175);
        assert_eq!(format!("{s:.2}"), "0.64");
    }

    #[test]
    fn two_terms() {
        let t = terms(&["hello", "world"]);
        let df = counts(&[("hello", 25), ("world", 7)]);
        let tf = counts(&[("hello", 5), ("world", 3)]);
        let s = score(&t, &df, &tf, 175);
        assert_eq!(format!("{s:.2}"), "0.68");
    }

    #[test]
    fn missing_tf_counts_as_zero_and_df_guarded() {
        let t = terms(&["ghost"]);
        let df = counts(&[]);
        let tf = counts(&[]);
        // df = 0 for every queried term: no contribution, no division by
        // zero, score collapses to the baseline 0.5.
        let s = score(&t, &df, &tf, 10);
        assert_eq!(s, 0.5);
    }
}
