//! Text analysis: blob -> tokens -> positional front n-grams.
//!
//! Both operations are pure functions of their input, mirroring the
//! `original_source` `EnglishTokenizer`/`EdgeNgramGenerator` pair this
//! analyzer is ported from.

use std::collections::HashMap;

/// Shortest term emitted for a token.
pub const MIN_GRAM: usize = 3;
/// Longest term emitted for a token.
pub const MAX_GRAM: usize = 6;

const PUNCTUATION: &[char] = &[
    '~', '`', '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '+', '=', '{', '[', '}', ']', '|',
    '\\', ':', ';', '"', '\'', ',', '<', '.', '>', '/', '?',
];

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "s", "such", "t", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Splits `blob` into lowercase, stopword-filtered tokens, preserving order.
///
/// # Arguments
/// * `blob` - The raw text to tokenize.
///
/// # Returns
/// The surviving tokens in their original order: lowercase, punctuation-free,
/// nonempty, and not present in the stopword set.
pub fn tokenize(blob: &str) -> Vec<String> {
    let mut scrubbed = String::with_capacity(blob.len());
    for ch in blob.chars() {
        if PUNCTUATION.contains(&ch) {
            scrubbed.push(' ');
        } else {
            scrubbed.push(ch);
        }
    }

    scrubbed
        .split_whitespace()
        .map(|piece| piece.trim().to_lowercase())
        .filter(|piece| !piece.is_empty() && !is_stopword(piece))
        .collect()
}

/// Emits every front n-gram (length `MIN_GRAM..=MAX_GRAM`, capped at the
/// token's own length) for each token, mapped to the ordered, deduplicated
/// list of positions at which it occurs.
///
/// Tokens shorter than `MIN_GRAM` emit no terms at all.
///
/// # Arguments
/// * `tokens` - A token sequence, in the order `tokenize` produced it;
///   positions are this slice's indices.
///
/// # Returns
/// A mapping from each emitted term to the ordered, deduplicated list of
/// token positions it occurs at.
pub fn ngramize(tokens: &[String]) -> HashMap<String, Vec<u64>> {
    let mut terms: HashMap<String, Vec<u64>> = HashMap::new();

    for (position, token) in tokens.iter().enumerate() {
        let position = position as u64;
        let max_len = MAX_GRAM.min(token.chars().count());

        for len in MIN_GRAM..=max_len {
            let gram: String = token.chars().take(len).collect();
            let positions = terms.entry(gram).or_default();
            if !positions.contains(&position) {
                positions.push(position);
            }
        }
    }

    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_simple() {
        assert_eq!(tokenize("Hello world"), vec!["hello", "world"]);
    }

    #[test]
    fn tokenize_strips_punctuation_and_stopwords() {
        let blob = "This is a truly splendid example of some tokens. Top notch, really.";
        assert_eq!(
            tokenize(blob),
            vec![
                "truly", "splendid", "example", "some", "tokens", "top", "notch", "really"
            ]
        );
    }

    #[test]
    fn tokenize_drops_empty_pieces() {
        assert_eq!(tokenize("  a   the   "), Vec::<String>::new());
    }

    #[test]
    fn tokenize_output_is_lowercase_and_punctuation_free() {
        let tokens = tokenize("Hello, WORLD! What's up?");
        for token in &tokens {
            assert_eq!(token, &token.to_lowercase());
            assert!(!token.is_empty());
            assert!(token.chars().all(|c| !PUNCTUATION.contains(&c)));
        }
    }

    #[test]
    fn ngramize_hello_world() {
        let tokens = tokenize("Hello world");
        let grams = ngramize(&tokens);

        assert_eq!(grams.get("hel"), Some(&vec![0]));
        assert_eq!(grams.get("hell"), Some(&vec![0]));
        assert_eq!(grams.get("hello"), Some(&vec![0]));
        assert_eq!(grams.get("wor"), Some(&vec![1]));
        assert_eq!(grams.get("worl"), Some(&vec![1]));
        assert_eq!(grams.get("world"), Some(&vec![1]));
        assert_eq!(grams.len(), 6);
    }

    #[test]
    fn ngramize_only_emits_prefixes_in_range() {
        let tokens = vec!["splendiferous".to_string()];
        let grams = ngramize(&tokens);
        for term in grams.keys() {
            assert!(term.len() >= MIN_GRAM && term.len() <= MAX_GRAM);
            assert!("splendiferous".starts_with(term.as_str()));
        }
    }

    #[test]
    fn ngramize_drops_short_tokens() {
        let tokens = vec!["ok".to_string(), "hi".to_string()];
        let grams = ngramize(&tokens);
        assert!(grams.is_empty());
    }

    #[test]
    fn ngramize_is_a_set_of_positions() {
        // "to" is a stopword and dropped before ngramize ever sees it, but a
        // token recurring at two positions should record both, once each.
        let tokens = vec!["cat".to_string(), "dog".to_string(), "cat".to_string()];
        let grams = ngramize(&tokens);
        assert_eq!(grams.get("cat"), Some(&vec![0, 2]));
    }
}
