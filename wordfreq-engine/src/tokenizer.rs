//! Chunk tokenization and word normalization
//!
//! Splitting and case-folding happen here, once, so the aggregator and
//! sorter never reason about separators or case. Pure functions, no
//! failure modes: malformed input is treated as opaque characters.

/// Split one chunk of text into normalized words.
///
/// Any run of whitespace or ASCII punctuation is a single separator
/// boundary; zero-length tokens are dropped. Each surviving token is
/// normalized with [`normalize`].
pub fn tokenize(chunk: &str) -> Vec<String> {
    chunk
        .split(is_separator)
        .filter(|token| !token.is_empty())
        .map(normalize)
        .collect()
}

/// Separator class: whitespace and ASCII punctuation
fn is_separator(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_punctuation()
}

/// Canonical case form: first character uppercased, the rest lowercased.
///
/// ASCII-only folding, so the rule is idempotent; non-ASCII characters
/// pass through unchanged. "sir", "Sir" and "SIR" all collapse to "Sir".
pub fn normalize(token: &str) -> String {
    let mut normalized = String::with_capacity(token.len());
    let mut chars = token.chars();
    if let Some(first) = chars.next() {
        normalized.push(first.to_ascii_uppercase());
        for c in chars {
            normalized.push(c.to_ascii_lowercase());
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_whitespace_and_punctuation() {
        assert_eq!(
            tokenize("Do you quarrel, sir?"),
            vec!["Do", "You", "Quarrel", "Sir"]
        );
    }

    #[test]
    fn test_consecutive_separators_collapse() {
        assert_eq!(tokenize("Quarrel,  sir?!  No... sir."), vec![
            "Quarrel", "Sir", "No", "Sir"
        ]);
    }

    #[test]
    fn test_case_variants_collapse_to_one_form() {
        assert_eq!(tokenize("sir Sir SIR"), vec!["Sir", "Sir", "Sir"]);
    }

    #[test]
    fn test_empty_and_separator_only_chunks_produce_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ,;. \t ?!").is_empty());
    }

    #[test]
    fn test_apostrophes_split_words() {
        // Apostrophe is ASCII punctuation, same as the separator class
        assert_eq!(tokenize("don't"), vec!["Don", "T"]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for token in ["sir", "Sir", "SIR", "qUARREL", "naïve", "x"] {
            let once = normalize(token);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_non_ascii_is_opaque() {
        // Non-ASCII characters are carried through, never an error
        assert_eq!(tokenize("naïve café"), vec!["Naïve", "Café"]);
    }
}
