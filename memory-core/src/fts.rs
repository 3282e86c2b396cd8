//! Shared full-text-search query sanitization for L2 and L3's FTS5 shadow tables
//! (spec §4.3).

const FTS_OPERATOR_CHARS: &[char] = &['*', '"', '(', ')', ':', '^', '{', '}', '~', '<', '>'];
const BOOLEAN_KEYWORDS: &[&str] = &["and", "or", "not", "near"];

/// Turn arbitrary user text into a safe FTS5 `MATCH` argument: split into tokens,
/// strip FTS operator characters and boolean keywords, then wrap each remaining
/// token in double quotes so it is always treated as a literal term. Idempotent:
/// running it twice produces the same result as running it once.
#[must_use]
pub fn sanitize_bm25_query(raw: &str) -> String {
    raw.split_whitespace()
        .map(strip_operators)
        .filter(|token| !token.is_empty())
        .filter(|token| !BOOLEAN_KEYWORDS.contains(&token.to_ascii_lowercase().as_str()))
        .map(|token| format!("\"{token}\""))
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_operators(token: &str) -> String {
    token
        .chars()
        .filter(|c| !FTS_OPERATOR_CHARS.contains(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_operators_and_keywords() {
        let sanitized = sanitize_bm25_query("auth* AND \"token\" OR (refresh)");
        assert_eq!(sanitized, "\"auth\" \"token\" \"refresh\"");
    }

    #[test]
    fn empty_query_sanitizes_to_empty() {
        assert_eq!(sanitize_bm25_query("AND OR NOT"), "");
        assert_eq!(sanitize_bm25_query(""), "");
    }

    #[test]
    fn idempotent() {
        let once = sanitize_bm25_query("refresh token design");
        let twice = sanitize_bm25_query(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn case_insensitive_boolean_keywords() {
        assert_eq!(sanitize_bm25_query("near NEAR Near"), "");
    }
}
