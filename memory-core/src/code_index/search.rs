//! The three search modes over indexed chunks and symbols (spec §4.6).

use crate::code_index::glob::glob_matches;
use crate::embeddings::cosine_similarity;
use crate::types::{Chunk, Symbol, SymbolKind};

#[derive(Debug, Clone, Default)]
pub struct SearchFilters<'a> {
    pub language: Option<&'a str>,
    pub file_pattern: Option<&'a str>,
    pub symbol_kind: Option<SymbolKind>,
}

#[derive(Debug, Clone)]
pub struct TextMatch {
    pub chunk: Chunk,
}

#[derive(Debug, Clone)]
pub struct SemanticMatch {
    pub chunk: Chunk,
    pub similarity: f32,
}

fn passes_filters(file_path: &str, language: Option<&str>, filters: &SearchFilters<'_>) -> bool {
    if let Some(pattern) = filters.file_pattern {
        if !glob_matches(pattern, file_path) {
            return false;
        }
    }
    if let (Some(wanted), Some(actual)) = (filters.language, language) {
        if !wanted.eq_ignore_ascii_case(actual) {
            return false;
        }
    }
    true
}

/// Case-insensitive substring search across stored chunk content.
#[must_use]
pub fn search_text<'a>(
    chunks: impl IntoIterator<Item = (&'a Chunk, &'a str)>,
    query: &str,
    filters: &SearchFilters<'_>,
) -> Vec<TextMatch> {
    let needle = query.to_lowercase();
    chunks
        .into_iter()
        .filter(|(chunk, language)| passes_filters(&chunk.file_path, Some(language), filters))
        .filter(|(chunk, _)| chunk.content.to_lowercase().contains(&needle))
        .map(|(chunk, _)| TextMatch { chunk: chunk.clone() })
        .collect()
}

/// `name LIKE %q%`, optionally filtered by kind, returned in the order provided
/// (matching the store's insertion order, spec §4.6).
#[must_use]
pub fn search_symbol<'a>(
    symbols: impl IntoIterator<Item = &'a Symbol>,
    query: &str,
    filters: &SearchFilters<'_>,
) -> Vec<Symbol> {
    let needle = query.to_lowercase();
    symbols
        .into_iter()
        .filter(|s| query.is_empty() || s.name.to_lowercase().contains(&needle))
        .filter(|s| filters.symbol_kind.map_or(true, |k| k == s.kind))
        .filter(|s| passes_filters(&s.file_path, None, filters))
        .cloned()
        .collect()
}

/// Embed the query, cosine-compare against every chunk's stored vector, keep
/// those at or above `threshold`, sort descending (spec §4.6).
#[must_use]
pub fn search_semantic<'a>(
    chunks: impl IntoIterator<Item = (&'a Chunk, &'a str)>,
    query_vector: &[f32],
    threshold: f32,
    filters: &SearchFilters<'_>,
) -> Vec<SemanticMatch> {
    let mut matches: Vec<SemanticMatch> = chunks
        .into_iter()
        .filter(|(chunk, language)| passes_filters(&chunk.file_path, Some(language), filters))
        .filter_map(|(chunk, _)| {
            let embedding = chunk.embedding.as_ref()?;
            let similarity = cosine_similarity(query_vector, embedding);
            (similarity >= threshold).then(|| SemanticMatch { chunk: chunk.clone(), similarity })
        })
        .collect();
    matches.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(path: &str, content: &str, embedding: Option<Vec<f32>>) -> Chunk {
        Chunk {
            file_path: path.to_string(),
            chunk_index: 0,
            line_start: 1,
            line_end: 10,
            content: content.to_string(),
            embedding,
        }
    }

    #[test]
    fn text_search_is_case_insensitive() {
        let c = chunk("a.rs", "fn RouteDecision() {}", None);
        let results = search_text([(&c, "rust")], "routedecision", &SearchFilters::default());
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn file_pattern_filters_out_non_matching_paths() {
        let c = chunk("src/a.rs", "fn x() {}", None);
        let filters = SearchFilters { file_pattern: Some("tests/**"), ..Default::default() };
        let results = search_text([(&c, "rust")], "fn", &filters);
        assert!(results.is_empty());
    }

    #[test]
    fn semantic_search_respects_threshold() {
        let matching = chunk("a.rs", "x", Some(vec![1.0, 0.0]));
        let distant = chunk("b.rs", "y", Some(vec![0.0, 1.0]));
        let results = search_semantic([(&matching, "rust"), (&distant, "rust")], &[1.0, 0.0], 0.5, &SearchFilters::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.file_path, "a.rs");
    }

    #[test]
    fn symbol_search_filters_by_kind() {
        let symbols = vec![
            Symbol { file_path: "a.rs".into(), name: "Foo".into(), kind: SymbolKind::Class, line_start: 1, line_end: None, signature: None, doc_comment: None },
            Symbol { file_path: "a.rs".into(), name: "foo_fn".into(), kind: SymbolKind::Function, line_start: 2, line_end: None, signature: None, doc_comment: None },
        ];
        let filters = SearchFilters { symbol_kind: Some(SymbolKind::Function), ..Default::default() };
        let results = search_symbol(&symbols, "foo", &filters);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "foo_fn");
    }
}
