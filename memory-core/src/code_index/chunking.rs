//! Split file content into overlapping, symbol-aligned windows for embedding
//! (spec §4.6).

use crate::types::{Chunk, Symbol};

/// Split `content` into chunks of `chunk_lines` with `overlap` lines shared
/// between consecutive chunks. When a symbol boundary exists within ±20 lines
/// of a chunk's target end (bounded by `chunk_lines + 50`), the split shifts to
/// land on it instead of cutting a symbol in half.
#[must_use]
pub fn chunk_file(file_path: &str, content: &str, chunk_lines: u32, overlap: u32, symbols: &[Symbol]) -> Vec<Chunk> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }
    let chunk_lines = chunk_lines.max(1);
    let overlap = overlap.min(chunk_lines.saturating_sub(1));
    let max_span = chunk_lines + 50;

    let mut boundaries: Vec<u32> = symbols.iter().filter_map(|s| s.line_end).collect();
    boundaries.sort_unstable();

    let mut chunks = Vec::new();
    let mut start: u32 = 1;
    let total_lines = lines.len() as u32;
    let mut chunk_index = 0;

    while start <= total_lines {
        let target_end = (start + chunk_lines - 1).min(total_lines);
        let end = snap_to_boundary(target_end, start, max_span, total_lines, &boundaries);

        let header = format!("File: {file_path} (lines {start}-{end})");
        let body = lines[(start as usize - 1)..(end as usize)].join("\n");
        chunks.push(Chunk {
            file_path: file_path.to_string(),
            chunk_index,
            line_start: start,
            line_end: end,
            content: format!("{header}\n{body}"),
            embedding: None,
        });
        chunk_index += 1;

        if end >= total_lines {
            break;
        }
        let next_start = end.saturating_sub(overlap) + 1;
        start = next_start.max(start + 1);
    }
    chunks
}

fn snap_to_boundary(target_end: u32, start: u32, max_span: u32, total_lines: u32, boundaries: &[u32]) -> u32 {
    if target_end >= total_lines {
        return total_lines;
    }
    let window_lo = target_end.saturating_sub(20);
    let window_hi = (target_end + 20).min(start + max_span).min(total_lines);
    boundaries
        .iter()
        .copied()
        .filter(|&b| b >= window_lo && b <= window_hi && b >= start)
        .min_by_key(|&b| (b as i64 - target_end as i64).abs())
        .unwrap_or(target_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn header_is_prepended_and_excluded_from_stored_range() {
        let content = lines(10);
        let chunks = chunk_file("a.rs", &content, 5, 1, &[]);
        assert!(chunks[0].content.starts_with("File: a.rs (lines 1-5)"));
        assert_eq!(chunks[0].line_start, 1);
        assert_eq!(chunks[0].line_end, 5);
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let content = lines(20);
        let chunks = chunk_file("a.rs", &content, 10, 3, &[]);
        assert!(chunks.len() >= 2);
        assert!(chunks[1].line_start <= chunks[0].line_end);
    }

    #[test]
    fn last_chunk_reaches_end_of_file() {
        let content = lines(23);
        let chunks = chunk_file("a.rs", &content, 10, 2, &[]);
        assert_eq!(chunks.last().unwrap().line_end, 23);
    }

    #[test]
    fn empty_file_yields_no_chunks() {
        assert!(chunk_file("empty.rs", "", 150, 10, &[]).is_empty());
    }

    #[test]
    fn snaps_to_nearby_symbol_boundary() {
        let content = lines(30);
        let symbols = vec![Symbol {
            file_path: "a.rs".to_string(),
            name: "f".to_string(),
            kind: crate::types::SymbolKind::Function,
            line_start: 1,
            line_end: Some(12),
            signature: None,
            doc_comment: None,
        }];
        let chunks = chunk_file("a.rs", &content, 10, 2, &symbols);
        assert_eq!(chunks[0].line_end, 12);
    }
}
