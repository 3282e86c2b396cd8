//! Code index record types (spec §3, §4.6).

use serde::{Deserialize, Serialize};

/// A file the code index has catalogued for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedFile {
    pub path: String,
    pub mtime_ms: i64,
    pub size_bytes: u64,
    pub language: String,
    pub content_hash: String,
    pub indexed_at: i64,
    pub chunk_count: u32,
}

/// Kind of a symbol extracted by a language-family extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Interface,
    Type,
    Enum,
    Const,
    Export,
}

impl SymbolKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Type => "type",
            SymbolKind::Enum => "enum",
            SymbolKind::Const => "const",
            SymbolKind::Export => "export",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SymbolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "function" => Ok(SymbolKind::Function),
            "method" => Ok(SymbolKind::Method),
            "class" => Ok(SymbolKind::Class),
            "interface" => Ok(SymbolKind::Interface),
            "type" => Ok(SymbolKind::Type),
            "enum" => Ok(SymbolKind::Enum),
            "const" => Ok(SymbolKind::Const),
            "export" => Ok(SymbolKind::Export),
            other => Err(format!("unknown symbol kind: {other}")),
        }
    }
}

/// A named, located symbol extracted from a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub file_path: String,
    pub name: String,
    pub kind: SymbolKind,
    pub line_start: u32,
    pub line_end: Option<u32>,
    pub signature: Option<String>,
    pub doc_comment: Option<String>,
}

/// A contiguous, overlapping window of a file's content, embedded for semantic search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub file_path: String,
    pub chunk_index: u32,
    pub line_start: u32,
    pub line_end: u32,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}
