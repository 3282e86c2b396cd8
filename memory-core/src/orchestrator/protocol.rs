//! Typed request/result records for every named operation the engine exposes
//! (spec §6). These are the shapes a protocol adapter (CLI, RPC server, …)
//! serializes at the edge; the engine itself only ever deals in these types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{Memory, MemoryType, Tier};

/// Options accepted by `store`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreOptions {
    pub forced_tier: Option<Tier>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub ttl: Option<u64>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub metadata: crate::types::Metadata,
    /// Set when the caller has live session context, feeding the router's
    /// generic-`code` heuristic (spec §4.5 rule 7).
    #[serde(default)]
    pub session_hint: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreResult {
    pub id: String,
    pub tier: Tier,
    pub reason: String,
    pub confidence: f32,
}

/// Filter portion of a `recall` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecallFilter {
    #[serde(default)]
    pub types: Vec<MemoryType>,
    #[serde(default)]
    pub layers: Vec<Tier>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallOptions {
    pub limit: usize,
    pub threshold: f32,
    #[serde(default)]
    pub filter: RecallFilter,
}

impl Default for RecallOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            threshold: 0.0,
            filter: RecallFilter::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallItem {
    pub memory: Memory,
    pub similarity: f32,
    pub tier: Tier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResult {
    pub memory: Memory,
    pub tier: Tier,
}

/// Patch fields accepted by `update`; `target_layer` triggers a promote instead
/// of an in-place update when it outranks the memory's current tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOptions {
    pub content: Option<String>,
    pub tags: Option<BTreeSet<String>>,
    pub metadata: Option<crate::types::Metadata>,
    pub pinned: Option<bool>,
    pub weight: Option<u8>,
    pub target_layer: Option<Tier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpdateResult {
    Updated(Memory),
    Promoted { memory: Memory, from: Tier, to: Tier },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResult {
    pub deleted_from: Tier,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListOptions {
    pub tier: Option<Tier>,
    pub memory_type: Option<MemoryType>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResult {
    pub items: Vec<Memory>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeResult {
    pub summary_id: String,
    pub count: usize,
    pub content: String,
}

/// Event payload for `report_event`, the free-form telemetry ingestion point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub payload: serde_json::Value,
    pub timestamp: i64,
    pub session_id: String,
    pub cli_type: Option<String>,
    pub project_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEventResult {
    pub processed: bool,
    pub memory_id: Option<String>,
    pub triggered_actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Text,
    Symbol,
    Semantic,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCodeOptions {
    pub query: String,
    pub mode: Option<SearchMode>,
    pub language: Option<String>,
    pub file_pattern: Option<String>,
    pub symbol_kind: Option<crate::types::SymbolKind>,
    pub limit: Option<usize>,
    pub threshold: Option<f32>,
    pub include_content: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCodeResult {
    pub results: Vec<CodeSearchHit>,
    pub index_status: crate::code_index::IndexStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSearchHit {
    pub file_path: String,
    pub line_start: u32,
    pub line_end: u32,
    pub similarity: Option<f32>,
    pub symbol: Option<crate::types::Symbol>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrientOptions {
    pub project_path: String,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrientResult {
    pub summary: String,
    pub time_anchor: i64,
    pub offline_gap_ms: Option<i64>,
    pub recent_memories_since_last_seen: Vec<Memory>,
}

/// `get_current`'s result: a context window assembled from working memory plus
/// the project's most relevant durable/semantic memories. The wire shape for
/// this operation is the least constrained part of the protocol; this is the
/// engine's chosen rendering of "context window" referenced by §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCurrentOptions {
    pub session_id: String,
    pub current_file: Option<String>,
    pub project_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextWindow {
    pub working_memories: Vec<Memory>,
    pub relevant_memories: Vec<RecallItem>,
    pub patterns: Vec<Memory>,
}
