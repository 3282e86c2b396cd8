//! The universal `Memory` record and its tier/type/metadata vocabulary (spec §3).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One of the three storage tiers a memory can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// In-process, ephemeral, TTL+LRU evicted.
    L1,
    /// Per-project, durable, SQL-backed.
    L2,
    /// Cross-project, semantic, vector-backed.
    L3,
}

impl Tier {
    /// The tier directly above this one, or `None` for `L3` (promotion past L3 fails).
    #[must_use]
    pub fn next(self) -> Option<Tier> {
        match self {
            Tier::L1 => Some(Tier::L2),
            Tier::L2 => Some(Tier::L3),
            Tier::L3 => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::L1 => "L1",
            Tier::L2 => "L2",
            Tier::L3 => "L3",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "L1" => Ok(Tier::L1),
            "L2" => Ok(Tier::L2),
            "L3" => Ok(Tier::L3),
            other => Err(format!("unknown tier: {other}")),
        }
    }
}

/// The recognized memory content categories (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    Scratchpad,
    CodePattern,
    BugFix,
    Decision,
    Convention,
    Relationship,
    Summary,
    Documentation,
    Error,
    Code,
    Message,
    Thought,
    Observation,
}

impl MemoryType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MemoryType::Scratchpad => "scratchpad",
            MemoryType::CodePattern => "code_pattern",
            MemoryType::BugFix => "bug_fix",
            MemoryType::Decision => "decision",
            MemoryType::Convention => "convention",
            MemoryType::Relationship => "relationship",
            MemoryType::Summary => "summary",
            MemoryType::Documentation => "documentation",
            MemoryType::Error => "error",
            MemoryType::Code => "code",
            MemoryType::Message => "message",
            MemoryType::Thought => "thought",
            MemoryType::Observation => "observation",
        }
    }
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MemoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scratchpad" => Ok(MemoryType::Scratchpad),
            "code_pattern" => Ok(MemoryType::CodePattern),
            "bug_fix" => Ok(MemoryType::BugFix),
            "decision" => Ok(MemoryType::Decision),
            "convention" => Ok(MemoryType::Convention),
            "relationship" => Ok(MemoryType::Relationship),
            "summary" => Ok(MemoryType::Summary),
            "documentation" => Ok(MemoryType::Documentation),
            "error" => Ok(MemoryType::Error),
            "code" => Ok(MemoryType::Code),
            "message" => Ok(MemoryType::Message),
            "thought" => Ok(MemoryType::Thought),
            "observation" => Ok(MemoryType::Observation),
            other => Err(format!("unknown memory type: {other}")),
        }
    }
}

/// Provenance of a memory's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemorySource {
    UserExplicit,
    AiInferred,
    SystemAuto,
}

/// A span of source lines a memory was extracted from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileContext {
    pub path: String,
    pub line_start: u32,
    pub line_end: u32,
    pub language: Option<String>,
}

/// An inline code excerpt attached to a memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub code: String,
    pub language: Option<String>,
    pub file_path: Option<String>,
}

/// Open mapping of metadata, with the recognized keys (spec §3) promoted to typed
/// fields so they never need re-parsing the extension blob, and everything else
/// preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// 1-5, default 3.
    #[serde(default = "default_weight")]
    pub weight: u8,
    pub confidence: Option<f32>,
    pub source: Option<MemorySource>,
    #[serde(rename = "cliType")]
    pub cli_type: Option<String>,
    #[serde(rename = "projectPath")]
    pub project_path: Option<String>,
    #[serde(rename = "fileContext")]
    pub file_context: Option<FileContext>,
    #[serde(rename = "codeBlock")]
    pub code_block: Option<CodeBlock>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
    /// Everything not covered by the known fields above.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_weight() -> u8 {
    3
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            weight: default_weight(),
            confidence: None,
            source: None,
            cli_type: None,
            project_path: None,
            file_context: None,
            code_block: None,
            session_id: None,
            extra: serde_json::Map::new(),
        }
    }
}

impl Metadata {
    /// `metadata.weight / 3`, the multiplier applied to recall similarity (spec §4.7).
    #[must_use]
    pub fn weight_multiplier(&self) -> f32 {
        f32::from(self.weight) / 3.0
    }
}

/// The universal memory record (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    #[serde(rename = "type")]
    pub memory_type: MemoryType,
    pub tier: Tier,
    pub content: String,
    pub tags: BTreeSet<String>,
    pub metadata: Metadata,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    #[serde(rename = "accessCount")]
    pub access_count: u64,
    #[serde(rename = "lastAccessedAt")]
    pub last_accessed_at: Option<i64>,
    pub pinned: bool,
    /// Seconds; only meaningful for `Tier::L1`.
    pub ttl: Option<u64>,
}

impl Memory {
    /// Build a new memory with an id, both timestamps, and access bookkeeping seeded
    /// the way every `store` path needs it.
    #[must_use]
    pub fn new(
        memory_type: MemoryType,
        tier: Tier,
        content: String,
        tags: BTreeSet<String>,
        metadata: Metadata,
        ttl: Option<u64>,
    ) -> Self {
        let now = super::now_ms();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            memory_type,
            tier,
            content,
            tags,
            metadata,
            created_at: now,
            updated_at: now,
            access_count: 0,
            last_accessed_at: None,
            pinned: false,
            ttl,
        }
    }

    /// Record an access: bump the counter and timestamp.
    pub fn touch(&mut self) {
        self.access_count += 1;
        self.last_accessed_at = Some(super::now_ms());
    }
}
