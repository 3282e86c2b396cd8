//! Tier backends and the small capability vocabulary the orchestrator uses to talk
//! to them uniformly (spec §9: "expose tier capabilities through a small capability
//! set"). Tiers never know about the orchestrator; this module only defines shared
//! shapes, not a trait object hierarchy, since each tier's extra capabilities
//! (L2: summarize/project_meta, L3: decay) differ enough that a single trait object
//! would just grow optional methods.

pub mod l1;
pub mod l2;
pub mod l3;

use crate::types::{Memory, MemoryType};

/// A page of results plus the total count matching the query (ignoring pagination).
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Filter used by `list`/`find_by_type`/`find_by_tags` across L2 and L3.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub memory_type: Option<MemoryType>,
    /// AND semantics: a memory must carry every tag in this set.
    pub tags_all: Vec<String>,
    /// OR semantics: a memory must carry at least one tag in this set.
    pub tags_any: Vec<String>,
    pub limit: usize,
    pub offset: usize,
}

impl ListFilter {
    #[must_use]
    pub fn paginated(limit: usize, offset: usize) -> Self {
        Self {
            limit,
            offset,
            ..Default::default()
        }
    }
}

/// A memory plus its relevance to a query, returned by every tier's recall path.
#[derive(Debug, Clone)]
pub struct RecallMatch {
    pub memory: Memory,
    pub similarity: f32,
}

/// A patch applied by `update`. `None` means "leave unchanged"; this is why `tags`
/// and `content` are `Option<T>` rather than bare values.
#[derive(Debug, Clone, Default)]
pub struct MemoryPatch {
    pub content: Option<String>,
    pub tags: Option<std::collections::BTreeSet<String>>,
    pub metadata: Option<crate::types::Metadata>,
    pub pinned: Option<bool>,
}
