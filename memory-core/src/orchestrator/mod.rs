//! The engine orchestrator: owns one instance of each tier plus the shared
//! embedding service, and implements every named protocol operation (spec §4.7,
//! §6). Tiers never reference this type; it is the only thing that knows all
//! three of them.

pub mod fusion;
pub mod protocol;

use std::path::{Path, PathBuf};

use tokio::sync::OnceCell;

use crate::code_index::search::{SearchFilters, SemanticMatch, TextMatch};
use crate::code_index::CodeIndex;
use crate::config::Config;
use crate::embeddings::EmbeddingService;
use crate::error::{Error, Result};
use crate::router::{self, RouteRequest};
use crate::tiers::l1::WorkingTier;
use crate::tiers::l2::ProjectTier;
use crate::tiers::l3::{DecayConfig, SemanticTier};
use crate::tiers::{ListFilter, MemoryPatch, RecallMatch};
use crate::types::{now_ms, Memory, MemoryType, Tier};

use protocol::{
    CodeSearchHit, ContextWindow, DeleteResult, GetCurrentOptions, GetResult, ListOptions, ListResult, OrientOptions,
    OrientResult, RecallItem, RecallOptions, ReportEvent, ReportEventResult, SearchCodeOptions, SearchCodeResult,
    SearchMode, StoreOptions, StoreResult, SummarizeResult, UpdateOptions, UpdateResult,
};

/// Owns the three tiers, the shared embedding service, and a lazily-opened code
/// index for one project. Cloning an `Engine` is not supported; wrap it in an
/// `Arc` at the call site if shared ownership is needed.
pub struct Engine {
    l1: WorkingTier,
    l2: ProjectTier,
    l3: SemanticTier,
    embeddings: EmbeddingService,
    code_index: OnceCell<CodeIndex>,
    config: Config,
    project_path: PathBuf,
}

impl Engine {
    pub async fn open(project_path: &Path, config: Config) -> Result<Self> {
        let l1 = WorkingTier::new();
        let l2 = ProjectTier::open(&config.l2_path(project_path)).await?;
        let l3 = SemanticTier::open(&config.l3_path()).await?;
        let embeddings = EmbeddingService::new(config.embedding.dimension);
        Ok(Self {
            l1,
            l2,
            l3,
            embeddings,
            code_index: OnceCell::new(),
            config,
            project_path: project_path.to_path_buf(),
        })
    }

    async fn code_index(&self) -> Result<&CodeIndex> {
        self.code_index
            .get_or_try_init(|| async {
                CodeIndex::open(
                    &self.config.code_index_path(&self.project_path),
                    &self.project_path,
                    self.config.code_index.clone(),
                )
                .await
            })
            .await
    }

    fn decay_config(&self) -> DecayConfig {
        DecayConfig {
            decay_days: self.config.ttl.l3_decay_days,
            threshold: self.config.ttl.l3_decay_threshold,
        }
    }

    pub async fn store(&self, content: String, memory_type: MemoryType, options: StoreOptions) -> Result<StoreResult> {
        let decision = router::route(&RouteRequest {
            content: &content,
            memory_type,
            tags: &options.tags,
            ttl: options.ttl,
            forced_tier: options.forced_tier,
            session_hint: options.session_hint,
        });

        let ttl = options.ttl.or(match decision.tier {
            Tier::L1 => Some(self.config.ttl.l1_default),
            _ => None,
        });
        let mut memory = Memory::new(memory_type, decision.tier, content, options.tags, options.metadata, ttl);
        memory.pinned = options.pinned;

        let stored_id = match decision.tier {
            Tier::L1 => {
                let stored = self.l1.store(
                    memory.content.clone(),
                    memory.memory_type,
                    memory.metadata.clone(),
                    memory.tags.clone(),
                    ttl.unwrap_or(self.config.ttl.l1_default),
                );
                stored.id
            }
            Tier::L2 => self.l2.store(memory).await?.id,
            Tier::L3 => self.l3.store(memory, &self.embeddings).await?.id,
        };

        Ok(StoreResult {
            id: stored_id,
            tier: decision.tier,
            reason: decision.reason.to_string(),
            confidence: decision.confidence,
        })
    }

    pub async fn get(&self, id: &str) -> Result<GetResult> {
        if let Some(memory) = self.l1.get(id) {
            return Ok(GetResult { memory, tier: Tier::L1 });
        }
        if let Some(memory) = self.l2.get(id).await? {
            return Ok(GetResult { memory, tier: Tier::L2 });
        }
        if let Some(memory) = self.l3.get(id).await? {
            return Ok(GetResult { memory, tier: Tier::L3 });
        }
        Err(Error::NotFound(id.to_string()))
    }

    async fn locate(&self, id: &str) -> Result<Tier> {
        if self.l1.contains(id) {
            return Ok(Tier::L1);
        }
        if self.l2.peek(id).await?.is_some() {
            return Ok(Tier::L2);
        }
        if self.l3.peek(id).await?.is_some() {
            return Ok(Tier::L3);
        }
        Err(Error::NotFound(id.to_string()))
    }

    /// Fan out per-tier queries, weight each match by `metadata.weight/3`,
    /// fuse via RRF, then apply the type/tag/threshold filters and truncate
    /// to `limit` (spec §4.7).
    pub async fn recall(&self, query: &str, options: RecallOptions) -> Result<Vec<RecallItem>> {
        let layers = &options.filter.layers;
        let wants = |tier: Tier| layers.is_empty() || layers.contains(&tier);
        let scan_limit = options.limit.max(50);

        let mut lists: Vec<Vec<RecallMatch>> = Vec::new();

        if wants(Tier::L1) {
            let needle = query.to_lowercase();
            let matches: Vec<RecallMatch> = self
                .l1
                .get_all()
                .into_iter()
                .filter(|m| m.content.to_lowercase().contains(&needle))
                .map(|memory| RecallMatch { memory, similarity: 1.0 })
                .collect();
            lists.push(weight_and_sort(matches));
        }

        if wants(Tier::L2) {
            let substring: Vec<RecallMatch> = self
                .l2
                .search(query)
                .await?
                .into_iter()
                .enumerate()
                .map(|(idx, memory)| RecallMatch {
                    memory,
                    similarity: 1.0 - (idx as f32 * 0.001),
                })
                .collect();
            lists.push(weight_and_sort(substring));

            let bm25: Vec<RecallMatch> = self
                .l2
                .search_bm25(query)
                .await?
                .into_iter()
                .enumerate()
                .map(|(idx, memory)| RecallMatch {
                    memory,
                    similarity: 1.0 - (idx as f32 * 0.001),
                })
                .collect();
            lists.push(weight_and_sort(bm25));
        }

        if wants(Tier::L3) {
            let matches = self.l3.recall(query, scan_limit, &self.embeddings).await?;
            lists.push(weight_and_sort(matches));
        }

        let fused = fusion::fuse(&lists, None);
        let types = &options.filter.types;
        let tags = &options.filter.tags;

        let filtered: Vec<RecallItem> = fused
            .into_iter()
            .filter(|m| types.is_empty() || types.contains(&m.memory.memory_type))
            .filter(|m| tags.is_empty() || tags.iter().any(|t| m.memory.tags.contains(t)))
            .filter(|m| m.similarity >= options.threshold)
            .take(options.limit)
            .map(|m| RecallItem {
                tier: m.memory.tier,
                memory: m.memory,
                similarity: m.similarity,
            })
            .collect();
        Ok(filtered)
    }

    pub async fn update(&self, id: &str, options: UpdateOptions) -> Result<UpdateResult> {
        let current_tier = self.locate(id).await?;

        if let Some(target) = options.target_layer {
            if target > current_tier {
                let promoted = self.promote(id, current_tier).await?;
                return Ok(UpdateResult::Promoted {
                    memory: promoted,
                    from: current_tier,
                    to: current_tier.next().unwrap_or(current_tier),
                });
            }
            if target < current_tier {
                return Err(Error::UnsupportedTransition("demote is not supported".to_string()));
            }
        }

        if current_tier == Tier::L1 {
            return Err(Error::UnsupportedTransition("L1 memories cannot be updated in place".to_string()));
        }

        let mut metadata = options.metadata;
        if let Some(weight) = options.weight {
            let mut m = match metadata {
                Some(m) => m,
                None => match current_tier {
                    Tier::L2 => self.l2.peek(id).await?.ok_or_else(|| Error::NotFound(id.to_string()))?.metadata,
                    Tier::L3 => self.l3.peek(id).await?.ok_or_else(|| Error::NotFound(id.to_string()))?.metadata,
                    Tier::L1 => unreachable!("L1 already rejected above"),
                },
            };
            m.weight = weight;
            metadata = Some(m);
        }
        let patch = MemoryPatch {
            content: options.content,
            tags: options.tags,
            metadata,
            pinned: options.pinned,
        };

        let memory = match current_tier {
            Tier::L1 => unreachable!("L1 already rejected above"),
            Tier::L2 => self.l2.update(id, patch).await?,
            Tier::L3 => self.l3.update(id, patch, &self.embeddings).await?,
        };
        Ok(UpdateResult::Updated(memory))
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteResult> {
        let tier = self.locate(id).await?;
        let deleted = match tier {
            Tier::L1 => self.l1.delete(id),
            Tier::L2 => self.l2.delete(id).await?,
            Tier::L3 => self.l3.delete(id).await?,
        };
        if deleted {
            Ok(DeleteResult { deleted_from: tier })
        } else {
            Err(Error::NotFound(id.to_string()))
        }
    }

    pub async fn list(&self, options: ListOptions) -> Result<ListResult> {
        let tier = options.tier.unwrap_or(Tier::L2);
        let limit = options.limit.unwrap_or(20);
        let offset = options.offset.unwrap_or(0);
        let filter = ListFilter {
            memory_type: options.memory_type,
            tags_all: options.tags,
            tags_any: Vec::new(),
            limit,
            offset,
        };

        let page = match tier {
            Tier::L1 => {
                let mut items = self.l1.get_all();
                if let Some(ty) = filter.memory_type {
                    items.retain(|m| m.memory_type == ty);
                }
                if !filter.tags_all.is_empty() {
                    items.retain(|m| filter.tags_all.iter().all(|t| m.tags.contains(t)));
                }
                let total = items.len();
                let page = items.into_iter().skip(offset).take(limit).collect();
                crate::tiers::PaginatedResult { items: page, total }
            }
            Tier::L2 => {
                if let Some(ty) = filter.memory_type {
                    self.l2.find_by_type(ty, limit, offset).await?
                } else if !filter.tags_all.is_empty() {
                    self.l2.find_by_tags(&filter).await?
                } else {
                    self.l2.get_all(limit, offset).await?
                }
            }
            Tier::L3 => self.l3.find_by_tags(&filter).await?,
        };

        Ok(ListResult {
            items: page.items,
            total: page.total,
        })
    }

    /// Copy to the next higher tier with a fresh id, then delete the original.
    /// A crash between the two steps leaves an orphan duplicate, which a later
    /// `get` resolves by preferring the highest-tier copy (spec §5).
    pub async fn promote(&self, id: &str, from: Tier) -> Result<Memory> {
        let Some(to) = from.next() else {
            return Err(Error::UnsupportedTransition("cannot promote past L3".to_string()));
        };

        let existing = match from {
            Tier::L1 => self.l1.get(id).ok_or_else(|| Error::NotFound(id.to_string()))?,
            Tier::L2 => self.l2.peek(id).await?.ok_or_else(|| Error::NotFound(id.to_string()))?,
            Tier::L3 => return Err(Error::UnsupportedTransition("cannot promote past L3".to_string())),
        };

        let mut promoted = Memory::new(
            existing.memory_type,
            to,
            existing.content.clone(),
            existing.tags.clone(),
            existing.metadata.clone(),
            None,
        );
        promoted.pinned = existing.pinned;

        let new_memory = match to {
            Tier::L2 => self.l2.store(promoted).await?,
            Tier::L3 => self.l3.store(promoted, &self.embeddings).await?,
            Tier::L1 => unreachable!("promotion target is never L1"),
        };

        match from {
            Tier::L1 => {
                self.l1.delete(id);
            }
            Tier::L2 => {
                self.l2.delete(id).await?;
            }
            Tier::L3 => unreachable!(),
        }
        Ok(new_memory)
    }

    /// L2 archives into a summary memory; L3 runs one decay pass and reports
    /// the affected count; L1 rejects (spec §4.7).
    pub async fn summarize(&self, tier: Tier, older_than_days: f64) -> Result<SummarizeResult> {
        match tier {
            Tier::L1 => Err(Error::UnsupportedTransition("L1 cannot be summarized".to_string())),
            Tier::L2 => {
                let summary = self.l2.summarize(older_than_days).await?;
                Ok(SummarizeResult {
                    summary_id: summary.id,
                    count: 1,
                    content: summary.content,
                })
            }
            Tier::L3 => {
                let report = self.l3.decay_sweep(self.decay_config()).await?;
                Ok(SummarizeResult {
                    summary_id: String::new(),
                    count: report.deleted + report.updated,
                    content: format!(
                        "decay sweep: {} deleted, {} updated, {} pinned skipped",
                        report.deleted, report.updated, report.skipped_pinned
                    ),
                })
            }
        }
    }

    /// Check the project's `last_seen` marker, compute the offline gap, then
    /// advance the marker to now (spec §4.7).
    pub async fn orient(&self, options: OrientOptions) -> Result<OrientResult> {
        let last_seen = self.l2.get_last_seen().await?;
        let now = now_ms();
        let offline_gap_ms = last_seen.map(|ts| now - ts);
        let recent = match last_seen {
            Some(ts) => self.l2.get_memories_since(ts).await?,
            None => Vec::new(),
        };
        self.l2.update_last_seen().await?;

        let summary = match offline_gap_ms {
            Some(gap) => format!(
                "Welcome back to {}. {} ms since last session; {} memories since then.",
                options.project_path,
                gap,
                recent.len()
            ),
            None => format!("First visit to {}.", options.project_path),
        };

        Ok(OrientResult {
            summary,
            time_anchor: now,
            offline_gap_ms,
            recent_memories_since_last_seen: recent,
        })
    }

    /// Free-form telemetry ingestion: stores the event payload as a `message`
    /// working memory so it participates in ordinary recall, and reports back
    /// which downstream actions it triggered. The only action this engine
    /// wires up today is the storage itself; richer trigger rules are left to
    /// the caller until the event taxonomy is specified beyond its envelope.
    pub async fn report_event(&self, event: ReportEvent) -> Result<ReportEventResult> {
        let content = serde_json::to_string(&event.payload).unwrap_or_default();
        let mut tags = std::collections::BTreeSet::new();
        tags.insert(event.event_type.clone());
        let result = self
            .store(
                format!("{}: {}", event.event_type, content),
                MemoryType::Observation,
                StoreOptions {
                    tags,
                    metadata: crate::types::Metadata {
                        session_id: Some(event.session_id),
                        project_path: event.project_path,
                        cli_type: event.cli_type,
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .await?;
        Ok(ReportEventResult {
            processed: true,
            memory_id: Some(result.id),
            triggered_actions: vec!["stored".to_string()],
        })
    }

    /// Compose a lightweight context window: recent L1 working memories plus
    /// the project's top semantic/project recall for the current file, if any.
    pub async fn get_current(&self, options: GetCurrentOptions) -> Result<ContextWindow> {
        let working_memories = self.l1.get_all();
        let query = options.current_file.clone().unwrap_or_default();
        let relevant_memories = if query.is_empty() {
            Vec::new()
        } else {
            self.recall(
                &query,
                RecallOptions {
                    limit: self.config.context.max_relevant_memories,
                    threshold: 0.0,
                    filter: protocol::RecallFilter::default(),
                },
            )
            .await?
        };
        let patterns = self
            .list(ListOptions {
                tier: Some(Tier::L3),
                memory_type: Some(MemoryType::CodePattern),
                limit: Some(self.config.context.max_patterns),
                ..Default::default()
            })
            .await?
            .items;
        Ok(ContextWindow {
            working_memories,
            relevant_memories,
            patterns,
        })
    }

    pub async fn search_code(&self, options: SearchCodeOptions) -> Result<SearchCodeResult> {
        let index = self.code_index().await?;
        let index_status = index.incremental_update(&self.embeddings).await?;

        let filters = SearchFilters {
            language: options.language.as_deref(),
            file_pattern: options.file_pattern.as_deref(),
            symbol_kind: options.symbol_kind,
        };
        let limit = options.limit.unwrap_or(20);
        let include_content = options.include_content.unwrap_or(false);

        let results = match options.mode.unwrap_or(SearchMode::Text) {
            SearchMode::Text => {
                let matches: Vec<TextMatch> = index.search_text(&options.query, &filters).await?;
                matches
                    .into_iter()
                    .take(limit)
                    .map(|m| CodeSearchHit {
                        file_path: m.chunk.file_path,
                        line_start: m.chunk.line_start,
                        line_end: m.chunk.line_end,
                        similarity: None,
                        symbol: None,
                        content: include_content.then_some(m.chunk.content),
                    })
                    .collect()
            }
            SearchMode::Symbol => {
                let matches = index.search_symbol(&options.query, &filters).await?;
                matches
                    .into_iter()
                    .take(limit)
                    .map(|symbol| CodeSearchHit {
                        file_path: symbol.file_path.clone(),
                        line_start: symbol.line_start,
                        line_end: symbol.line_end.unwrap_or(symbol.line_start),
                        similarity: None,
                        symbol: Some(symbol),
                        content: None,
                    })
                    .collect()
            }
            SearchMode::Semantic => {
                let threshold = options.threshold.unwrap_or(0.5);
                let matches: Vec<SemanticMatch> = index
                    .search_semantic(&options.query, threshold, &filters, &self.embeddings)
                    .await?;
                matches
                    .into_iter()
                    .take(limit)
                    .map(|m| CodeSearchHit {
                        file_path: m.chunk.file_path,
                        line_start: m.chunk.line_start,
                        line_end: m.chunk.line_end,
                        similarity: Some(m.similarity),
                        symbol: None,
                        content: include_content.then_some(m.chunk.content),
                    })
                    .collect()
            }
        };

        Ok(SearchCodeResult { results, index_status })
    }

    /// Bump an L3 memory's access bookkeeping and decay score without a full
    /// recall, used by callers that look a memory up via `get` then want to
    /// register that access for decay purposes.
    pub async fn touch_semantic(&self, id: &str) -> Result<()> {
        self.l3.touch(id, self.decay_config()).await
    }
}

fn weight_and_sort(mut matches: Vec<RecallMatch>) -> Vec<RecallMatch> {
    for m in &mut matches {
        m.similarity *= m.memory.metadata.weight_multiplier();
    }
    matches.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metadata;

    async fn open_engine() -> (Engine, tempfile::TempDir, tempfile::TempDir) {
        let project_dir = tempfile::tempdir().unwrap();
        let home_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.l3_path = Some(home_dir.path().join("semantic.db"));
        let engine = Engine::open(project_dir.path(), config).await.unwrap();
        (engine, project_dir, home_dir)
    }

    #[tokio::test]
    async fn scratchpad_routes_to_l1_and_is_retrievable() {
        let (engine, _p, _h) = open_engine().await;
        let result = engine
            .store("Remember to refactor".to_string(), MemoryType::Scratchpad, StoreOptions::default())
            .await
            .unwrap();
        assert_eq!(result.tier, Tier::L1);
        let fetched = engine.get(&result.id).await.unwrap();
        assert_eq!(fetched.memory.content, "Remember to refactor");
    }

    #[tokio::test]
    async fn decision_promotes_from_l2_to_l3() {
        let (engine, _p, _h) = open_engine().await;
        let stored = engine
            .store("Use Postgres for ACID".to_string(), MemoryType::Decision, StoreOptions::default())
            .await
            .unwrap();
        assert_eq!(stored.tier, Tier::L2);

        let promoted = engine.promote(&stored.id, Tier::L2).await.unwrap();
        assert_eq!(promoted.tier, Tier::L3);
        assert!(engine.get(&stored.id).await.is_err());
        assert!(engine.get(&promoted.id).await.is_ok());
    }

    #[tokio::test]
    async fn global_tag_routes_to_l3() {
        let (engine, _p, _h) = open_engine().await;
        let mut tags = std::collections::BTreeSet::new();
        tags.insert("global".to_string());
        let result = engine
            .store(
                "Global style rule".to_string(),
                MemoryType::Decision,
                StoreOptions { tags, ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(result.tier, Tier::L3);
    }

    #[tokio::test]
    async fn update_on_l1_memory_is_rejected() {
        let (engine, _p, _h) = open_engine().await;
        let stored = engine
            .store("ephemeral".to_string(), MemoryType::Scratchpad, StoreOptions::default())
            .await
            .unwrap();
        let result = engine
            .update(&stored.id, UpdateOptions { content: Some("changed".to_string()), ..Default::default() })
            .await;
        assert!(matches!(result, Err(Error::UnsupportedTransition(_))));
    }

    #[tokio::test]
    async fn list_defaults_to_l2_with_limit_twenty() {
        let (engine, _p, _h) = open_engine().await;
        for i in 0..3 {
            engine
                .store(format!("decision {i}"), MemoryType::Decision, StoreOptions::default())
                .await
                .unwrap();
        }
        let page = engine.list(ListOptions::default()).await.unwrap();
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn recall_weights_by_metadata_weight() {
        let (engine, _p, _h) = open_engine().await;
        let low = Metadata { weight: 1, ..Default::default() };
        let high = Metadata { weight: 5, ..Default::default() };
        engine
            .store(
                "refresh token rotation plan".to_string(),
                MemoryType::Documentation,
                StoreOptions { metadata: low, ..Default::default() },
            )
            .await
            .unwrap();
        engine
            .store(
                "refresh token rotation plan".to_string(),
                MemoryType::Documentation,
                StoreOptions { metadata: high, ..Default::default() },
            )
            .await
            .unwrap();
        let results = engine
            .recall(
                "refresh token rotation",
                RecallOptions { limit: 5, threshold: 0.0, filter: protocol::RecallFilter::default() },
            )
            .await
            .unwrap();
        assert!(results[0].memory.metadata.weight >= results[1].memory.metadata.weight);
    }
}
