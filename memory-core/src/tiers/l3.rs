//! L3 semantic tier: a single global, embedding-backed relational store shared
//! across every project (spec §4.4).

use std::collections::BTreeSet;
use std::path::Path;

use libsql::{Builder, Connection, Database};
use tokio::sync::Mutex as AsyncMutex;

use crate::embeddings::{cosine_similarity, EmbeddingService};
use crate::error::{Error, Result};
use crate::fts::sanitize_bm25_query;
use crate::tiers::{ListFilter, MemoryPatch, PaginatedResult, RecallMatch};
use crate::types::{now_ms, Memory, MemoryType, Metadata, Tier};

const SCHEMA: &[&str] = &[
    "PRAGMA journal_mode=WAL",
    r#"CREATE TABLE IF NOT EXISTS memories (
        id TEXT PRIMARY KEY,
        type TEXT NOT NULL,
        content TEXT NOT NULL,
        metadata TEXT NOT NULL,
        embedding BLOB NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        accessed_at INTEGER,
        access_count INTEGER NOT NULL DEFAULT 0,
        relevance_score REAL NOT NULL DEFAULT 1.0,
        pinned INTEGER NOT NULL DEFAULT 0
    )"#,
    r#"CREATE TABLE IF NOT EXISTS memory_tags (
        memory_id TEXT NOT NULL REFERENCES memories(id) ON DELETE CASCADE,
        tag TEXT NOT NULL,
        PRIMARY KEY (memory_id, tag)
    )"#,
    r#"CREATE VIRTUAL TABLE IF NOT EXISTS memories_fts USING fts5(
        id UNINDEXED, content, tokenize = 'porter unicode61'
    )"#,
    r#"CREATE TRIGGER IF NOT EXISTS memories_fts_ai AFTER INSERT ON memories BEGIN
        INSERT INTO memories_fts(id, content) VALUES (new.id, new.content);
    END"#,
    r#"CREATE TRIGGER IF NOT EXISTS memories_fts_ad AFTER DELETE ON memories BEGIN
        DELETE FROM memories_fts WHERE id = old.id;
    END"#,
    r#"CREATE TRIGGER IF NOT EXISTS memories_fts_au AFTER UPDATE OF content ON memories BEGIN
        UPDATE memories_fts SET content = new.content WHERE id = old.id;
    END"#,
    "CREATE INDEX IF NOT EXISTS idx_memories_created_at ON memories(created_at DESC)",
];

/// Decay tuning. `decay_days` sets `D`; `threshold` is the score below which a
/// non-pinned row is deleted on sweep (spec §4.4).
#[derive(Debug, Clone, Copy)]
pub struct DecayConfig {
    pub decay_days: f64,
    pub threshold: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            decay_days: 14.0,
            threshold: 0.2,
        }
    }
}

/// Outcome of one decay sweep.
#[derive(Debug, Clone, Default)]
pub struct DecayReport {
    pub deleted: usize,
    pub updated: usize,
    pub skipped_pinned: usize,
}

/// The semantic tier: one global store shared across all projects.
pub struct SemanticTier {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    write_lock: AsyncMutex<()>,
}

struct Row {
    memory: Memory,
    embedding: Vec<f32>,
}

impl SemanticTier {
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| Error::storage(Tier::L3, "open", e.to_string()))?;
        let conn = db
            .connect()
            .map_err(|e| Error::storage(Tier::L3, "connect", e.to_string()))?;
        for stmt in SCHEMA {
            conn.query(stmt, ())
                .await
                .map_err(|e| Error::storage(Tier::L3, "migrate", e.to_string()))?;
        }
        Ok(Self {
            db,
            conn,
            write_lock: AsyncMutex::new(()),
        })
    }

    pub async fn store(&self, memory: Memory, embedding_svc: &EmbeddingService) -> Result<Memory> {
        let embedding = embedding_svc.embed(&memory.content)?;
        self.insert_row(&memory, &embedding).await?;
        self.replace_tags(&memory.id, &memory.tags).await?;
        Ok(memory)
    }

    async fn insert_row(&self, memory: &Memory, embedding: &[f32]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let metadata_json = serde_json::to_string(&memory.metadata)?;
        let embedding_blob = encode_embedding(embedding);
        self.conn
            .execute(
                "INSERT INTO memories
                 (id, type, content, metadata, embedding, created_at, updated_at, accessed_at, access_count, relevance_score, pinned)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                libsql::params![
                    memory.id.clone(),
                    memory.memory_type.as_str(),
                    memory.content.clone(),
                    metadata_json,
                    embedding_blob,
                    memory.created_at,
                    memory.updated_at,
                    memory.last_accessed_at,
                    memory.access_count as i64,
                    1.0_f64,
                    i64::from(memory.pinned),
                ],
            )
            .await
            .map_err(|e| Error::storage(Tier::L3, "store", e.to_string()))?;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Memory>> {
        Ok(self.select_by_id(id).await?.map(|r| r.memory))
    }

    /// Alias for `get`: L3 lookups never bump access bookkeeping on their own
    /// (spec §4.7), so `peek` and `get` are equivalent here.
    pub async fn peek(&self, id: &str) -> Result<Option<Memory>> {
        self.get(id).await
    }

    /// Recall: embed the query, cosine-compare against every stored vector, return
    /// the top `limit` matches sorted descending. Unparseable embeddings are skipped
    /// rather than failing the whole recall (spec §4.4).
    pub async fn recall(
        &self,
        query: &str,
        limit: usize,
        embedding_svc: &EmbeddingService,
    ) -> Result<Vec<RecallMatch>> {
        let query_vec = embedding_svc.embed(query)?;
        let rows = self.select_all().await?;
        let mut matches: Vec<RecallMatch> = rows
            .into_iter()
            .map(|row| {
                let similarity = cosine_similarity(&query_vec, &row.embedding);
                RecallMatch {
                    memory: row.memory,
                    similarity,
                }
            })
            .collect();
        matches.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(limit);
        Ok(matches)
    }

    /// `content` changes trigger a re-embed; tag/metadata-only updates reuse the
    /// stored vector (spec §4.4).
    pub async fn update(
        &self,
        id: &str,
        patch: MemoryPatch,
        embedding_svc: &EmbeddingService,
    ) -> Result<Memory> {
        let existing = self
            .select_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let content_changed = patch.content.is_some();
        let content = patch.content.unwrap_or(existing.memory.content);
        let metadata = patch.metadata.unwrap_or(existing.memory.metadata);
        let pinned = patch.pinned.unwrap_or(existing.memory.pinned);
        let tags = patch.tags.unwrap_or(existing.memory.tags);
        let embedding = if content_changed {
            embedding_svc.embed(&content)?
        } else {
            existing.embedding
        };
        let now = now_ms();

        let _guard = self.write_lock.lock().await;
        let metadata_json = serde_json::to_string(&metadata)?;
        let embedding_blob = encode_embedding(&embedding);
        self.conn
            .execute(
                "UPDATE memories SET content = ?, metadata = ?, embedding = ?, pinned = ?, updated_at = ? WHERE id = ?",
                libsql::params![
                    content.clone(),
                    metadata_json,
                    embedding_blob,
                    i64::from(pinned),
                    now,
                    id.to_string(),
                ],
            )
            .await
            .map_err(|e| Error::storage(Tier::L3, "update", e.to_string()))?;
        drop(_guard);
        self.replace_tags(id, &tags).await?;

        Ok(Memory {
            id: id.to_string(),
            memory_type: existing.memory.memory_type,
            tier: Tier::L3,
            content,
            tags,
            metadata,
            created_at: existing.memory.created_at,
            updated_at: now,
            access_count: existing.memory.access_count,
            last_accessed_at: existing.memory.last_accessed_at,
            pinned,
            ttl: None,
        })
    }

    pub async fn set_pinned(&self, id: &str, pinned: bool) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let changed = self
            .conn
            .execute(
                "UPDATE memories SET pinned = ?, updated_at = ? WHERE id = ?",
                libsql::params![i64::from(pinned), now_ms(), id.to_string()],
            )
            .await
            .map_err(|e| Error::storage(Tier::L3, "set_pinned", e.to_string()))?;
        if changed == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let changed = self
            .conn
            .execute("DELETE FROM memories WHERE id = ?", libsql::params![id.to_string()])
            .await
            .map_err(|e| Error::storage(Tier::L3, "delete", e.to_string()))?;
        self.conn
            .execute(
                "DELETE FROM memory_tags WHERE memory_id = ?",
                libsql::params![id.to_string()],
            )
            .await
            .map_err(|e| Error::storage(Tier::L3, "delete", e.to_string()))?;
        Ok(changed > 0)
    }

    /// Record an access: bump the counter/timestamp and recompute `relevance_score`
    /// via the access-scoring formula (spec §4.4), independent of the decay sweep.
    pub async fn touch(&self, id: &str, decay: DecayConfig) -> Result<()> {
        let row = self
            .select_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let now = now_ms();
        let access_count = row.memory.access_count + 1;
        let d_ms = decay.decay_days * 86_400_000.0;
        let since_access = (now - row.memory.last_accessed_at.unwrap_or(row.memory.created_at)) as f64;
        let since_created = (now - row.memory.created_at) as f64;
        let score = 0.4 * (-since_access / (d_ms / 2.0)).exp()
            + 0.3 * (-since_created / (3.0 * d_ms)).exp()
            + 0.3
            + (f64::from(access_count as u32) / 20.0).min(0.3);
        let score = score.clamp(0.0, 1.0);

        let _guard = self.write_lock.lock().await;
        self.conn
            .execute(
                "UPDATE memories SET access_count = ?, accessed_at = ?, relevance_score = ? WHERE id = ?",
                libsql::params![access_count as i64, now, score, id.to_string()],
            )
            .await
            .map_err(|e| Error::storage(Tier::L3, "touch", e.to_string()))?;
        Ok(())
    }

    /// Sweep every non-pinned row, recompute its decay score, delete rows below
    /// threshold and persist updated scores that moved by more than 0.01 (spec §4.4).
    pub async fn decay_sweep(&self, decay: DecayConfig) -> Result<DecayReport> {
        let rows = self.select_all_with_pinned().await?;
        let now = now_ms();
        let d_ms = decay.decay_days * 86_400_000.0;
        let mut report = DecayReport::default();

        for (row, pinned, stored_score) in rows {
            if pinned {
                report.skipped_pinned += 1;
                continue;
            }
            let age = (now - row.memory.created_at) as f64;
            let since_access = (now - row.memory.last_accessed_at.unwrap_or(row.memory.created_at)) as f64;
            let score = 0.3 * (-age / (2.0 * d_ms)).exp()
                + 0.7 * (-since_access / d_ms).exp()
                + (f64::from(row.memory.access_count as u32) / 10.0).min(0.5);

            if score < decay.threshold {
                self.delete(&row.memory.id).await?;
                report.deleted += 1;
            } else if (score - stored_score).abs() > 0.01 {
                let _guard = self.write_lock.lock().await;
                self.conn
                    .execute(
                        "UPDATE memories SET relevance_score = ? WHERE id = ?",
                        libsql::params![score, row.memory.id.clone()],
                    )
                    .await
                    .map_err(|e| Error::storage(Tier::L3, "decay_sweep", e.to_string()))?;
                report.updated += 1;
            }
        }
        Ok(report)
    }

    pub async fn find_by_tags(&self, filter: &ListFilter) -> Result<PaginatedResult<Memory>> {
        let all = self.select_all().await?;
        let matches: Vec<Memory> = all
            .into_iter()
            .map(|r| r.memory)
            .filter(|m| {
                let type_ok = filter.memory_type.map_or(true, |ty| m.memory_type == ty);
                let all_ok = filter.tags_all.iter().all(|t| m.tags.contains(t));
                let any_ok = filter.tags_any.is_empty() || filter.tags_any.iter().any(|t| m.tags.contains(t));
                type_ok && all_ok && any_ok
            })
            .collect();
        let total = matches.len();
        let page = matches.into_iter().skip(filter.offset).take(filter.limit).collect();
        Ok(PaginatedResult { items: page, total })
    }

    pub async fn search_bm25(&self, query: &str) -> Result<Vec<Memory>> {
        let sanitized = sanitize_bm25_query(query);
        if sanitized.is_empty() {
            return Ok(Vec::new());
        }
        let mut rows = self
            .conn
            .query(
                "SELECT id FROM memories_fts WHERE memories_fts MATCH ? ORDER BY bm25(memories_fts)",
                libsql::params![sanitized],
            )
            .await
            .map_err(|e| Error::storage(Tier::L3, "search_bm25", e.to_string()))?;
        let mut items = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| Error::storage(Tier::L3, "search_bm25", e.to_string()))?
        {
            let id: String = row.get(0).map_err(|e| Error::storage(Tier::L3, "search_bm25", e.to_string()))?;
            if let Some(memory) = self.get(&id).await? {
                items.push(memory);
            }
        }
        Ok(items)
    }

    pub async fn count(&self) -> Result<usize> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM memories", ())
            .await
            .map_err(|e| Error::storage(Tier::L3, "count", e.to_string()))?;
        let row = rows
            .next()
            .await
            .map_err(|e| Error::storage(Tier::L3, "count", e.to_string()))?;
        let count: i64 = row
            .map(|r| r.get(0))
            .transpose()
            .map_err(|e: libsql::Error| Error::storage(Tier::L3, "count", e.to_string()))?
            .unwrap_or(0);
        Ok(count as usize)
    }

    async fn replace_tags(&self, id: &str, tags: &BTreeSet<String>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.conn
            .execute(
                "DELETE FROM memory_tags WHERE memory_id = ?",
                libsql::params![id.to_string()],
            )
            .await
            .map_err(|e| Error::storage(Tier::L3, "replace_tags", e.to_string()))?;
        for tag in tags {
            self.conn
                .execute(
                    "INSERT INTO memory_tags (memory_id, tag) VALUES (?, ?)",
                    libsql::params![id.to_string(), tag.clone()],
                )
                .await
                .map_err(|e| Error::storage(Tier::L3, "replace_tags", e.to_string()))?;
        }
        Ok(())
    }

    async fn select_tags(&self, id: &str) -> Result<BTreeSet<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT tag FROM memory_tags WHERE memory_id = ?",
                libsql::params![id.to_string()],
            )
            .await
            .map_err(|e| Error::storage(Tier::L3, "select_tags", e.to_string()))?;
        let mut tags = BTreeSet::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| Error::storage(Tier::L3, "select_tags", e.to_string()))?
        {
            let tag: String = row.get(0).map_err(|e| Error::storage(Tier::L3, "select_tags", e.to_string()))?;
            tags.insert(tag);
        }
        Ok(tags)
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<Row>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, type, content, metadata, embedding, created_at, updated_at, accessed_at, access_count, pinned
                 FROM memories WHERE id = ?",
                libsql::params![id.to_string()],
            )
            .await
            .map_err(|e| Error::storage(Tier::L3, "select_by_id", e.to_string()))?;
        let Some(sql_row) = rows
            .next()
            .await
            .map_err(|e| Error::storage(Tier::L3, "select_by_id", e.to_string()))?
        else {
            return Ok(None);
        };
        let tags = self.select_tags(id).await?;
        Ok(Some(self.row_from_sql(&sql_row, tags)?))
    }

    async fn select_all(&self) -> Result<Vec<Row>> {
        Ok(self
            .select_all_with_pinned()
            .await?
            .into_iter()
            .map(|(row, _, _)| row)
            .collect())
    }

    async fn select_all_with_pinned(&self) -> Result<Vec<(Row, bool, f64)>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, type, content, metadata, embedding, created_at, updated_at, accessed_at, access_count, pinned, relevance_score
                 FROM memories",
                (),
            )
            .await
            .map_err(|e| Error::storage(Tier::L3, "select_all", e.to_string()))?;
        let mut out = Vec::new();
        while let Some(sql_row) = rows
            .next()
            .await
            .map_err(|e| Error::storage(Tier::L3, "select_all", e.to_string()))?
        {
            let id: String = sql_row.get(0).map_err(|e| Error::storage(Tier::L3, "select_all", e.to_string()))?;
            let pinned: i64 = sql_row.get(9).map_err(|e| Error::storage(Tier::L3, "select_all", e.to_string()))?;
            let stored_score: f64 = sql_row.get(10).map_err(|e| Error::storage(Tier::L3, "select_all", e.to_string()))?;
            let tags = self.select_tags(&id).await?;
            match self.row_from_sql(&sql_row, tags) {
                Ok(row) => out.push((row, pinned != 0, stored_score)),
                Err(Error::CorruptData(msg)) => {
                    tracing::warn!(id, msg, "skipping semantic memory with unparseable embedding");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    fn row_from_sql(&self, row: &libsql::Row, tags: BTreeSet<String>) -> Result<Row> {
        let id: String = row.get(0).map_err(|e| Error::storage(Tier::L3, "row_from_sql", e.to_string()))?;
        let type_str: String = row.get(1).map_err(|e| Error::storage(Tier::L3, "row_from_sql", e.to_string()))?;
        let content: String = row.get(2).map_err(|e| Error::storage(Tier::L3, "row_from_sql", e.to_string()))?;
        let metadata_json: String = row.get(3).map_err(|e| Error::storage(Tier::L3, "row_from_sql", e.to_string()))?;
        let embedding_blob: Vec<u8> = row.get(4).map_err(|e| Error::storage(Tier::L3, "row_from_sql", e.to_string()))?;
        let created_at: i64 = row.get(5).map_err(|e| Error::storage(Tier::L3, "row_from_sql", e.to_string()))?;
        let updated_at: i64 = row.get(6).map_err(|e| Error::storage(Tier::L3, "row_from_sql", e.to_string()))?;
        let accessed_at: Option<i64> = row.get(7).ok();
        let access_count: i64 = row.get(8).map_err(|e| Error::storage(Tier::L3, "row_from_sql", e.to_string()))?;
        let pinned: i64 = row.get(9).map_err(|e| Error::storage(Tier::L3, "row_from_sql", e.to_string()))?;

        let memory_type = type_str.parse::<MemoryType>().map_err(Error::CorruptData)?;
        let metadata: Metadata = serde_json::from_str(&metadata_json)
            .map_err(|e| Error::CorruptData(format!("unparseable metadata for {id}: {e}")))?;
        let embedding = decode_embedding(&embedding_blob)
            .ok_or_else(|| Error::CorruptData(format!("unparseable embedding for {id}")))?;

        Ok(Row {
            memory: Memory {
                id,
                memory_type,
                tier: Tier::L3,
                content,
                tags,
                metadata,
                created_at,
                updated_at,
                access_count: access_count as u64,
                last_accessed_at: accessed_at,
                pinned: pinned != 0,
                ttl: None,
            },
            embedding,
        })
    }
}

fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(blob: &[u8]) -> Option<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return None;
    }
    Some(
        blob.chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_temp() -> (SemanticTier, EmbeddingService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let tier = SemanticTier::open(&dir.path().join("semantic.db")).await.unwrap();
        let svc = EmbeddingService::new(32);
        (tier, svc, dir)
    }

    #[tokio::test]
    async fn store_and_get_roundtrip() {
        let (tier, svc, _dir) = open_temp().await;
        let memory = Memory::new(
            MemoryType::Convention,
            Tier::L3,
            "always use result types for fallible operations".to_string(),
            BTreeSet::new(),
            Metadata::default(),
            None,
        );
        let stored = tier.store(memory, &svc).await.unwrap();
        let fetched = tier.get(&stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, stored.content);
    }

    #[tokio::test]
    async fn recall_ranks_closer_match_first() {
        let (tier, svc, _dir) = open_temp().await;
        let a = Memory::new(
            MemoryType::CodePattern,
            Tier::L3,
            "retry network calls with exponential backoff".to_string(),
            BTreeSet::new(),
            Metadata::default(),
            None,
        );
        let b = Memory::new(
            MemoryType::CodePattern,
            Tier::L3,
            "bananas are a good source of potassium".to_string(),
            BTreeSet::new(),
            Metadata::default(),
            None,
        );
        tier.store(a.clone(), &svc).await.unwrap();
        tier.store(b, &svc).await.unwrap();

        let results = tier.recall("exponential backoff retry", 5, &svc).await.unwrap();
        assert_eq!(results[0].memory.id, a.id);
    }

    #[tokio::test]
    async fn update_without_content_change_reuses_embedding() {
        let (tier, svc, _dir) = open_temp().await;
        let memory = Memory::new(
            MemoryType::Convention,
            Tier::L3,
            "prefer composition over inheritance".to_string(),
            BTreeSet::new(),
            Metadata::default(),
            None,
        );
        let stored = tier.store(memory, &svc).await.unwrap();
        let before = tier.select_by_id(&stored.id).await.unwrap().unwrap().embedding;

        let patch = MemoryPatch {
            pinned: Some(true),
            ..Default::default()
        };
        tier.update(&stored.id, patch, &svc).await.unwrap();
        let after = tier.select_by_id(&stored.id).await.unwrap().unwrap().embedding;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn decay_sweep_skips_pinned_rows() {
        let (tier, svc, _dir) = open_temp().await;
        let mut memory = Memory::new(
            MemoryType::Convention,
            Tier::L3,
            "stable convention".to_string(),
            BTreeSet::new(),
            Metadata::default(),
            None,
        );
        memory.pinned = true;
        memory.created_at = now_ms() - 1000 * 86_400_000;
        let stored = tier.store(memory, &svc).await.unwrap();
        tier.set_pinned(&stored.id, true).await.unwrap();

        let report = tier
            .decay_sweep(DecayConfig {
                decay_days: 1.0,
                threshold: 0.9,
            })
            .await
            .unwrap();
        assert_eq!(report.skipped_pinned, 1);
        assert_eq!(report.deleted, 0);
        assert!(tier.get(&stored.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn decay_sweep_deletes_stale_unpinned_rows() {
        let (tier, svc, _dir) = open_temp().await;
        let mut memory = Memory::new(
            MemoryType::Observation,
            Tier::L3,
            "stale observation".to_string(),
            BTreeSet::new(),
            Metadata::default(),
            None,
        );
        memory.created_at = now_ms() - 1000 * 86_400_000;
        let stored = tier.store(memory, &svc).await.unwrap();

        let report = tier
            .decay_sweep(DecayConfig {
                decay_days: 1.0,
                threshold: 0.9,
            })
            .await
            .unwrap();
        assert_eq!(report.deleted, 1);
        assert!(tier.get(&stored.id).await.unwrap().is_none());
    }

    #[test]
    fn embedding_blob_roundtrips() {
        let v = vec![0.1_f32, -0.2, 0.3];
        let blob = encode_embedding(&v);
        let back = decode_embedding(&blob).unwrap();
        assert_eq!(v, back);
    }
}
