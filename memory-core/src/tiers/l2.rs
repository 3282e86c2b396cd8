//! L2 project tier: an embedded relational store of per-project durable memories,
//! with tags, full-text search, and pin/archive operations (spec §4.3).
//!
//! Backed by `libsql`, the Turso-maintained SQLite fork: a real embedded relational
//! database with WAL journaling and FTS5, the same engine the teacher's
//! `memory-storage-turso` crate uses for durable persistence.

use std::collections::BTreeSet;
use std::path::Path;

use libsql::{Builder, Connection, Database};
use tokio::sync::Mutex as AsyncMutex;

use crate::error::{Error, Result};
use crate::fts::sanitize_bm25_query;
use crate::tiers::{ListFilter, MemoryPatch, PaginatedResult};
use crate::types::{now_ms, Memory, MemoryType, Metadata, Tier};

const SCHEMA: &[&str] = &[
    "PRAGMA journal_mode=WAL",
    r#"CREATE TABLE IF NOT EXISTS memories (
        id TEXT PRIMARY KEY,
        type TEXT NOT NULL,
        content TEXT NOT NULL,
        metadata TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        access_count INTEGER NOT NULL DEFAULT 0,
        last_accessed_at INTEGER,
        pinned INTEGER NOT NULL DEFAULT 0
    )"#,
    r#"CREATE TABLE IF NOT EXISTS memory_tags (
        memory_id TEXT NOT NULL REFERENCES memories(id) ON DELETE CASCADE,
        tag TEXT NOT NULL,
        PRIMARY KEY (memory_id, tag)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS project_meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
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
    "CREATE INDEX IF NOT EXISTS idx_memories_type ON memories(type)",
];

/// The project tier: one instance owns the `.context-fabric/memory.db` file for a
/// single project path for the lifetime of the engine.
pub struct ProjectTier {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    /// Serializes writes on top of SQLite's own locking, matching the
    /// single-writer discipline spec §4.3 requires.
    write_lock: AsyncMutex<()>,
}

impl ProjectTier {
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| Error::storage(Tier::L2, "open", e.to_string()))?;
        let conn = db
            .connect()
            .map_err(|e| Error::storage(Tier::L2, "connect", e.to_string()))?;
        for stmt in SCHEMA {
            conn.query(stmt, ())
                .await
                .map_err(|e| Error::storage(Tier::L2, "migrate", e.to_string()))?;
        }
        Ok(Self {
            db,
            conn,
            write_lock: AsyncMutex::new(()),
        })
    }

    pub async fn store(&self, memory: Memory) -> Result<Memory> {
        let _guard = self.write_lock.lock().await;
        let metadata_json = serde_json::to_string(&memory.metadata)?;
        self.conn
            .execute(
                "INSERT INTO memories (id, type, content, metadata, created_at, updated_at, access_count, last_accessed_at, pinned)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                libsql::params![
                    memory.id.clone(),
                    memory.memory_type.as_str(),
                    memory.content.clone(),
                    metadata_json,
                    memory.created_at,
                    memory.updated_at,
                    memory.access_count as i64,
                    memory.last_accessed_at,
                    i64::from(memory.pinned),
                ],
            )
            .await
            .map_err(|e| Error::storage(Tier::L2, "store", e.to_string()))?;
        drop(_guard);
        self.replace_tags(&memory.id, &memory.tags).await?;
        Ok(memory)
    }

    /// Fetch without bumping access bookkeeping, used for ownership checks.
    pub async fn peek(&self, id: &str) -> Result<Option<Memory>> {
        self.select_by_id(id).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Memory>> {
        let Some(mut memory) = self.select_by_id(id).await? else {
            return Ok(None);
        };
        let _guard = self.write_lock.lock().await;
        let now = now_ms();
        self.conn
            .execute(
                "UPDATE memories SET access_count = access_count + 1, last_accessed_at = ? WHERE id = ?",
                libsql::params![now, id.to_string()],
            )
            .await
            .map_err(|e| Error::storage(Tier::L2, "touch", e.to_string()))?;
        memory.access_count += 1;
        memory.last_accessed_at = Some(now);
        Ok(Some(memory))
    }

    pub async fn update(&self, id: &str, patch: MemoryPatch) -> Result<Memory> {
        let existing = self
            .select_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let _guard = self.write_lock.lock().await;
        let content = patch.content.unwrap_or(existing.content);
        let metadata = patch.metadata.unwrap_or(existing.metadata);
        let pinned = patch.pinned.unwrap_or(existing.pinned);
        let tags = patch.tags.unwrap_or(existing.tags);
        let now = now_ms();
        let metadata_json = serde_json::to_string(&metadata)?;
        self.conn
            .execute(
                "UPDATE memories SET content = ?, metadata = ?, pinned = ?, updated_at = ? WHERE id = ?",
                libsql::params![content.clone(), metadata_json, i64::from(pinned), now, id.to_string()],
            )
            .await
            .map_err(|e| Error::storage(Tier::L2, "update", e.to_string()))?;
        drop(_guard);
        self.replace_tags(id, &tags).await?;
        Ok(Memory {
            id: id.to_string(),
            memory_type: existing.memory_type,
            tier: Tier::L2,
            content,
            tags,
            metadata,
            created_at: existing.created_at,
            updated_at: now,
            access_count: existing.access_count,
            last_accessed_at: existing.last_accessed_at,
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
            .map_err(|e| Error::storage(Tier::L2, "set_pinned", e.to_string()))?;
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
            .map_err(|e| Error::storage(Tier::L2, "delete", e.to_string()))?;
        self.conn
            .execute(
                "DELETE FROM memory_tags WHERE memory_id = ?",
                libsql::params![id.to_string()],
            )
            .await
            .map_err(|e| Error::storage(Tier::L2, "delete", e.to_string()))?;
        Ok(changed > 0)
    }

    pub async fn get_all(&self, limit: usize, offset: usize) -> Result<PaginatedResult<Memory>> {
        let total = self.count().await?;
        let mut rows = self
            .conn
            .query(
                "SELECT id FROM memories ORDER BY created_at DESC LIMIT ? OFFSET ?",
                libsql::params![limit as i64, offset as i64],
            )
            .await
            .map_err(|e| Error::storage(Tier::L2, "get_all", e.to_string()))?;
        let mut ids = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| Error::storage(Tier::L2, "get_all", e.to_string()))?
        {
            let id: String = row.get(0).map_err(|e| Error::storage(Tier::L2, "get_all", e.to_string()))?;
            ids.push(id);
        }
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(memory) = self.select_by_id(&id).await? {
                items.push(memory);
            }
        }
        Ok(PaginatedResult { items, total })
    }

    pub async fn find_by_type(
        &self,
        memory_type: MemoryType,
        limit: usize,
        offset: usize,
    ) -> Result<PaginatedResult<Memory>> {
        let total: i64 = self
            .conn
            .query(
                "SELECT COUNT(*) FROM memories WHERE type = ?",
                libsql::params![memory_type.as_str()],
            )
            .await
            .map_err(|e| Error::storage(Tier::L2, "find_by_type", e.to_string()))?
            .next()
            .await
            .map_err(|e| Error::storage(Tier::L2, "find_by_type", e.to_string()))?
            .map(|row| row.get(0))
            .transpose()
            .map_err(|e: libsql::Error| Error::storage(Tier::L2, "find_by_type", e.to_string()))?
            .unwrap_or(0);

        let mut rows = self
            .conn
            .query(
                "SELECT id FROM memories WHERE type = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
                libsql::params![memory_type.as_str(), limit as i64, offset as i64],
            )
            .await
            .map_err(|e| Error::storage(Tier::L2, "find_by_type", e.to_string()))?;
        let mut items = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| Error::storage(Tier::L2, "find_by_type", e.to_string()))?
        {
            let id: String = row.get(0).map_err(|e| Error::storage(Tier::L2, "find_by_type", e.to_string()))?;
            if let Some(memory) = self.select_by_id(&id).await? {
                items.push(memory);
            }
        }
        Ok(PaginatedResult { items, total: total as usize })
    }

    /// `filter.tags_all` is AND semantics, `filter.tags_any` is OR semantics; both
    /// are applied if both are non-empty (spec §4.3: "both available").
    pub async fn find_by_tags(&self, filter: &ListFilter) -> Result<PaginatedResult<Memory>> {
        let all = self.get_all(usize::MAX - 1, 0).await?;
        let matches: Vec<Memory> = all
            .items
            .into_iter()
            .filter(|m| {
                let all_ok = filter.tags_all.iter().all(|t| m.tags.contains(t));
                let any_ok = filter.tags_any.is_empty() || filter.tags_any.iter().any(|t| m.tags.contains(t));
                all_ok && any_ok
            })
            .collect();
        let total = matches.len();
        let page = matches
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect();
        Ok(PaginatedResult { items: page, total })
    }

    /// Case-insensitive substring search over memory content.
    pub async fn search(&self, query: &str) -> Result<Vec<Memory>> {
        let needle = query.to_lowercase();
        let all = self.get_all(usize::MAX - 1, 0).await?;
        Ok(all
            .items
            .into_iter()
            .filter(|m| m.content.to_lowercase().contains(&needle))
            .collect())
    }

    /// Ranked full-text search via the FTS5 shadow table. An empty sanitized query
    /// returns no rows rather than matching everything (spec §4.3).
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
            .map_err(|e| Error::storage(Tier::L2, "search_bm25", e.to_string()))?;
        let mut items = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| Error::storage(Tier::L2, "search_bm25", e.to_string()))?
        {
            let id: String = row.get(0).map_err(|e| Error::storage(Tier::L2, "search_bm25", e.to_string()))?;
            if let Some(memory) = self.select_by_id(&id).await? {
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
            .map_err(|e| Error::storage(Tier::L2, "count", e.to_string()))?;
        let row = rows
            .next()
            .await
            .map_err(|e| Error::storage(Tier::L2, "count", e.to_string()))?;
        let count: i64 = row
            .map(|r| r.get(0))
            .transpose()
            .map_err(|e: libsql::Error| Error::storage(Tier::L2, "count", e.to_string()))?
            .unwrap_or(0);
        Ok(count as usize)
    }

    pub async fn count_pinned(&self) -> Result<usize> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM memories WHERE pinned = 1", ())
            .await
            .map_err(|e| Error::storage(Tier::L2, "count_pinned", e.to_string()))?;
        let row = rows
            .next()
            .await
            .map_err(|e| Error::storage(Tier::L2, "count_pinned", e.to_string()))?;
        let count: i64 = row
            .map(|r| r.get(0))
            .transpose()
            .map_err(|e: libsql::Error| Error::storage(Tier::L2, "count_pinned", e.to_string()))?
            .unwrap_or(0);
        Ok(count as usize)
    }

    /// Archive all non-pinned, non-summary memories older than the cutoff into a
    /// single new `summary` memory, then delete the archived originals (spec §4.3).
    pub async fn summarize(&self, older_than_days: f64) -> Result<Memory> {
        let cutoff = now_ms() - (older_than_days * 86_400_000.0) as i64;
        let all = self.get_all(usize::MAX - 1, 0).await?;
        let archivable: Vec<Memory> = all
            .items
            .into_iter()
            .filter(|m| !m.pinned && m.memory_type != MemoryType::Summary && m.created_at < cutoff)
            .collect();

        let mut type_counts: std::collections::BTreeMap<&str, usize> = std::collections::BTreeMap::new();
        for m in &archivable {
            *type_counts.entry(m.memory_type.as_str()).or_insert(0) += 1;
        }
        let breakdown = type_counts
            .iter()
            .map(|(ty, count)| format!("{ty}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        let snippets: Vec<String> = archivable
            .iter()
            .take(5)
            .map(|m| {
                let mut snippet = m.content.chars().take(160).collect::<String>();
                if m.content.chars().count() > 160 {
                    snippet.push('…');
                }
                snippet
            })
            .collect();
        let content = format!(
            "Summarized {} memories older than {} days.\nBreakdown: {}\nExcerpts:\n{}",
            archivable.len(),
            older_than_days,
            breakdown,
            snippets
                .iter()
                .map(|s| format!("- {s}"))
                .collect::<Vec<_>>()
                .join("\n")
        );

        let summary = Memory::new(
            MemoryType::Summary,
            Tier::L2,
            content,
            BTreeSet::new(),
            Metadata::default(),
            None,
        );
        self.store(summary.clone()).await?;
        for m in &archivable {
            self.delete(&m.id).await?;
        }
        Ok(summary)
    }

    pub async fn get_last_seen(&self) -> Result<Option<i64>> {
        self.get_meta("last_seen").await
    }

    pub async fn update_last_seen(&self) -> Result<i64> {
        let now = now_ms();
        self.set_meta("last_seen", now).await?;
        Ok(now)
    }

    pub async fn get_memories_since(&self, epoch_ms: i64) -> Result<Vec<Memory>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id FROM memories WHERE created_at >= ? ORDER BY created_at DESC",
                libsql::params![epoch_ms],
            )
            .await
            .map_err(|e| Error::storage(Tier::L2, "get_memories_since", e.to_string()))?;
        let mut items = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| Error::storage(Tier::L2, "get_memories_since", e.to_string()))?
        {
            let id: String = row
                .get(0)
                .map_err(|e| Error::storage(Tier::L2, "get_memories_since", e.to_string()))?;
            if let Some(memory) = self.select_by_id(&id).await? {
                items.push(memory);
            }
        }
        Ok(items)
    }

    async fn get_meta(&self, key: &str) -> Result<Option<i64>> {
        let mut rows = self
            .conn
            .query(
                "SELECT value FROM project_meta WHERE key = ?",
                libsql::params![key.to_string()],
            )
            .await
            .map_err(|e| Error::storage(Tier::L2, "get_meta", e.to_string()))?;
        if let Some(row) = rows
            .next()
            .await
            .map_err(|e| Error::storage(Tier::L2, "get_meta", e.to_string()))?
        {
            let raw: String = row.get(0).map_err(|e| Error::storage(Tier::L2, "get_meta", e.to_string()))?;
            let value: i64 = raw
                .parse()
                .map_err(|_| Error::CorruptData(format!("non-numeric project_meta value for {key}")))?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    async fn set_meta(&self, key: &str, value: i64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.conn
            .execute(
                "INSERT INTO project_meta (key, value) VALUES (?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                libsql::params![key.to_string(), value.to_string()],
            )
            .await
            .map_err(|e| Error::storage(Tier::L2, "set_meta", e.to_string()))?;
        Ok(())
    }

    async fn replace_tags(&self, id: &str, tags: &BTreeSet<String>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.conn
            .execute(
                "DELETE FROM memory_tags WHERE memory_id = ?",
                libsql::params![id.to_string()],
            )
            .await
            .map_err(|e| Error::storage(Tier::L2, "replace_tags", e.to_string()))?;
        for tag in tags {
            self.conn
                .execute(
                    "INSERT INTO memory_tags (memory_id, tag) VALUES (?, ?)",
                    libsql::params![id.to_string(), tag.clone()],
                )
                .await
                .map_err(|e| Error::storage(Tier::L2, "replace_tags", e.to_string()))?;
        }
        Ok(())
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<Memory>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, type, content, metadata, created_at, updated_at, access_count, last_accessed_at, pinned
                 FROM memories WHERE id = ?",
                libsql::params![id.to_string()],
            )
            .await
            .map_err(|e| Error::storage(Tier::L2, "select_by_id", e.to_string()))?;
        let Some(row) = rows
            .next()
            .await
            .map_err(|e| Error::storage(Tier::L2, "select_by_id", e.to_string()))?
        else {
            return Ok(None);
        };
        let tags = self.select_tags(id).await?;
        Ok(Some(row_to_memory(&row, tags, Tier::L2)?))
    }

    async fn select_tags(&self, id: &str) -> Result<BTreeSet<String>> {
        let mut rows = self
            .conn
            .query(
                "SELECT tag FROM memory_tags WHERE memory_id = ?",
                libsql::params![id.to_string()],
            )
            .await
            .map_err(|e| Error::storage(Tier::L2, "select_tags", e.to_string()))?;
        let mut tags = BTreeSet::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| Error::storage(Tier::L2, "select_tags", e.to_string()))?
        {
            let tag: String = row.get(0).map_err(|e| Error::storage(Tier::L2, "select_tags", e.to_string()))?;
            tags.insert(tag);
        }
        Ok(tags)
    }
}

fn row_to_memory(row: &libsql::Row, tags: BTreeSet<String>, tier: Tier) -> Result<Memory> {
    let id: String = row.get(0).map_err(|e| Error::storage(tier, "row_to_memory", e.to_string()))?;
    let type_str: String = row.get(1).map_err(|e| Error::storage(tier, "row_to_memory", e.to_string()))?;
    let content: String = row.get(2).map_err(|e| Error::storage(tier, "row_to_memory", e.to_string()))?;
    let metadata_json: String = row.get(3).map_err(|e| Error::storage(tier, "row_to_memory", e.to_string()))?;
    let created_at: i64 = row.get(4).map_err(|e| Error::storage(tier, "row_to_memory", e.to_string()))?;
    let updated_at: i64 = row.get(5).map_err(|e| Error::storage(tier, "row_to_memory", e.to_string()))?;
    let access_count: i64 = row.get(6).map_err(|e| Error::storage(tier, "row_to_memory", e.to_string()))?;
    let last_accessed_at: Option<i64> = row.get(7).ok();
    let pinned: i64 = row.get(8).map_err(|e| Error::storage(tier, "row_to_memory", e.to_string()))?;

    let memory_type = type_str
        .parse::<MemoryType>()
        .map_err(Error::CorruptData)?;
    let metadata: Metadata = serde_json::from_str(&metadata_json)
        .map_err(|e| Error::CorruptData(format!("unparseable metadata for {id}: {e}")))?;

    Ok(Memory {
        id,
        memory_type,
        tier,
        content,
        tags,
        metadata,
        created_at,
        updated_at,
        access_count: access_count as u64,
        last_accessed_at,
        pinned: pinned != 0,
        ttl: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_temp() -> (ProjectTier, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let tier = ProjectTier::open(&dir.path().join("memory.db")).await.unwrap();
        (tier, dir)
    }

    #[tokio::test]
    async fn store_get_delete_roundtrip() {
        let (tier, _dir) = open_temp().await;
        let memory = Memory::new(
            MemoryType::Decision,
            Tier::L2,
            "Use Postgres for ACID".to_string(),
            BTreeSet::new(),
            Metadata::default(),
            None,
        );
        let stored = tier.store(memory.clone()).await.unwrap();
        let fetched = tier.get(&stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "Use Postgres for ACID");
        assert_eq!(fetched.access_count, 1);

        assert!(tier.delete(&stored.id).await.unwrap());
        assert!(tier.get(&stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bm25_empty_query_returns_no_rows() {
        let (tier, _dir) = open_temp().await;
        let results = tier.search_bm25("AND OR NOT").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn bm25_finds_stored_content() {
        let (tier, _dir) = open_temp().await;
        let memory = Memory::new(
            MemoryType::Documentation,
            Tier::L2,
            "refresh token rotation design".to_string(),
            BTreeSet::new(),
            Metadata::default(),
            None,
        );
        tier.store(memory).await.unwrap();
        let results = tier.search_bm25("token rotation").await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn summarize_archives_unpinned_and_spares_pinned() {
        let (tier, _dir) = open_temp().await;
        let mut old = Memory::new(
            MemoryType::Decision,
            Tier::L2,
            "old decision".to_string(),
            BTreeSet::new(),
            Metadata::default(),
            None,
        );
        old.created_at = now_ms() - 30 * 86_400_000;
        tier.store(old.clone()).await.unwrap();

        let mut pinned = Memory::new(
            MemoryType::Decision,
            Tier::L2,
            "pinned decision".to_string(),
            BTreeSet::new(),
            Metadata::default(),
            None,
        );
        pinned.created_at = now_ms() - 30 * 86_400_000;
        pinned.pinned = true;
        tier.store(pinned.clone()).await.unwrap();

        let summary = tier.summarize(7.0).await.unwrap();
        assert_eq!(summary.memory_type, MemoryType::Summary);
        assert!(tier.get(&old.id).await.unwrap().is_none());
        assert!(tier.get(&pinned.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn tags_survive_update() {
        let (tier, _dir) = open_temp().await;
        let memory = Memory::new(
            MemoryType::Decision,
            Tier::L2,
            "tagged".to_string(),
            ["alpha".to_string()].into(),
            Metadata::default(),
            None,
        );
        let stored = tier.store(memory).await.unwrap();
        let patch = MemoryPatch {
            tags: Some(["beta".to_string()].into()),
            ..Default::default()
        };
        let updated = tier.update(&stored.id, patch).await.unwrap();
        assert_eq!(updated.tags, ["beta".to_string()].into());
    }
}
