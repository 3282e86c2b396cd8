//! Per-project code index: discovery, incremental diffing, symbol extraction,
//! chunking, and the three search modes, all backed by one `libsql` file at
//! `<project>/.context-fabric/code-index.db` (spec §4.6).

pub mod chunking;
pub mod diff;
pub mod discovery;
pub mod glob;
pub mod search;
pub mod symbols;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use libsql::{Builder, Connection, Database};

use crate::config::CodeIndexConfig;
use crate::embeddings::EmbeddingService;
use crate::error::{Error, Result};
use crate::types::{Chunk, Symbol, SymbolKind};

use diff::{diff_files, DiffStatus, FileDiff, StoredRecord};
use search::{SearchFilters, SemanticMatch, TextMatch};
use symbols::{extract_symbols, LanguageFamily};

const SCHEMA: &[&str] = &[
    "PRAGMA journal_mode=WAL",
    r#"CREATE TABLE IF NOT EXISTS indexed_files (
        path TEXT PRIMARY KEY,
        mtime_ms INTEGER NOT NULL,
        size_bytes INTEGER NOT NULL,
        language TEXT NOT NULL,
        content_hash TEXT NOT NULL,
        indexed_at INTEGER NOT NULL,
        chunk_count INTEGER NOT NULL DEFAULT 0
    )"#,
    r#"CREATE TABLE IF NOT EXISTS symbols (
        file_path TEXT NOT NULL,
        name TEXT NOT NULL,
        kind TEXT NOT NULL,
        line_start INTEGER NOT NULL,
        line_end INTEGER,
        signature TEXT,
        doc_comment TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS chunks (
        file_path TEXT NOT NULL,
        chunk_index INTEGER NOT NULL,
        line_start INTEGER NOT NULL,
        line_end INTEGER NOT NULL,
        content TEXT NOT NULL,
        embedding BLOB,
        PRIMARY KEY (file_path, chunk_index)
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_symbols_file ON symbols(file_path)",
    "CREATE INDEX IF NOT EXISTS idx_chunks_file ON chunks(file_path)",
];

/// Result of an `incremental_update` pass (spec §8: "two consecutive calls on an
/// unchanged tree produce identical status").
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IndexStatus {
    pub total_files: usize,
    pub total_symbols: usize,
    pub total_chunks: usize,
    pub new: usize,
    pub touched: usize,
    pub changed: usize,
    pub deleted: usize,
}

pub struct CodeIndex {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    root: PathBuf,
    config: CodeIndexConfig,
}

impl CodeIndex {
    pub async fn open(db_path: &Path, root: &Path, config: CodeIndexConfig) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
        let db = Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| Error::ValidationError(format!("code index open failed: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| Error::ValidationError(format!("code index connect failed: {e}")))?;
        for stmt in SCHEMA {
            conn.query(stmt, ())
                .await
                .map_err(|e| Error::ValidationError(format!("code index migrate failed: {e}")))?;
        }
        Ok(Self {
            db,
            conn,
            root: root.to_path_buf(),
            config,
        })
    }

    /// Discover, diff against stored state, and reindex everything that changed.
    /// Processes new/changed files in batches of 20 with a cooperative yield
    /// between batches (spec §4.6, §5).
    pub async fn incremental_update(&self, embedding_svc: &EmbeddingService) -> Result<IndexStatus> {
        let discovered = discovery::discover_files(&self.root, &self.config).await;
        let stored = self.load_stored_records().await?;
        let diffs = diff_files(&discovered, &self.root, &stored, &self.config);

        let mut status = IndexStatus::default();
        let reindexable: Vec<&FileDiff> = diffs
            .iter()
            .filter(|d| matches!(d.status, DiffStatus::New | DiffStatus::Changed))
            .collect();

        for batch in reindexable.chunks(20) {
            for file_diff in batch {
                self.reindex_file(file_diff, embedding_svc).await?;
                match file_diff.status {
                    DiffStatus::New => status.new += 1,
                    DiffStatus::Changed => status.changed += 1,
                    _ => unreachable!(),
                }
            }
            tokio::task::yield_now().await;
        }

        for file_diff in diffs.iter().filter(|d| d.status == DiffStatus::Touched) {
            self.touch_mtime(&file_diff.path, file_diff.mtime_ms).await?;
            status.touched += 1;
        }
        for file_diff in diffs.iter().filter(|d| d.status == DiffStatus::Deleted) {
            self.remove_file(&file_diff.path).await?;
            status.deleted += 1;
        }

        status.total_files = self.count_files().await?;
        status.total_symbols = self.count_symbols().await?;
        status.total_chunks = self.count_chunks().await?;
        Ok(status)
    }

    async fn reindex_file(&self, file_diff: &FileDiff, embedding_svc: &EmbeddingService) -> Result<()> {
        let full_path = self.root.join(&file_diff.path);
        let content = tokio::fs::read_to_string(&full_path)
            .await
            .map_err(Error::Io)?;
        let ext = Path::new(&file_diff.path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let language = ext.to_string();
        let family = LanguageFamily::from_extension(ext);

        let extracted_symbols = family
            .map(|f| extract_symbols(&file_diff.path, &content, f))
            .unwrap_or_default();
        let mut chunks = chunking::chunk_file(&file_diff.path, &content, self.config.chunk_lines, self.config.chunk_overlap, &extracted_symbols);
        for chunk in &mut chunks {
            if let Ok(vector) = embedding_svc.embed(&chunk.content) {
                chunk.embedding = Some(vector);
            }
        }

        self.remove_file(&file_diff.path).await?;
        self.conn
            .execute(
                "INSERT INTO indexed_files (path, mtime_ms, size_bytes, language, content_hash, indexed_at, chunk_count)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                libsql::params![
                    file_diff.path.clone(),
                    file_diff.mtime_ms,
                    file_diff.size_bytes as i64,
                    language,
                    file_diff.content_hash.clone(),
                    crate::types::now_ms(),
                    chunks.len() as i64,
                ],
            )
            .await
            .map_err(|e| Error::ValidationError(format!("code index store failed: {e}")))?;

        for symbol in &extracted_symbols {
            self.conn
                .execute(
                    "INSERT INTO symbols (file_path, name, kind, line_start, line_end, signature, doc_comment) VALUES (?, ?, ?, ?, ?, ?, ?)",
                    libsql::params![
                        symbol.file_path.clone(),
                        symbol.name.clone(),
                        symbol.kind.as_str(),
                        symbol.line_start,
                        symbol.line_end,
                        symbol.signature.clone(),
                        symbol.doc_comment.clone(),
                    ],
                )
                .await
                .map_err(|e| Error::ValidationError(format!("code index symbol store failed: {e}")))?;
        }

        for chunk in &chunks {
            let embedding_blob = chunk.embedding.as_ref().map(|v| encode_embedding(v));
            self.conn
                .execute(
                    "INSERT INTO chunks (file_path, chunk_index, line_start, line_end, content, embedding) VALUES (?, ?, ?, ?, ?, ?)",
                    libsql::params![
                        chunk.file_path.clone(),
                        chunk.chunk_index,
                        chunk.line_start,
                        chunk.line_end,
                        chunk.content.clone(),
                        embedding_blob,
                    ],
                )
                .await
                .map_err(|e| Error::ValidationError(format!("code index chunk store failed: {e}")))?;
        }
        Ok(())
    }

    async fn touch_mtime(&self, path: &str, mtime_ms: i64) -> Result<()> {
        self.conn
            .execute(
                "UPDATE indexed_files SET mtime_ms = ? WHERE path = ?",
                libsql::params![mtime_ms, path.to_string()],
            )
            .await
            .map_err(|e| Error::ValidationError(format!("code index touch failed: {e}")))?;
        Ok(())
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM indexed_files WHERE path = ?", libsql::params![path.to_string()])
            .await
            .map_err(|e| Error::ValidationError(format!("code index remove failed: {e}")))?;
        self.conn
            .execute("DELETE FROM symbols WHERE file_path = ?", libsql::params![path.to_string()])
            .await
            .map_err(|e| Error::ValidationError(format!("code index remove failed: {e}")))?;
        self.conn
            .execute("DELETE FROM chunks WHERE file_path = ?", libsql::params![path.to_string()])
            .await
            .map_err(|e| Error::ValidationError(format!("code index remove failed: {e}")))?;
        Ok(())
    }

    async fn load_stored_records(&self) -> Result<HashMap<String, StoredRecord>> {
        let mut rows = self
            .conn
            .query("SELECT path, mtime_ms, content_hash FROM indexed_files", ())
            .await
            .map_err(|e| Error::ValidationError(format!("code index load failed: {e}")))?;
        let mut out = HashMap::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| Error::ValidationError(format!("code index load failed: {e}")))?
        {
            let path: String = row.get(0).map_err(|e| Error::ValidationError(e.to_string()))?;
            let mtime_ms: i64 = row.get(1).map_err(|e| Error::ValidationError(e.to_string()))?;
            let content_hash: String = row.get(2).map_err(|e| Error::ValidationError(e.to_string()))?;
            out.insert(path, StoredRecord { mtime_ms, content_hash });
        }
        Ok(out)
    }

    async fn count_files(&self) -> Result<usize> {
        self.scalar_count("SELECT COUNT(*) FROM indexed_files").await
    }

    async fn count_symbols(&self) -> Result<usize> {
        self.scalar_count("SELECT COUNT(*) FROM symbols").await
    }

    async fn count_chunks(&self) -> Result<usize> {
        self.scalar_count("SELECT COUNT(*) FROM chunks").await
    }

    async fn scalar_count(&self, sql: &str) -> Result<usize> {
        let mut rows = self
            .conn
            .query(sql, ())
            .await
            .map_err(|e| Error::ValidationError(e.to_string()))?;
        let row = rows.next().await.map_err(|e| Error::ValidationError(e.to_string()))?;
        let count: i64 = row
            .map(|r| r.get(0))
            .transpose()
            .map_err(|e: libsql::Error| Error::ValidationError(e.to_string()))?
            .unwrap_or(0);
        Ok(count as usize)
    }

    pub async fn search_text(&self, query: &str, filters: &SearchFilters<'_>) -> Result<Vec<TextMatch>> {
        let chunks = self.all_chunks_with_language().await?;
        Ok(search::search_text(chunks.iter().map(|(c, l)| (c, l.as_str())), query, filters))
    }

    pub async fn search_symbol(&self, query: &str, filters: &SearchFilters<'_>) -> Result<Vec<Symbol>> {
        let symbols = self.all_symbols().await?;
        Ok(search::search_symbol(&symbols, query, filters))
    }

    pub async fn search_semantic(
        &self,
        query: &str,
        threshold: f32,
        filters: &SearchFilters<'_>,
        embedding_svc: &EmbeddingService,
    ) -> Result<Vec<SemanticMatch>> {
        let query_vector = embedding_svc.embed(query)?;
        let chunks = self.all_chunks_with_language().await?;
        Ok(search::search_semantic(
            chunks.iter().map(|(c, l)| (c, l.as_str())),
            &query_vector,
            threshold,
            filters,
        ))
    }

    async fn all_chunks_with_language(&self) -> Result<Vec<(Chunk, String)>> {
        let mut rows = self
            .conn
            .query(
                "SELECT c.file_path, c.chunk_index, c.line_start, c.line_end, c.content, c.embedding, f.language
                 FROM chunks c JOIN indexed_files f ON c.file_path = f.path",
                (),
            )
            .await
            .map_err(|e| Error::ValidationError(e.to_string()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| Error::ValidationError(e.to_string()))? {
            let file_path: String = row.get(0).map_err(|e| Error::ValidationError(e.to_string()))?;
            let chunk_index: i64 = row.get(1).map_err(|e| Error::ValidationError(e.to_string()))?;
            let line_start: i64 = row.get(2).map_err(|e| Error::ValidationError(e.to_string()))?;
            let line_end: i64 = row.get(3).map_err(|e| Error::ValidationError(e.to_string()))?;
            let content: String = row.get(4).map_err(|e| Error::ValidationError(e.to_string()))?;
            let embedding_blob: Option<Vec<u8>> = row.get(5).ok();
            let language: String = row.get(6).map_err(|e| Error::ValidationError(e.to_string()))?;
            out.push((
                Chunk {
                    file_path,
                    chunk_index: chunk_index as u32,
                    line_start: line_start as u32,
                    line_end: line_end as u32,
                    content,
                    embedding: embedding_blob.and_then(|b| decode_embedding(&b)),
                },
                language,
            ));
        }
        Ok(out)
    }

    async fn all_symbols(&self) -> Result<Vec<Symbol>> {
        let mut rows = self
            .conn
            .query("SELECT file_path, name, kind, line_start, line_end, signature, doc_comment FROM symbols", ())
            .await
            .map_err(|e| Error::ValidationError(e.to_string()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| Error::ValidationError(e.to_string()))? {
            let file_path: String = row.get(0).map_err(|e| Error::ValidationError(e.to_string()))?;
            let name: String = row.get(1).map_err(|e| Error::ValidationError(e.to_string()))?;
            let kind_str: String = row.get(2).map_err(|e| Error::ValidationError(e.to_string()))?;
            let line_start: i64 = row.get(3).map_err(|e| Error::ValidationError(e.to_string()))?;
            let line_end: Option<i64> = row.get(4).ok();
            let signature: Option<String> = row.get(5).ok();
            let doc_comment: Option<String> = row.get(6).ok();
            let kind: SymbolKind = kind_str.parse().unwrap_or(SymbolKind::Function);
            out.push(Symbol {
                file_path,
                name,
                kind,
                line_start: line_start as u32,
                line_end: line_end.map(|v| v as u32),
                signature,
                doc_comment,
            });
        }
        Ok(out)
    }
}

fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(blob: &[u8]) -> Option<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return None;
    }
    Some(blob.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_temp() -> (CodeIndex, EmbeddingService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = CodeIndexConfig::default();
        let index = CodeIndex::open(&dir.path().join(".context-fabric/code-index.db"), dir.path(), config)
            .await
            .unwrap();
        (index, EmbeddingService::new(32), dir)
    }

    #[tokio::test]
    async fn incremental_update_counts_new_files() {
        let (index, svc, dir) = open_temp().await;
        std::fs::write(dir.path().join("a.ts"), "export function a() {}").unwrap();
        std::fs::write(dir.path().join("b.ts"), "export function b() {}").unwrap();

        let status = index.incremental_update(&svc).await.unwrap();
        assert_eq!(status.total_files, 2);
        assert_eq!(status.new, 2);
    }

    #[tokio::test]
    async fn repeated_update_on_unchanged_tree_is_idempotent() {
        let (index, svc, dir) = open_temp().await;
        std::fs::write(dir.path().join("a.ts"), "export function a() {}").unwrap();
        let first = index.incremental_update(&svc).await.unwrap();
        let second = index.incremental_update(&svc).await.unwrap();
        assert_eq!(first.total_files, second.total_files);
        assert_eq!(first.total_symbols, second.total_symbols);
        assert_eq!(first.total_chunks, second.total_chunks);
        assert_eq!(second.new, 0);
    }

    #[tokio::test]
    async fn deleted_file_drops_from_total() {
        let (index, svc, dir) = open_temp().await;
        let b_path = dir.path().join("b.ts");
        std::fs::write(dir.path().join("a.ts"), "export function a() {}").unwrap();
        std::fs::write(&b_path, "export function b() {}").unwrap();
        index.incremental_update(&svc).await.unwrap();

        std::fs::remove_file(&b_path).unwrap();
        let status = index.incremental_update(&svc).await.unwrap();
        assert_eq!(status.total_files, 1);
        assert_eq!(status.deleted, 1);
    }

    #[tokio::test]
    async fn search_text_finds_stored_chunk() {
        let (index, svc, dir) = open_temp().await;
        std::fs::write(dir.path().join("a.ts"), "export function routeDecision() {}").unwrap();
        index.incremental_update(&svc).await.unwrap();

        let results = index.search_text("routeDecision", &SearchFilters::default()).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn search_symbol_finds_extracted_function() {
        let (index, svc, dir) = open_temp().await;
        std::fs::write(dir.path().join("a.ts"), "export function handleStore() {}").unwrap();
        index.incremental_update(&svc).await.unwrap();

        let results = index.search_symbol("handleStore", &SearchFilters::default()).await.unwrap();
        assert_eq!(results.len(), 1);
    }
}
