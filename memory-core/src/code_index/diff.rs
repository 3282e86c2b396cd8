//! Incremental diff: classify each discovered file against the previously stored
//! (mtime, hash) to decide how much reindexing it needs (spec §4.6).

use std::collections::HashMap;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::config::CodeIndexConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStatus {
    New,
    Touched,
    Changed,
    Deleted,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct FileDiff {
    pub path: String,
    pub status: DiffStatus,
    pub mtime_ms: i64,
    pub size_bytes: u64,
    pub content_hash: String,
}

/// Previously stored (mtime, hash) for one file, as tracked in the index store.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub mtime_ms: i64,
    pub content_hash: String,
}

/// Classify every currently-discovered file against `stored`, plus emit a
/// `Deleted` diff for any stored path absent from disk. Files over the size
/// cap or with a null byte in their first 8 KiB are skipped entirely (treated
/// as non-indexable, not reported as any status).
pub fn diff_files(
    discovered: &[std::path::PathBuf],
    root: &Path,
    stored: &HashMap<String, StoredRecord>,
    config: &CodeIndexConfig,
) -> Vec<FileDiff> {
    let mut diffs = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for path in discovered {
        let Ok(relative) = path.strip_prefix(root) else { continue };
        let rel_str = relative.to_string_lossy().replace('\\', "/");
        seen.insert(rel_str.clone());

        let Ok(meta) = std::fs::metadata(path) else { continue };
        if meta.len() > config.max_file_size_bytes {
            continue;
        }
        let Ok(bytes) = std::fs::read(path) else { continue };
        if is_binary(&bytes) {
            continue;
        }
        let mtime_ms = mtime_millis(&meta);

        let status = match stored.get(&rel_str) {
            None => DiffStatus::New,
            Some(record) if record.mtime_ms == mtime_ms => DiffStatus::Unchanged,
            Some(record) => {
                let hash = hash_bytes(&bytes);
                if hash == record.content_hash {
                    DiffStatus::Touched
                } else {
                    DiffStatus::Changed
                }
            }
        };
        let content_hash = match status {
            DiffStatus::Unchanged => stored.get(&rel_str).map(|r| r.content_hash.clone()).unwrap_or_default(),
            _ => hash_bytes(&bytes),
        };

        diffs.push(FileDiff {
            path: rel_str,
            status,
            mtime_ms,
            size_bytes: meta.len(),
            content_hash,
        });
    }

    for path in stored.keys() {
        if !seen.contains(path) {
            diffs.push(FileDiff {
                path: path.clone(),
                status: DiffStatus::Deleted,
                mtime_ms: 0,
                size_bytes: 0,
                content_hash: String::new(),
            });
        }
    }
    diffs
}

fn is_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(8192).any(|&b| b == 0)
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn mtime_millis(meta: &std::fs::Metadata) -> i64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_file_with_no_stored_record() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn a() {}").unwrap();
        let discovered = vec![dir.path().join("a.rs")];
        let diffs = diff_files(&discovered, dir.path(), &HashMap::new(), &CodeIndexConfig::default());
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].status, DiffStatus::New);
    }

    #[test]
    fn unchanged_mtime_skips_rehash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.rs");
        std::fs::write(&path, "fn a() {}").unwrap();
        let meta = std::fs::metadata(&path).unwrap();
        let mtime = mtime_millis(&meta);

        let mut stored = HashMap::new();
        stored.insert("a.rs".to_string(), StoredRecord { mtime_ms: mtime, content_hash: "whatever".to_string() });

        let diffs = diff_files(&[path], dir.path(), &stored, &CodeIndexConfig::default());
        assert_eq!(diffs[0].status, DiffStatus::Unchanged);
    }

    #[test]
    fn deleted_file_reported_when_missing_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut stored = HashMap::new();
        stored.insert("gone.rs".to_string(), StoredRecord { mtime_ms: 1, content_hash: "x".to_string() });
        let diffs = diff_files(&[], dir.path(), &stored, &CodeIndexConfig::default());
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].status, DiffStatus::Deleted);
    }

    #[test]
    fn binary_content_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.rs");
        std::fs::write(&path, [0u8, 1, 2, 3]).unwrap();
        let diffs = diff_files(&[path], dir.path(), &HashMap::new(), &CodeIndexConfig::default());
        assert!(diffs.is_empty());
    }
}
