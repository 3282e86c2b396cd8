//! File discovery for a project's code index: VCS listing first, directory walk
//! as a fallback (spec §4.6).

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::config::CodeIndexConfig;
use crate::code_index::symbols::LanguageFamily;

const CONTENT_ONLY_EXTENSIONS: &[&str] = &["md", "json", "yaml", "yml", "toml", "sql", "html", "css", "sh", "bash"];

/// Whether `ext` is one of the indexable extensions: the ~8 symbol-bearing
/// families plus the content-only set (spec §4.8).
#[must_use]
pub fn is_indexable_extension(ext: &str) -> bool {
    LanguageFamily::from_extension(ext).is_some() || CONTENT_ONLY_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// Discover candidate files under `root`, capped at `config.max_files`. Tries
/// `git ls-files` first; falls back to a recursive walk skipping the configured
/// ignore list on any failure (not a git repo, git not installed, …).
pub async fn discover_files(root: &Path, config: &CodeIndexConfig) -> Vec<PathBuf> {
    let mut files = match list_vcs_files(root).await {
        Some(files) => files,
        None => walk_directory(root, &config.exclude_patterns),
    };
    files.retain(|p| {
        p.extension()
            .and_then(|e| e.to_str())
            .is_some_and(is_indexable_extension)
    });
    files.truncate(config.max_files);
    files
}

async fn list_vcs_files(root: &Path) -> Option<Vec<PathBuf>> {
    let output = Command::new("git")
        .arg("ls-files")
        .current_dir(root)
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.lines().map(|line| root.join(line)).collect())
}

fn walk_directory(root: &Path, exclude: &[String]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else { continue };
        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if exclude.iter().any(|pattern| pattern == name.as_ref()) {
                continue;
            }
            if path.is_dir() {
                stack.push(path);
            } else {
                out.push(path);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_symbol_bearing_and_content_only_extensions() {
        assert!(is_indexable_extension("rs"));
        assert!(is_indexable_extension("yaml"));
        assert!(!is_indexable_extension("png"));
    }

    #[tokio::test]
    async fn walk_skips_excluded_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        std::fs::write(dir.path().join("node_modules/skip.rs"), "fn x() {}").unwrap();
        std::fs::write(dir.path().join("keep.rs"), "fn y() {}").unwrap();

        let files = walk_directory(dir.path(), &["node_modules".to_string()]);
        assert!(files.iter().any(|p| p.ends_with("keep.rs")));
        assert!(!files.iter().any(|p| p.to_string_lossy().contains("node_modules")));
    }
}
