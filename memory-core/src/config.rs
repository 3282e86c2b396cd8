//! Recognized configuration options (spec §6), loaded from `~/.context-fabric/config.yaml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub l2_path: Option<PathBuf>,
    pub l3_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            l2_path: None,
            l3_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtlConfig {
    pub l1_default: u64,
    pub l3_decay_days: f64,
    pub l3_decay_threshold: f64,
    pub l3_access_threshold: u32,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            l1_default: 3600,
            l3_decay_days: 14.0,
            l3_decay_threshold: 0.2,
            l3_access_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "local-deterministic".to_string(),
            dimension: 384,
            batch_size: 32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub max_working_memories: usize,
    pub max_relevant_memories: usize,
    pub max_patterns: usize,
    pub max_suggestions: usize,
    pub max_ghost_messages: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_working_memories: 20,
            max_relevant_memories: 10,
            max_patterns: 5,
            max_suggestions: 5,
            max_ghost_messages: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeIndexConfig {
    pub enabled: bool,
    pub max_file_size_bytes: u64,
    pub max_files: usize,
    pub chunk_lines: u32,
    pub chunk_overlap: u32,
    pub debounce_ms: u64,
    pub watch_enabled: bool,
    pub exclude_patterns: Vec<String>,
}

impl Default for CodeIndexConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_file_size_bytes: 1024 * 1024,
            max_files: 10_000,
            chunk_lines: 150,
            chunk_overlap: 10,
            debounce_ms: 500,
            watch_enabled: false,
            exclude_patterns: vec![
                ".git".into(),
                "node_modules".into(),
                "dist".into(),
                "build".into(),
                "target".into(),
                ".venv".into(),
                "venv".into(),
                "__pycache__".into(),
                ".next".into(),
                ".nuxt".into(),
                "coverage".into(),
                ".cache".into(),
                ".context-fabric".into(),
                ".tox".into(),
                ".mypy_cache".into(),
            ],
        }
    }
}

/// Top-level engine configuration, matching the recognized options in spec §6.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub ttl: TtlConfig,
    pub embedding: EmbeddingConfig,
    pub context: ContextConfig,
    #[serde(rename = "codeIndex")]
    pub code_index: CodeIndexConfig,
}

impl Config {
    /// Load configuration from a YAML file, falling back to defaults for anything
    /// absent and for a missing file entirely.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&raw)
            .map_err(|e| crate::error::Error::ValidationError(format!("invalid config: {e}")))?;
        Ok(config)
    }

    /// The default home directory for global state (`~/.context-fabric/`), overridable
    /// for container deployments by setting `CONTEXT_FABRIC_HOME`.
    #[must_use]
    pub fn home_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("CONTEXT_FABRIC_HOME") {
            return PathBuf::from(dir);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".context-fabric")
    }

    #[must_use]
    pub fn default_config_path() -> PathBuf {
        Self::home_dir().join("config.yaml")
    }

    #[must_use]
    pub fn l3_path(&self) -> PathBuf {
        self.storage
            .l3_path
            .clone()
            .unwrap_or_else(|| Self::home_dir().join("semantic.db"))
    }

    #[must_use]
    pub fn l2_path(&self, project_path: &Path) -> PathBuf {
        self.storage
            .l2_path
            .clone()
            .unwrap_or_else(|| project_path.join(".context-fabric").join("memory.db"))
    }

    #[must_use]
    pub fn code_index_path(&self, project_path: &Path) -> PathBuf {
        project_path.join(".context-fabric").join("code-index.db")
    }
}
