//! Config file resolution: an explicit `--config` path, or the engine's own
//! default (`~/.context-fabric/config.yaml`), falling back to built-in defaults
//! when neither exists.

use std::path::Path;

use memory_core::Config;

use crate::errors::{helpers, EnhancedError};

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let resolved = match path {
        Some(p) => p.to_path_buf(),
        None => Config::default_config_path(),
    };
    Config::load(&resolved).context_with_help(&format!("failed to load config from {}", resolved.display()), helpers::CONFIG_ERROR_HELP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_explicit_path_falls_back_to_defaults() {
        let config = load_config(Some(Path::new("/nonexistent/context-fabric/config.yaml"))).unwrap();
        assert_eq!(config.ttl.l1_default, 3600);
    }

    #[test]
    fn explicit_path_is_read_over_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "ttl:\n  l1_default: 60\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.ttl.l1_default, 60);
    }
}
