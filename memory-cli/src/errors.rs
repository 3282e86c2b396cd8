//! Helpful error context for common failure modes, attached at the edge so the
//! engine's own error taxonomy stays free of CLI-specific wording.

use anyhow::Result;

pub trait EnhancedError<T> {
    fn context_with_help(self, msg: &str, help: &[&str]) -> Result<T>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> EnhancedError<T> for Result<T, E> {
    fn context_with_help(self, msg: &str, help: &[&str]) -> Result<T> {
        self.map_err(|e| {
            let mut text = format!("{msg}\n\n{e}");
            if !help.is_empty() {
                text.push_str("\n\nPossible solutions:");
                for (i, h) in help.iter().enumerate() {
                    text.push_str(&format!("\n  {}. {h}", i + 1));
                }
            }
            anyhow::anyhow!(text)
        })
    }
}

pub mod helpers {
    pub const MEMORY_NOT_FOUND_HELP: &[&str] = &[
        "Check that the memory id is correct (use 'memory-cli list')",
        "The memory may have expired out of L1 or decayed out of L3",
    ];

    pub const CONFIG_ERROR_HELP: &[&str] = &[
        "Check the config file at ~/.context-fabric/config.yaml",
        "Run with --config to point at a different file",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_with_help_lists_solutions() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        let enhanced = result.context_with_help("lookup failed", &["try again", "check the id"]);
        let text = enhanced.unwrap_err().to_string();
        assert!(text.contains("Possible solutions:"));
        assert!(text.contains("1. try again"));
        assert!(text.contains("2. check the id"));
    }

    #[test]
    fn context_with_help_without_suggestions() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        let enhanced = result.context_with_help("lookup failed", &[]);
        let text = enhanced.unwrap_err().to_string();
        assert!(text.contains("lookup failed"));
        assert!(!text.contains("Possible solutions:"));
    }
}
