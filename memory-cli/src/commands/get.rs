use std::io::Write;

use clap::Args;
use memory_core::orchestrator::protocol::GetResult;
use memory_core::Engine;

use crate::errors::{helpers, EnhancedError};
use crate::output::{Output, OutputFormat};

#[derive(Args)]
pub struct GetArgs {
    /// Memory id
    id: String,
}

impl GetArgs {
    pub(crate) fn id(&self) -> &str {
        &self.id
    }
}

impl Output for GetResult {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        writeln!(writer, "[{}] {} ({})", self.tier, self.memory.id, self.memory.memory_type)?;
        writeln!(writer, "{}", self.memory.content)?;
        if !self.memory.tags.is_empty() {
            writeln!(writer, "tags: {}", self.memory.tags.iter().cloned().collect::<Vec<_>>().join(", "))?;
        }
        Ok(())
    }
}

pub async fn run(engine: &Engine, args: GetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let result = engine.get(&args.id).await.context_with_help(&format!("memory not found: {}", args.id), helpers::MEMORY_NOT_FOUND_HELP)?;
    format.print(&result)
}
