use std::io::Write;

use memory_core::orchestrator::protocol::DeleteResult;
use memory_core::Engine;

use crate::errors::{helpers, EnhancedError};
use crate::output::{Output, OutputFormat};

use super::get::GetArgs;

impl Output for DeleteResult {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        writeln!(writer, "deleted from {}", self.deleted_from)?;
        Ok(())
    }
}

pub async fn run(engine: &Engine, args: GetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let id = args.id();
    let result = engine.delete(id).await.context_with_help(&format!("memory not found: {id}"), helpers::MEMORY_NOT_FOUND_HELP)?;
    format.print(&result)
}
