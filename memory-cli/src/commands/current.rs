use std::io::Write;

use clap::Args;
use memory_core::orchestrator::protocol::{ContextWindow, GetCurrentOptions};
use memory_core::Engine;

use crate::output::{Output, OutputFormat};

#[derive(Args)]
pub struct CurrentArgs {
    #[arg(long)]
    session_id: String,

    #[arg(long)]
    current_file: Option<String>,

    #[arg(long)]
    project_path: Option<String>,
}

impl Output for ContextWindow {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        writeln!(writer, "{} working memories", self.working_memories.len())?;
        for memory in &self.working_memories {
            writeln!(writer, "  {} {}", memory.id, memory.content.chars().take(60).collect::<String>())?;
        }
        writeln!(writer, "{} relevant memories", self.relevant_memories.len())?;
        writeln!(writer, "{} patterns", self.patterns.len())?;
        Ok(())
    }
}

pub async fn run(engine: &Engine, args: CurrentArgs, format: OutputFormat) -> anyhow::Result<()> {
    let options =
        GetCurrentOptions { session_id: args.session_id, current_file: args.current_file, project_path: args.project_path };
    let result = engine.get_current(options).await?;
    format.print(&result)
}
