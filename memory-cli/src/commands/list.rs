use std::io::Write;

use clap::Args;
use memory_core::orchestrator::protocol::{ListOptions, ListResult};
use memory_core::types::Tier;
use memory_core::Engine;

use crate::output::{Output, OutputFormat};

#[derive(Args)]
pub struct ListArgs {
    /// Defaults to L2 when omitted
    #[arg(long)]
    tier: Option<String>,

    #[arg(long = "type")]
    memory_type: Option<String>,

    /// Repeatable; ANDed against the memory's tag set
    #[arg(long)]
    tags: Vec<String>,

    #[arg(long, default_value_t = 20)]
    limit: usize,

    #[arg(long, default_value_t = 0)]
    offset: usize,
}

impl Output for ListResult {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        for memory in &self.items {
            writeln!(writer, "[{}] {} {}", memory.tier, memory.id, memory.content.chars().take(80).collect::<String>())?;
        }
        writeln!(writer, "{} of {} total", self.items.len(), self.total)?;
        Ok(())
    }
}

pub async fn run(engine: &Engine, args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let tier = args.tier.map(|t| t.parse::<Tier>()).transpose().map_err(|e| anyhow::anyhow!(e))?;
    let memory_type = args.memory_type.map(|t| t.parse()).transpose().map_err(|e: String| anyhow::anyhow!(e))?;

    let options = ListOptions { tier, memory_type, tags: args.tags, limit: Some(args.limit), offset: Some(args.offset) };

    let result = engine.list(options).await?;
    format.print(&result)
}
