use std::io::Write;

use clap::Args;
use memory_core::orchestrator::protocol::SummarizeResult;
use memory_core::types::Tier;
use memory_core::Engine;

use crate::output::{Output, OutputFormat};

#[derive(Args)]
pub struct SummarizeArgs {
    #[arg(long)]
    tier: String,

    #[arg(long)]
    older_than_days: f64,
}

impl Output for SummarizeResult {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        writeln!(writer, "summarized {} memories into {}", self.count, self.summary_id)?;
        writeln!(writer, "{}", self.content)?;
        Ok(())
    }
}

pub async fn run(engine: &Engine, args: SummarizeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let tier = args.tier.parse::<Tier>().map_err(|e| anyhow::anyhow!(e))?;
    let result = engine.summarize(tier, args.older_than_days).await?;
    format.print(&result)
}
