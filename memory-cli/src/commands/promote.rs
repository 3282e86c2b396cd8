use std::io::Write;

use clap::Args;
use memory_core::types::{Memory, Tier};
use memory_core::Engine;
use serde::Serialize;

use crate::errors::{helpers, EnhancedError};
use crate::output::{Output, OutputFormat};

#[derive(Args)]
pub struct PromoteArgs {
    id: String,

    /// The tier the memory currently lives in
    #[arg(long)]
    from: String,
}

#[derive(Serialize)]
struct PromoteOutput(Memory);

impl Output for PromoteOutput {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        writeln!(writer, "promoted {} into {}", self.0.id, self.0.tier)?;
        Ok(())
    }
}

pub async fn run(engine: &Engine, args: PromoteArgs, format: OutputFormat) -> anyhow::Result<()> {
    let from = args.from.parse::<Tier>().map_err(|e| anyhow::anyhow!(e))?;
    let memory = engine
        .promote(&args.id, from)
        .await
        .context_with_help(&format!("could not promote {}", args.id), helpers::MEMORY_NOT_FOUND_HELP)?;
    format.print(&PromoteOutput(memory))
}
