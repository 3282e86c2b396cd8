use std::io::Write;

use clap::Args;
use memory_core::orchestrator::protocol::{UpdateOptions, UpdateResult};
use memory_core::types::Tier;
use memory_core::Engine;

use crate::errors::{helpers, EnhancedError};
use crate::output::{Output, OutputFormat};

#[derive(Args)]
pub struct UpdateArgs {
    id: String,

    #[arg(long)]
    content: Option<String>,

    /// Replaces the memory's tags entirely when given
    #[arg(long)]
    tags: Option<Vec<String>>,

    #[arg(long)]
    pinned: Option<bool>,

    /// 1-5; patched without disturbing other metadata fields
    #[arg(long)]
    weight: Option<u8>,

    /// Outranking the memory's current tier promotes it instead of patching in place
    #[arg(long)]
    target_layer: Option<String>,
}

impl Output for UpdateResult {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        match self {
            UpdateResult::Updated(memory) => writeln!(writer, "updated {} in {}", memory.id, memory.tier)?,
            UpdateResult::Promoted { memory, from, to } => writeln!(writer, "promoted {} from {from} to {to}", memory.id)?,
        }
        Ok(())
    }
}

pub async fn run(engine: &Engine, args: UpdateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let target_layer = args.target_layer.map(|t| t.parse::<Tier>()).transpose().map_err(|e| anyhow::anyhow!(e))?;

    let options = UpdateOptions {
        content: args.content,
        tags: args.tags.map(super::tag_set),
        metadata: None,
        pinned: args.pinned,
        weight: args.weight,
        target_layer,
    };

    let result = engine
        .update(&args.id, options)
        .await
        .context_with_help(&format!("could not update {}", args.id), helpers::MEMORY_NOT_FOUND_HELP)?;
    format.print(&result)
}
