use std::io::Write;

use clap::Args;
use memory_core::orchestrator::protocol::{RecallFilter, RecallItem, RecallOptions};
use memory_core::types::Tier;
use memory_core::Engine;
use serde::Serialize;

use crate::output::{Output, OutputFormat};

#[derive(Args)]
pub struct RecallArgs {
    /// Query text, embedded and matched against all three tiers
    query: String,

    #[arg(long, default_value_t = 10)]
    limit: usize,

    #[arg(long, default_value_t = 0.0)]
    threshold: f32,

    /// Repeatable; restricts to these memory types (OR semantics)
    #[arg(long = "type")]
    types: Vec<String>,

    /// Repeatable; restricts to these tiers (OR semantics)
    #[arg(long)]
    layer: Vec<String>,

    /// Repeatable; restricts to memories carrying any of these tags
    #[arg(long)]
    tags: Vec<String>,
}

#[derive(Serialize)]
struct RecallOutput {
    items: Vec<RecallItem>,
}

impl Output for RecallOutput {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        for item in &self.items {
            writeln!(
                writer,
                "{:.3}  [{}] {}  {}",
                item.similarity,
                item.tier,
                item.memory.id,
                item.memory.content.chars().take(80).collect::<String>()
            )?;
        }
        writeln!(writer, "{} match(es)", self.items.len())?;
        Ok(())
    }
}

pub async fn run(engine: &Engine, args: RecallArgs, format: OutputFormat) -> anyhow::Result<()> {
    let types = args
        .types
        .into_iter()
        .map(|t| t.parse())
        .collect::<Result<Vec<_>, String>>()
        .map_err(|e| anyhow::anyhow!(e))?;
    let layers = args
        .layer
        .into_iter()
        .map(|t| t.parse::<Tier>())
        .collect::<Result<Vec<_>, String>>()
        .map_err(|e| anyhow::anyhow!(e))?;

    let options = RecallOptions {
        limit: args.limit,
        threshold: args.threshold,
        filter: RecallFilter { types, layers, tags: args.tags },
    };

    let items = engine.recall(&args.query, options).await?;
    format.print(&RecallOutput { items })
}
