use std::io::Write;

use clap::Args;
use memory_core::orchestrator::protocol::{StoreOptions, StoreResult};
use memory_core::types::{Metadata, Tier};
use memory_core::Engine;

use crate::output::{Output, OutputFormat};

#[derive(Args)]
pub struct StoreArgs {
    /// The memory's content
    content: String,

    /// One of the recognized memory types (e.g. decision, bug_fix, scratchpad)
    #[arg(long = "type")]
    memory_type: String,

    /// Repeatable; tags the router inspects for temp/global/project hints
    #[arg(long)]
    tags: Vec<String>,

    /// Seconds; positive values route to L1 regardless of tags (spec router rule)
    #[arg(long)]
    ttl: Option<u64>,

    #[arg(long)]
    pinned: bool,

    /// 1-5, default 3; scales recall similarity
    #[arg(long)]
    weight: Option<u8>,

    /// Force a tier, bypassing the router entirely
    #[arg(long)]
    tier: Option<String>,

    /// Feeds the router's generic-code heuristic when set
    #[arg(long)]
    session_hint: bool,
}

impl Output for StoreResult {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        writeln!(writer, "stored {} in {} ({}, confidence {:.2})", self.id, self.tier, self.reason, self.confidence)?;
        Ok(())
    }
}

pub async fn run(engine: &Engine, args: StoreArgs, format: OutputFormat) -> anyhow::Result<()> {
    let memory_type = args.memory_type.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let forced_tier = args.tier.map(|t| t.parse::<Tier>()).transpose().map_err(|e| anyhow::anyhow!(e))?;

    let mut metadata = Metadata::default();
    if let Some(weight) = args.weight {
        metadata.weight = weight;
    }

    let options = StoreOptions {
        forced_tier,
        tags: super::tag_set(args.tags),
        ttl: args.ttl,
        pinned: args.pinned,
        metadata,
        session_hint: args.session_hint,
    };

    let result = engine.store(args.content, memory_type, options).await?;
    format.print(&result)
}
