use std::io::Write;

use clap::Args;
use memory_core::orchestrator::protocol::{OrientOptions, OrientResult};
use memory_core::Engine;

use crate::output::{Output, OutputFormat};

#[derive(Args)]
pub struct OrientArgs {
    /// IANA timezone name used to phrase the time-of-day portion of the summary
    #[arg(long)]
    timezone: Option<String>,
}

impl Output for OrientResult {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        writeln!(writer, "{}", self.summary)?;
        if let Some(gap) = self.offline_gap_ms {
            writeln!(writer, "offline for {}ms", gap)?;
        }
        writeln!(writer, "{} memories since last seen", self.recent_memories_since_last_seen.len())?;
        Ok(())
    }
}

pub async fn run(engine: &Engine, args: OrientArgs, project_path: &std::path::Path, format: OutputFormat) -> anyhow::Result<()> {
    let options = OrientOptions { project_path: project_path.display().to_string(), timezone: args.timezone };
    let result = engine.orient(options).await?;
    format.print(&result)
}
