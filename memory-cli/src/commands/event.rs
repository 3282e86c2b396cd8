use std::io::Write;

use clap::Args;
use memory_core::orchestrator::protocol::{ReportEvent, ReportEventResult};
use memory_core::types::now_ms;
use memory_core::Engine;

use crate::output::{Output, OutputFormat};

#[derive(Args)]
pub struct EventArgs {
    /// Event type, e.g. "file_edit" or "tool_call"
    #[arg(long = "type")]
    event_type: String,

    /// JSON payload, e.g. '{"path": "src/main.rs"}'
    #[arg(long, default_value = "{}")]
    payload: String,

    #[arg(long)]
    session_id: String,

    #[arg(long)]
    cli_type: Option<String>,

    #[arg(long)]
    project_path: Option<String>,
}

impl Output for ReportEventResult {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        writeln!(writer, "processed: {}", self.processed)?;
        if let Some(id) = &self.memory_id {
            writeln!(writer, "memory: {id}")?;
        }
        for action in &self.triggered_actions {
            writeln!(writer, "triggered: {action}")?;
        }
        Ok(())
    }
}

pub async fn run(engine: &Engine, args: EventArgs, format: OutputFormat) -> anyhow::Result<()> {
    let payload: serde_json::Value = serde_json::from_str(&args.payload)?;
    let event = ReportEvent {
        event_type: args.event_type,
        payload,
        timestamp: now_ms(),
        session_id: args.session_id,
        cli_type: args.cli_type,
        project_path: args.project_path,
    };
    let result = engine.report_event(event).await?;
    format.print(&result)
}
