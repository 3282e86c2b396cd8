use std::io::Write;

use clap::Args;
use memory_core::orchestrator::protocol::{SearchCodeOptions, SearchCodeResult, SearchMode};
use memory_core::types::SymbolKind;
use memory_core::Engine;

use crate::output::{Output, OutputFormat};

#[derive(Args)]
pub struct SearchCodeArgs {
    query: String,

    /// text, symbol, or semantic (defaults to text)
    #[arg(long)]
    mode: Option<String>,

    #[arg(long)]
    language: Option<String>,

    #[arg(long)]
    file_pattern: Option<String>,

    #[arg(long)]
    symbol_kind: Option<String>,

    #[arg(long, default_value_t = 10)]
    limit: usize,

    #[arg(long, default_value_t = 0.0)]
    threshold: f32,

    #[arg(long)]
    include_content: bool,
}

impl Output for SearchCodeResult {
    fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        for hit in &self.results {
            let sim = hit.similarity.map(|s| format!("{s:.3}")).unwrap_or_else(|| "-".to_string());
            writeln!(writer, "{sim}  {}:{}-{}", hit.file_path, hit.line_start, hit.line_end)?;
            if let Some(symbol) = &hit.symbol {
                writeln!(writer, "    {} {}", symbol.kind, symbol.name)?;
            }
        }
        writeln!(writer, "{} result(s), index: {} files", self.results.len(), self.index_status.total_files)?;
        Ok(())
    }
}

pub async fn run(engine: &Engine, args: SearchCodeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mode = args
        .mode
        .map(|m| match m.as_str() {
            "text" => Ok(SearchMode::Text),
            "symbol" => Ok(SearchMode::Symbol),
            "semantic" => Ok(SearchMode::Semantic),
            other => Err(format!("unknown search mode: {other}")),
        })
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;
    let symbol_kind = args.symbol_kind.map(|s| s.parse::<SymbolKind>()).transpose().map_err(|e| anyhow::anyhow!(e))?;

    let options = SearchCodeOptions {
        query: args.query,
        mode,
        language: args.language,
        file_pattern: args.file_pattern,
        symbol_kind,
        limit: Some(args.limit),
        threshold: Some(args.threshold),
        include_content: Some(args.include_content),
    };

    let result = engine.search_code(options).await?;
    format.print(&result)
}
