use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod errors;
mod output;

use commands::{
    current::{self, CurrentArgs},
    delete,
    event::{self, EventArgs},
    get::{self, GetArgs},
    list::{self, ListArgs},
    orient::{self, OrientArgs},
    promote::{self, PromoteArgs},
    recall::{self, RecallArgs},
    search_code::{self, SearchCodeArgs},
    store::{self, StoreArgs},
    summarize::{self, SummarizeArgs},
    touch,
    update::{self, UpdateArgs},
};
use config::load_config;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "memory-cli")]
#[command(about = "Command-line interface for the Context Fabric memory engine")]
#[command(version, long_about = None)]
struct Cli {
    /// Config file path (defaults to ~/.context-fabric/config.yaml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Project root the engine opens L2/code-index state under (defaults to cwd)
    #[arg(short, long, value_name = "DIR")]
    project: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Enable debug-level tracing
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a new memory, letting the router pick its tier unless forced
    Store(StoreArgs),
    /// Fetch a memory by id from whichever tier holds it
    Get(GetArgs),
    /// Weighted, tier-fused recall across L1/L2/L3
    Recall(RecallArgs),
    /// Patch a stored memory, or promote it when `--target-layer` outranks its tier
    Update(UpdateArgs),
    /// Delete a memory from whichever tier holds it
    Delete(GetArgs),
    /// List memories in a tier, optionally filtered by type/tags
    List(ListArgs),
    /// Copy a memory into the next tier and delete the original
    Promote(PromoteArgs),
    /// Collapse aged memories in a tier into one summary memory
    Summarize(SummarizeArgs),
    /// Produce a session-start orientation summary
    Orient(OrientArgs),
    /// Assemble the current working-memory context window
    Current(CurrentArgs),
    /// Ingest a free-form telemetry event
    Event(EventArgs),
    /// Search the project's code index
    SearchCode(SearchCodeArgs),
    /// Re-score an L3 memory as if it had just been accessed, without fetching it
    Touch(GetArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = load_config(cli.config.as_deref())?;
    let project_path = match cli.project {
        Some(p) => p,
        None => std::env::current_dir()?,
    };
    let engine = memory_core::Engine::open(&project_path, config).await?;

    match cli.command {
        Commands::Store(args) => store::run(&engine, args, cli.format).await,
        Commands::Get(args) => get::run(&engine, args, cli.format).await,
        Commands::Recall(args) => recall::run(&engine, args, cli.format).await,
        Commands::Update(args) => update::run(&engine, args, cli.format).await,
        Commands::Delete(args) => delete::run(&engine, args, cli.format).await,
        Commands::List(args) => list::run(&engine, args, cli.format).await,
        Commands::Promote(args) => promote::run(&engine, args, cli.format).await,
        Commands::Summarize(args) => summarize::run(&engine, args, cli.format).await,
        Commands::Orient(args) => orient::run(&engine, args, &project_path, cli.format).await,
        Commands::Current(args) => current::run(&engine, args, cli.format).await,
        Commands::Event(args) => event::run(&engine, args, cli.format).await,
        Commands::SearchCode(args) => search_code::run(&engine, args, cli.format).await,
        Commands::Touch(args) => touch::run(&engine, args).await,
    }
}
