use memory_core::Engine;

use crate::errors::{helpers, EnhancedError};

use super::get::GetArgs;

pub async fn run(engine: &Engine, args: GetArgs) -> anyhow::Result<()> {
    let id = args.id();
    engine.touch_semantic(id).await.context_with_help(&format!("memory not found: {id}"), helpers::MEMORY_NOT_FOUND_HELP)?;
    println!("touched {id}");
    Ok(())
}
