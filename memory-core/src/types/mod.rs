//! Common types shared across tiers, the router, and the orchestrator.

mod code;
mod memory;

pub use code::{Chunk, IndexedFile, Symbol, SymbolKind};
pub use memory::{CodeBlock, FileContext, Memory, MemorySource, MemoryType, Metadata, Tier};

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
