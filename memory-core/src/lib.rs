#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::float_cmp)]

//! # Memory Core
//!
//! The three-tier memory engine that backs a local-first assistant context store:
//! an in-process working tier, a per-project durable tier, and a cross-project
//! semantic tier, unified behind one orchestrator and a deterministic router.
//!
//! ## Module Organization
//!
//! ### Primary APIs
//! - [`orchestrator`]: the `Engine` that owns all three tiers and exposes every
//!   named operation (store, recall, update, promote, summarize, orient, …)
//! - [`router`]: the pure function deciding which tier a new memory belongs in
//! - [`tiers`]: the three tier backends (`l1`, `l2`, `l3`)
//! - [`code_index`]: per-project source catalog backing `search_code`
//!
//! ### Support Modules
//! - [`types`]: the universal `Memory` record and its vocabulary
//! - [`error`]: the crate's error taxonomy
//! - [`config`]: recognized configuration options
//! - [`embeddings`]: deterministic text embedding with cache and circuit breaker
//! - [`fts`]: shared full-text-search query sanitization
//!
//! ## Quick Start
//!
//! ```no_run
//! use memory_core::config::Config;
//! use memory_core::orchestrator::Engine;
//! use memory_core::orchestrator::protocol::{StoreOptions, RecallOptions};
//! use memory_core::types::MemoryType;
//!
//! # #[tokio::main]
//! # async fn main() -> memory_core::error::Result<()> {
//! let engine = Engine::open(std::path::Path::new("."), Config::default()).await?;
//! let stored = engine
//!     .store("use Postgres for ACID guarantees".to_string(), MemoryType::Decision, StoreOptions::default())
//!     .await?;
//! let found = engine.recall("postgres", RecallOptions::default()).await?;
//! println!("stored {} in {}, recall found {} matches", stored.id, stored.tier, found.len());
//! # Ok(())
//! # }
//! ```

pub mod code_index;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod fts;
pub mod orchestrator;
pub mod router;
pub mod tiers;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use orchestrator::Engine;
pub use router::{route, RouteDecision, RouteRequest};
pub use types::{Memory, MemoryType, Metadata, Tier};
