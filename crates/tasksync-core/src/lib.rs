//! Sync engine between a task store and a human-edited Markdown note
//!
//! This crate builds on the pure text layer in `tasksync-content`:
//!
//! - **Configuration**: display dialects and fuzzy-match thresholds from `tasksync.toml`
//! - **Identity**: stable task ids recovered from free-form line text
//! - **Headers**: grouping tags mapped to document sections and back
//! - **State**: per-document identity tables and header associations
//! - **Adapters**: task, dependency and remote document backends
//! - **SyncEngine**: pull, push and full cycles, plus quick capture
//!
//! # Architecture
//!
//! ```text
//!        RemoteDocument          TaskStore / DependencyStore
//!              |                          |
//!              +-------- SyncEngine ------+
//!                            |
//!          IdentityResolver  HeaderOrganizer  SyncStateStore
//!                            |
//!                    tasksync-content
//! ```
//!
//! # Example
//!
//! ```
//! use tasksync_core::{
//!     MemoryDocument, MemoryStateStore, MemoryTaskStore, SyncConfig, SyncEngine,
//! };
//!
//! let mut engine = SyncEngine::new(SyncConfig::default());
//! let mut doc = MemoryDocument::new("inbox.md").with_content("- [ ] Buy milk\n");
//! let mut store = MemoryTaskStore::new();
//! let mut states = MemoryStateStore::new();
//!
//! let report = engine.sync(&mut doc, &mut store, &mut states).unwrap();
//! assert_eq!(report.created.len(), 1);
//! assert_eq!(store.records()[0].text, "Buy milk");
//! ```

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod headers;
pub mod identity;
pub mod io;
pub mod remote;
pub mod sort;
pub mod state;
pub mod store;

pub use config::{CONFIG_FILE, MatchThresholds, SyncConfig};
pub use diagnostics::{Diagnostic, Severity, SuppressReason, SyncReport};
pub use engine::{CycleMode, SyncEngine};
pub use error::{Error, Result};
pub use headers::{DEFAULT_GROUP_KEY, HeaderOrganizer};
pub use identity::{IdentityPass, IdentityResolver, LineKey, MatchKind, Resolution};
pub use remote::{FileDocument, MemoryDocument, RemoteDocument, RemoteError};
pub use sort::sort_records;
pub use state::{FileStateStore, HeaderAssociation, MemoryStateStore, SyncState, SyncStateStore};
pub use store::{
    DependencyStore, JsonTaskStore, MemoryDependencyStore, MemoryTaskStore, TaskStore,
    write_parents,
};
