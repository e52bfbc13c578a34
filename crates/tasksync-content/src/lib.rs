//! Task line syntax, normalization, and Markdown structure for tasksync
//!
//! Everything in this crate is pure text processing: no I/O, no persisted
//! state. The sync engine in `tasksync-core` builds on these pieces:
//!
//! - [`normalize`]: canonical identity keys for task text
//! - [`similarity`]: text-similarity ratio used by fuzzy identity matching
//! - [`syntax`]: dialect-aware rendering and permissive parsing of task lines
//! - [`document`]: classification of a Markdown note into sections and lines
//! - [`tree`]: indentation-encoded parent/child relationships

pub mod document;
pub mod error;
pub mod model;
pub mod normalize;
pub mod similarity;
pub mod syntax;
pub mod tree;

pub use document::{DocumentLine, HeaderLine, LineKind, MarkdownDocument, Section};
pub use error::{Error, Result};
pub use model::{Priority, TaskRecord, TaskStatus};
pub use normalize::normalize;
pub use syntax::{
    DisplayConfig, ParsedTask, ParsedTimestamp, PrioritySyntax, SortBy, SyntaxCodec, TagsSyntax,
    TimestampSyntax, canonical_tag,
};
pub use tree::{ForestLayout, LayoutEntry, LineParent, TreeCodec};
