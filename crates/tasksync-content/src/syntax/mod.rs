//! Task line syntax: dialect configuration and the line codec

mod codec;
mod config;
mod priority;
mod tags;
mod timestamp;

pub use codec::{ParsedTask, SyntaxCodec, indent_columns, parse_line};
pub use config::{
    DisplayConfig, MAX_HEADER_LEVEL, MIN_HEADER_LEVEL, PrioritySyntax, SortBy, TagsSyntax,
    TimestampSyntax,
};
pub use tags::canonical_tag;
pub use timestamp::ParsedTimestamp;
