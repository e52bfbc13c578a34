//! Display configuration: one closed dialect enum per decorated field
//!
//! Every enum deserializes through `From<String>` so that an unknown name
//! falls back to the enum's default (its first variant) instead of failing
//! the whole configuration or guessing another dialect.

use serde::{Deserialize, Deserializer, Serialize};

/// Smallest and largest Markdown header levels
pub const MIN_HEADER_LEVEL: u8 = 1;
pub const MAX_HEADER_LEVEL: u8 = 6;
const DEFAULT_HEADER_LEVEL: u8 = 2;

/// How a task's priority is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum PrioritySyntax {
    /// ⏬ 🔽 🔹 🔼 ⏫ 🔺
    #[default]
    Emoji,
    /// `!` repeated once per rank
    Symbol,
    /// `[priority:: high]`
    Dataview,
    Hidden,
}

/// How a task's creation time is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TimestampSyntax {
    #[default]
    Hidden,
    /// `@2024-01-05`
    Symbol,
    /// `➕ 2024-01-05`
    Emoji,
    /// `[created:: 2024-01-05T10:30:00Z]`
    Dataview,
}

/// How a task's tags are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TagsSyntax {
    /// `#work #urgent`
    #[default]
    Symbol,
    /// `🏷️work 🏷️urgent`
    Emoji,
    /// `[tags:: work, urgent]`
    Dataview,
    Hidden,
}

/// Ordering applied within each section and each sibling group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SortBy {
    /// Keep the order the task store yields
    #[default]
    Manual,
    /// Highest priority first, unprioritized last
    Priority,
    /// Newest first
    Created,
    /// Alphabetical, case-insensitive
    Text,
    /// Alphabetical by grouping tag, untagged last
    Tag,
    /// Pending before done
    Status,
}

fn dialect_name(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

fn fall_back<T: Default + std::fmt::Debug>(field: &str, raw: &str) -> T {
    let fallback = T::default();
    tracing::warn!(field, value = raw, ?fallback, "unknown option, using default");
    fallback
}

impl From<String> for PrioritySyntax {
    fn from(raw: String) -> Self {
        match dialect_name(&raw).as_str() {
            "emoji" | "icon" | "iconographic" => Self::Emoji,
            "symbol" | "plain" => Self::Symbol,
            "dataview" | "structured" | "attribute" => Self::Dataview,
            "hidden" | "none" | "off" => Self::Hidden,
            _ => fall_back("priority_syntax", &raw),
        }
    }
}

impl From<String> for TimestampSyntax {
    fn from(raw: String) -> Self {
        match dialect_name(&raw).as_str() {
            "hidden" | "none" | "off" => Self::Hidden,
            "symbol" | "plain" => Self::Symbol,
            "emoji" | "icon" | "iconographic" => Self::Emoji,
            "dataview" | "structured" | "attribute" => Self::Dataview,
            _ => fall_back("timestamp_syntax", &raw),
        }
    }
}

impl From<String> for TagsSyntax {
    fn from(raw: String) -> Self {
        match dialect_name(&raw).as_str() {
            "symbol" | "plain" | "hash" => Self::Symbol,
            "emoji" | "icon" | "iconographic" => Self::Emoji,
            "dataview" | "structured" | "attribute" => Self::Dataview,
            "hidden" | "none" | "off" => Self::Hidden,
            _ => fall_back("tags_syntax", &raw),
        }
    }
}

impl From<String> for SortBy {
    fn from(raw: String) -> Self {
        match dialect_name(&raw).as_str() {
            "manual" | "none" => Self::Manual,
            "priority" => Self::Priority,
            "created" | "created_at" | "date" => Self::Created,
            "text" | "alpha" | "alphabetical" => Self::Text,
            "tag" | "tags" => Self::Tag,
            "status" => Self::Status,
            _ => fall_back("sort_by", &raw),
        }
    }
}

/// Rendering choices for one sync cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub priority_syntax: PrioritySyntax,
    pub timestamp_syntax: TimestampSyntax,
    pub tags_syntax: TagsSyntax,
    /// Place tasks under one header per grouping tag
    pub group_by_tags: bool,
    /// Level of machine-generated headers
    #[serde(deserialize_with = "header_level")]
    pub default_header_level: u8,
    pub sort_by: SortBy,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            priority_syntax: PrioritySyntax::default(),
            timestamp_syntax: TimestampSyntax::default(),
            tags_syntax: TagsSyntax::default(),
            group_by_tags: false,
            default_header_level: DEFAULT_HEADER_LEVEL,
            sort_by: SortBy::default(),
        }
    }
}

impl DisplayConfig {
    /// Header level clamped into `1..=6`
    pub fn header_level(&self) -> u8 {
        self.default_header_level
            .clamp(MIN_HEADER_LEVEL, MAX_HEADER_LEVEL)
    }
}

fn header_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    let clamped = raw.clamp(MIN_HEADER_LEVEL as i64, MAX_HEADER_LEVEL as i64) as u8;
    if clamped as i64 != raw {
        tracing::warn!(value = raw, clamped, "default_header_level out of range");
    }
    Ok(clamped)
}
