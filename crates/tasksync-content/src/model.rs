//! Task records shared by the line codec and the sync engine

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Completion state of a task
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
}

impl TaskStatus {
    /// Character written between the checkbox brackets
    pub fn marker(self) -> char {
        match self {
            TaskStatus::Pending => ' ',
            TaskStatus::Done => 'x',
        }
    }

    /// Decode a checkbox marker; only `' '`, `'x'` and `'X'` are task markers
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            ' ' => Some(TaskStatus::Pending),
            'x' | 'X' => Some(TaskStatus::Done),
            _ => None,
        }
    }

    pub fn is_done(self) -> bool {
        self == TaskStatus::Done
    }
}

/// Six ordered priority levels, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Lowest,
    Low,
    Normal,
    Medium,
    High,
    Highest,
}

impl Priority {
    /// All levels in ascending order
    pub const ALL: [Priority; 6] = [
        Priority::Lowest,
        Priority::Low,
        Priority::Normal,
        Priority::Medium,
        Priority::High,
        Priority::Highest,
    ];

    /// 1 for `Lowest` through 6 for `Highest`
    pub fn rank(self) -> usize {
        self as usize + 1
    }

    pub fn from_rank(rank: usize) -> Option<Self> {
        rank.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn name(self) -> &'static str {
        match self {
            Priority::Lowest => "lowest",
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Highest => "highest",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| Error::InvalidPriority(s.to_string()))
    }
}

/// A task as held by the task store
///
/// The id is assigned once by identity resolution and never changes; every
/// other field may be edited from either side of a sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    id: String,
    /// Display text without any syntax decorations
    pub text: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Ordered tags; the first one is the grouping tag
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Parent task, owned by the dependency subsystem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl TaskRecord {
    /// Create a pending record created now
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            status: TaskStatus::Pending,
            priority: None,
            tags: Vec::new(),
            created_at: Utc::now(),
            parent: None,
        }
    }

    /// A record without an identity, used only to render a line for quick capture
    pub fn draft(text: impl Into<String>) -> Self {
        Self::new(String::new(), text)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// First tag, which selects the document section when grouping
    pub fn grouping_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }
}
