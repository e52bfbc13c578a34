//! Rendering and parsing of single checkbox lines
//!
//! Rendering is strict: exactly the dialects selected in [`DisplayConfig`],
//! in the fixed order checkbox, text, priority, timestamp, tags. Parsing is
//! permissive: every visible dialect of every field is recognized no matter
//! what the configuration says, so notes mixing old and new dialects stay
//! readable.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{Priority, TaskRecord, TaskStatus};
use crate::tree::INDENT_WIDTH;

use super::config::DisplayConfig;
use super::timestamp::ParsedTimestamp;
use super::{priority, tags, timestamp};

/// `- [ ] body`, with `*` and `+` bullets accepted
static TASK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)[-*+] \[(?P<mark>.)\](?:[ \t]+(?P<body>.*))?$").unwrap()
});

/// `[key:: value]` inline field
static DATAVIEW_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?P<key>[A-Za-z][\w-]*)::[ \t]*(?P<value>[^\]]*)\]").unwrap()
});

/// `➕ 2024-01-05`; the date may or may not be separated from the icon
static EMOJI_CREATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^➕\x{FE0F}?[ \t]*(?P<date>[0-9]{4}-[0-9]{2}-[0-9]{2})").unwrap()
});

/// Fields recovered from one checkbox line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTask {
    /// Leading indentation in columns (a tab counts as four)
    pub indent: usize,
    pub status: TaskStatus,
    /// Text with every recognized decoration removed
    pub text: String,
    pub priority: Option<Priority>,
    pub created: Option<ParsedTimestamp>,
    pub tags: Vec<String>,
}

impl ParsedTask {
    /// Nesting depth; indentation that is not a multiple of four rounds down
    pub fn depth(&self) -> usize {
        self.indent / INDENT_WIDTH
    }
}

enum Decoration {
    Priority(Priority),
    Created(ParsedTimestamp),
    Tags(Vec<String>),
}

/// A token and the whitespace that preceded it
struct Piece<'a> {
    gap: &'a str,
    token: &'a str,
}

/// Renders records under one display configuration and parses any dialect
#[derive(Debug, Clone, Default)]
pub struct SyntaxCodec {
    config: DisplayConfig,
}

impl SyntaxCodec {
    pub fn new(config: DisplayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Render a top-level line showing every tag
    pub fn render(&self, record: &TaskRecord) -> String {
        self.render_at(record, 0, false)
    }

    /// Render a line at `depth`, optionally leaving out the grouping tag
    /// (used when the section header already carries it).
    pub fn render_at(&self, record: &TaskRecord, depth: usize, omit_grouping_tag: bool) -> String {
        let mut line = format!(
            "{}- [{}] {}",
            " ".repeat(depth * INDENT_WIDTH),
            record.status.marker(),
            record.text
        );

        let decorations = [
            record
                .priority
                .and_then(|p| priority::render(p, self.config.priority_syntax)),
            timestamp::render(record.created_at, self.config.timestamp_syntax),
            {
                let skip = usize::from(omit_grouping_tag);
                let shown: Vec<&str> = record.tags.iter().skip(skip).map(String::as_str).collect();
                tags::render(&shown, self.config.tags_syntax)
            },
        ];

        for decoration in decorations.into_iter().flatten() {
            line.push(' ');
            line.push_str(&decoration);
        }

        line
    }

    /// Parse a line; the configuration is deliberately not consulted
    pub fn parse(&self, line: &str) -> Option<ParsedTask> {
        parse_line(line)
    }
}

/// Parse one line of a note into task fields.
///
/// Returns `None` for anything outside the checkbox-list subgrammar,
/// including checkboxes whose text is empty once decorations are removed.
pub fn parse_line(line: &str) -> Option<ParsedTask> {
    let caps = TASK_LINE.captures(line)?;
    let status = caps["mark"].chars().next().and_then(TaskStatus::from_marker)?;
    let indent = indent_columns(&caps["indent"]);
    let body = caps.name("body").map_or("", |m| m.as_str());

    let mut text = String::with_capacity(body.len());
    let mut priority = None;
    let mut created = None;
    let mut tags: Vec<String> = Vec::new();

    for piece in split_pieces(body) {
        match classify(piece.token) {
            Some(Decoration::Priority(p)) => {
                priority.get_or_insert(p);
            }
            Some(Decoration::Created(t)) => {
                created.get_or_insert(t);
            }
            Some(Decoration::Tags(found)) => {
                for tag in found {
                    if !tags.contains(&tag) {
                        tags.push(tag);
                    }
                }
            }
            None => {
                text.push_str(piece.gap);
                text.push_str(piece.token);
            }
        }
    }

    let text = text.trim_start().to_string();
    if text.is_empty() {
        return None;
    }

    Some(ParsedTask {
        indent,
        status,
        text,
        priority,
        created,
        tags,
    })
}

/// Indentation width in columns, counting a tab as one indent level
pub fn indent_columns(indent: &str) -> usize {
    indent
        .chars()
        .map(|c| if c == '\t' { INDENT_WIDTH } else { 1 })
        .sum()
}

fn split_pieces(body: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = body;

    loop {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        let gap = &rest[..rest.len() - trimmed.len()];
        let len = token_len(trimmed);
        pieces.push(Piece {
            gap,
            token: &trimmed[..len],
        });
        rest = &trimmed[len..];
    }

    pieces
}

/// Inline fields and icon-plus-date markers may contain spaces; every other
/// token ends at whitespace.
fn token_len(s: &str) -> usize {
    if let Some(m) = DATAVIEW_FIELD.find(s) {
        return m.end();
    }
    if let Some(m) = EMOJI_CREATED.find(s) {
        return m.end();
    }
    s.find(char::is_whitespace).unwrap_or(s.len())
}

fn classify(token: &str) -> Option<Decoration> {
    if let Some(caps) = DATAVIEW_FIELD.captures(token) {
        let value = caps["value"].trim();
        return match caps["key"].to_ascii_lowercase().as_str() {
            "priority" => value.parse().ok().map(Decoration::Priority),
            "created" => ParsedTimestamp::parse(value).ok().map(Decoration::Created),
            "tags" => {
                let list = tags::split_list(value);
                (!list.is_empty()).then_some(Decoration::Tags(list))
            }
            _ => None,
        };
    }

    if let Some(caps) = EMOJI_CREATED.captures(token) {
        return ParsedTimestamp::parse(&caps["date"])
            .ok()
            .map(Decoration::Created);
    }

    if let Some(p) = priority::from_emoji(token).or_else(|| priority::from_symbol(token)) {
        return Some(Decoration::Priority(p));
    }

    if let Some(t) = timestamp::from_symbol(token) {
        return Some(Decoration::Created(t));
    }

    tags::from_hash(token)
        .or_else(|| tags::from_emoji(token))
        .map(|tag| Decoration::Tags(vec![tag.to_string()]))
}
