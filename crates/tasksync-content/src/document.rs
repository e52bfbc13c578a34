//! Markdown note structure
//!
//! A note is split into sections at ATX headers. Each line is classified as
//! a header, a task line, or opaque text; fenced code blocks and YAML
//! frontmatter are always opaque.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::syntax::{MAX_HEADER_LEVEL, MIN_HEADER_LEVEL, ParsedTask, parse_line};

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<hashes>#{1,6})[ \t]+(?P<title>.*\S)[ \t]*$").unwrap());

const FENCES: [&str; 2] = ["```", "~~~"];
const FRONTMATTER: &str = "---";

/// An ATX header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    pub level: u8,
    pub title: String,
    /// The line exactly as written
    pub raw: String,
}

impl HeaderLine {
    pub fn parse(line: &str) -> Option<Self> {
        let caps = HEADER.captures(line)?;
        Some(Self {
            level: caps["hashes"].len() as u8,
            title: caps["title"].to_string(),
            raw: line.to_string(),
        })
    }

    /// Build a header line for a title that has no authored header yet
    pub fn synthesize(level: u8, title: &str) -> Result<Self> {
        if !(MIN_HEADER_LEVEL..=MAX_HEADER_LEVEL).contains(&level) {
            return Err(Error::InvalidHeaderLevel(level));
        }
        let raw = format!("{} {}", "#".repeat(level as usize), title.trim());
        Ok(Self {
            level,
            title: title.trim().to_string(),
            raw,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Pass-through content, reproduced verbatim
    Text,
    Task(ParsedTask),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLine {
    pub raw: String,
    pub kind: LineKind,
}

impl DocumentLine {
    pub fn task(&self) -> Option<&ParsedTask> {
        match &self.kind {
            LineKind::Task(task) => Some(task),
            LineKind::Text => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }
}

/// A header and the lines up to the next header.
///
/// The first section of every document is the preamble, which has no header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub header: Option<HeaderLine>,
    pub body: Vec<DocumentLine>,
}

impl Section {
    pub fn tasks(&self) -> impl Iterator<Item = &ParsedTask> {
        self.body.iter().filter_map(DocumentLine::task)
    }

    pub fn has_tasks(&self) -> bool {
        self.tasks().next().is_some()
    }
}

/// A parsed note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownDocument {
    sections: Vec<Section>,
    trailing_newline: bool,
}

impl MarkdownDocument {
    pub fn parse(text: &str) -> Self {
        let mut sections = vec![Section::default()];
        let mut fence: Option<&str> = None;
        let mut in_frontmatter = false;

        for (index, raw) in text.lines().enumerate() {
            let kind = if index == 0 && raw.trim_end() == FRONTMATTER {
                in_frontmatter = true;
                LineKind::Text
            } else if in_frontmatter {
                if raw.trim_end() == FRONTMATTER || raw.trim_end() == "..." {
                    in_frontmatter = false;
                }
                LineKind::Text
            } else if let Some(open) = fence {
                if raw.trim_start().starts_with(open) {
                    fence = None;
                }
                LineKind::Text
            } else if let Some(open) = FENCES.into_iter().find(|f| raw.trim_start().starts_with(f)) {
                fence = Some(open);
                LineKind::Text
            } else if let Some(header) = HeaderLine::parse(raw) {
                sections.push(Section {
                    header: Some(header),
                    body: Vec::new(),
                });
                continue;
            } else if let Some(task) = parse_line(raw) {
                LineKind::Task(task)
            } else {
                LineKind::Text
            };

            if let Some(section) = sections.last_mut() {
                section.body.push(DocumentLine {
                    raw: raw.to_string(),
                    kind,
                });
            }
        }

        Self {
            sections,
            trailing_newline: text.is_empty() || text.ends_with('\n'),
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Whether the text ended with a newline (an empty text counts as yes)
    pub fn trailing_newline(&self) -> bool {
        self.trailing_newline
    }

    /// Every task line, with the index of its section
    pub fn tasks(&self) -> impl Iterator<Item = (usize, &ParsedTask)> {
        self.sections
            .iter()
            .enumerate()
            .flat_map(|(i, s)| s.tasks().map(move |t| (i, t)))
    }

    /// Join output lines the way this document ended
    pub fn assemble(&self, lines: &[String]) -> String {
        let mut text = lines.join("\n");
        if self.trailing_newline && !text.is_empty() {
            text.push('\n');
        }
        text
    }
}
