//! Grouping keys and the header lines that show them

use std::collections::BTreeMap;

use tasksync_content::{HeaderLine, TaskRecord, canonical_tag, normalize};

use crate::Result;
use crate::state::HeaderAssociation;

/// Grouping key of tasks without tags; its section is the preamble
pub const DEFAULT_GROUP_KEY: &str = "";

/// Maps tasks to grouping keys and grouping keys to header lines
#[derive(Debug, Clone, Copy)]
pub struct HeaderOrganizer {
    level: u8,
}

impl HeaderOrganizer {
    /// `level` is the level of synthesized headers
    pub fn new(level: u8) -> Self {
        Self { level }
    }

    /// Grouping key of a task: its first tag, normalized
    pub fn assign(&self, record: &TaskRecord) -> String {
        record
            .grouping_tag()
            .map(normalize)
            .unwrap_or_else(|| DEFAULT_GROUP_KEY.to_string())
    }

    /// Header line for `key`, reusing a stored association verbatim or
    /// synthesizing one from `tag` and recording it
    pub fn header_line_for(
        &self,
        key: &str,
        tag: &str,
        headers: &mut BTreeMap<String, HeaderAssociation>,
    ) -> Result<String> {
        if let Some(assoc) = headers.get(key) {
            return Ok(assoc.line.clone());
        }

        let header = HeaderLine::synthesize(self.level, tag)?;
        tracing::debug!(key, line = %header.raw, "synthesized header");
        headers.insert(
            key.to_string(),
            HeaderAssociation {
                line: header.raw.clone(),
                tag: tag.to_string(),
            },
        );
        Ok(header.raw)
    }

    /// Grouping key and tag literal for a header found in the document.
    ///
    /// A header whose exact line is already associated keeps that key.
    /// Otherwise the header adopts the key of its normalized title, and the
    /// association is updated to the line as the human wrote it.
    pub fn adopt(
        &self,
        header: &HeaderLine,
        headers: &mut BTreeMap<String, HeaderAssociation>,
    ) -> (String, String) {
        if let Some((key, assoc)) = headers.iter().find(|(_, a)| a.line == header.raw) {
            return (key.clone(), assoc.tag.clone());
        }

        let key = normalize(&header.title);
        let assoc = headers.entry(key.clone()).or_insert_with(|| HeaderAssociation {
            line: header.raw.clone(),
            tag: canonical_tag(&header.title).unwrap_or_else(|| key.clone()),
        });
        if assoc.line != header.raw {
            tracing::debug!(key = %key, from = %assoc.line, to = %header.raw, "header edited");
            assoc.line = header.raw.clone();
        }
        (key, assoc.tag.clone())
    }
}
