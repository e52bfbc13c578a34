//! Store to document: render the staged tasks into the template's layout

use std::collections::{BTreeMap, HashMap};

use tasksync_content::{
    LayoutEntry, MarkdownDocument, ParsedTask, Section, SortBy, TaskRecord, TreeCodec,
};

use crate::Result;
use crate::diagnostics::{Diagnostic, SyncReport};
use crate::headers::DEFAULT_GROUP_KEY;
use crate::identity::line_keys;
use crate::sort::sort_records;

use super::SyncEngine;
use super::snapshot::{Snapshot, layout};

/// Rendered task lines and the records behind them, in output order
#[derive(Debug, Default)]
struct Block<'r> {
    lines: Vec<String>,
    records: Vec<&'r TaskRecord>,
}

impl<'r> Block<'r> {
    fn push_tree(
        &mut self,
        codec: &TreeCodec<'_>,
        ordered: &[&'r TaskRecord],
        tree: &[LayoutEntry],
        omit_grouping_tag: bool,
    ) {
        self.lines
            .extend(codec.render_entries(ordered, tree, omit_grouping_tag));
        self.records
            .extend(tree.iter().map(|entry| ordered[entry.index]));
    }
}

impl SyncEngine {
    /// Render every staged task into `template`, keeping its pass-through
    /// lines, and rebuild the identity table from what was rendered
    pub(super) fn push_from(
        &self,
        template: Option<&str>,
        snap: &mut Snapshot,
        report: &mut SyncReport,
    ) -> Result<String> {
        let doc = MarkdownDocument::parse(template.unwrap_or_default());
        let display = &self.config.display;
        let sections = doc.sections();
        let found = locate(&doc, &snap.state.identities);

        let mut ordered: Vec<&TaskRecord> = snap.tasks.iter().collect();
        match display.sort_by {
            // Lines stay where the human put them; tasks new to the
            // document follow in store order
            SortBy::Manual => ordered.sort_by_key(|r| match found.get(r.id()) {
                Some(&(_, position)) => (false, position),
                None => (true, 0),
            }),
            policy => sort_records(&mut ordered, policy),
        }

        let unlinked = BTreeMap::new();
        let parents = if self.dependencies.is_some() {
            &snap.parents
        } else {
            &unlinked
        };
        let forest = layout(&ordered, parents);
        for cycle in &forest.cycles {
            report.raise(Diagnostic::StructuralCycle { ids: cycle.clone() });
        }

        let codec = TreeCodec::new(&self.syntax);
        let mut blocks: Vec<Block> = sections.iter().map(|_| Block::default()).collect();
        let mut appended: Vec<(String, Block)> = Vec::new();

        if display.group_by_tags {
            let mut by_key: HashMap<String, usize> = HashMap::new();
            by_key.insert(DEFAULT_GROUP_KEY.to_string(), 0);
            for (index, section) in sections.iter().enumerate() {
                if let Some(header) = &section.header {
                    let (key, _) = self.headers.adopt(header, &mut snap.state.headers);
                    by_key.entry(key).or_insert(index);
                }
            }

            let mut new_keys: HashMap<String, usize> = HashMap::new();
            for tree in forest.trees() {
                let root = ordered[tree[0].index];
                let key = self.headers.assign(root);
                let omit = key != DEFAULT_GROUP_KEY;

                if let Some(&index) = by_key.get(&key) {
                    blocks[index].push_tree(&codec, &ordered, tree, omit);
                } else if let Some(&index) = new_keys.get(&key) {
                    appended[index].1.push_tree(&codec, &ordered, tree, omit);
                } else {
                    let tag = root.grouping_tag().unwrap_or(&key);
                    let header = self
                        .headers
                        .header_line_for(&key, tag, &mut snap.state.headers)?;
                    let mut block = Block::default();
                    block.push_tree(&codec, &ordered, tree, omit);
                    new_keys.insert(key, appended.len());
                    appended.push((header, block));
                }
            }
        } else {
            let fallback = sections
                .iter()
                .position(Section::has_tasks)
                .unwrap_or(sections.len().saturating_sub(1));
            for tree in forest.trees() {
                let root = ordered[tree[0].index];
                let index = found.get(root.id()).map_or(fallback, |&(section, _)| section);
                blocks[index].push_tree(&codec, &ordered, tree, false);
            }
        }

        let rendered: Vec<&TaskRecord> = blocks
            .iter()
            .chain(appended.iter().map(|(_, block)| block))
            .flat_map(|block| block.records.iter().copied())
            .collect();
        let keys = line_keys(rendered.iter().map(|r| r.text.as_str()));
        snap.state.identities = keys
            .iter()
            .zip(&rendered)
            .map(|(key, record)| (key.key(), record.id().to_string()))
            .collect();

        let mut out: Vec<String> = Vec::new();
        for (section, block) in sections.iter().zip(blocks) {
            if let Some(header) = &section.header {
                out.push(header.raw.clone());
            }

            let mut pending = Some(block.lines);
            for line in &section.body {
                if line.task().is_none() {
                    out.push(line.raw.clone());
                } else if let Some(lines) = pending.take() {
                    out.extend(lines);
                }
            }

            // No task line to replace: the block goes before trailing blanks
            if let Some(lines) = pending
                && !lines.is_empty()
            {
                let trailing = section
                    .body
                    .iter()
                    .rev()
                    .take_while(|line| line.is_blank())
                    .count();
                let at = out.len() - trailing;
                out.splice(at..at, lines);
            }
        }

        for (header, block) in appended {
            if out.last().is_some_and(|line| !line.trim().is_empty()) {
                out.push(String::new());
            }
            out.push(header);
            out.extend(block.lines);
        }

        tracing::debug!(tasks = rendered.len(), lines = out.len(), "rendered document");
        Ok(doc.assemble(&out))
    }
}

/// Section and task-line position of every line whose key is in `identities`
fn locate(
    doc: &MarkdownDocument,
    identities: &BTreeMap<String, String>,
) -> HashMap<String, (usize, usize)> {
    let lines: Vec<(usize, &ParsedTask)> = doc.tasks().collect();
    let keys = line_keys(lines.iter().map(|(_, task)| task.text.as_str()));

    let mut found = HashMap::new();
    for (position, ((section, _), key)) in lines.iter().zip(&keys).enumerate() {
        if let Some(id) = identities.get(&key.key()) {
            found.entry(id.clone()).or_insert((*section, position));
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasksync_content::DisplayConfig;

    use crate::config::SyncConfig;
    use crate::state::SyncState;
    use crate::store::MemoryTaskStore;

    fn push(display: DisplayConfig, records: Vec<TaskRecord>, template: &str) -> String {
        let engine = SyncEngine::new(SyncConfig {
            display,
            ..SyncConfig::default()
        });
        let store = MemoryTaskStore::with_records(records);
        let mut snap = Snapshot::load(&store, None, SyncState::new()).unwrap();
        engine
            .push_from(Some(template), &mut snap, &mut SyncReport::default())
            .unwrap()
    }

    #[test]
    fn new_tasks_join_the_first_section_with_tasks() {
        let out = push(
            DisplayConfig::default(),
            vec![TaskRecord::new("a", "Water plants")],
            "Intro\n\n## Today\n- [x] stale line\nnotes\n\n## Later\n",
        );
        assert_eq!(out, "Intro\n\n## Today\n- [ ] Water plants\nnotes\n\n## Later\n");
    }

    #[test]
    fn empty_sections_get_tasks_before_trailing_blanks() {
        let out = push(
            DisplayConfig::default(),
            vec![TaskRecord::new("a", "Water plants")],
            "# Notes\n\n\n",
        );
        assert_eq!(out, "# Notes\n- [ ] Water plants\n\n\n");
    }

    #[test]
    fn missing_trailing_newline_is_kept() {
        let out = push(DisplayConfig::default(), vec![TaskRecord::new("a", "x")], "- [ ] x");
        assert_eq!(out, "- [ ] x");
    }
}
