//! Document to store: merge every task line into the staged snapshot

use std::collections::HashSet;

use tasksync_content::tree::parse_indentation;
use tasksync_content::{
    DisplayConfig, LineParent, MarkdownDocument, ParsedTask, PrioritySyntax, TagsSyntax,
    TaskRecord, canonical_tag, normalize,
};

use crate::Result;
use crate::diagnostics::{Diagnostic, SuppressReason, SyncReport};
use crate::identity::MatchKind;

use super::SyncEngine;
use super::snapshot::{Snapshot, layout};

/// Grouping key and tag literal of the section a line sits in
type Group = (String, String);

impl SyncEngine {
    pub(super) fn pull_into(
        &self,
        document: Option<&str>,
        snap: &mut Snapshot,
        report: &mut SyncReport,
    ) -> Result<()> {
        let doc = MarkdownDocument::parse(document.unwrap_or_default());
        let display = &self.config.display;

        let groups: Vec<Option<Group>> = doc
            .sections()
            .iter()
            .map(|section| match &section.header {
                Some(header) if display.group_by_tags => {
                    Some(self.headers.adopt(header, &mut snap.state.headers))
                }
                _ => None,
            })
            .collect();

        let lines: Vec<(usize, &ParsedTask)> = doc.tasks().collect();
        let pass = self
            .resolver
            .resolve(lines.iter().map(|(_, t)| t.text.as_str()), &snap.state.identities);

        // Links to leave alone: records a cycle kept off their parent's line
        let implicated: HashSet<String> = if self.dependencies.is_some() {
            let ordered: Vec<&TaskRecord> = snap.tasks.iter().collect();
            layout(&ordered, &snap.parents).stranded.into_iter().collect()
        } else {
            HashSet::new()
        };

        let mut live: Vec<Option<String>> = Vec::with_capacity(lines.len());
        for ((section, task), resolution) in lines.iter().zip(&pass.resolutions) {
            if resolution.key.occurrence > 1 {
                report.raise(Diagnostic::AmbiguousIdentity {
                    key: resolution.key.base.clone(),
                    id: resolution.id.clone(),
                    occurrence: resolution.key.occurrence,
                });
            }

            let existing = snap.get(&resolution.id);
            if existing.is_none() && resolution.kind != MatchKind::Minted {
                tracing::debug!(id = %resolution.id, text = %task.text, "task deleted from store, dropping line");
                live.push(None);
                continue;
            }

            let group = groups[*section]
                .as_ref()
                .filter(|(key, _)| task.depth() == 0 && !key.is_empty());
            let record = merge_line(existing, &resolution.id, task, group, display);
            if snap.upsert(record) {
                tracing::debug!(id = %resolution.id, kind = ?resolution.kind, "task changed");
            }
            live.push(Some(resolution.id.clone()));
        }

        let keep_unclaimed = !pass.unclaimed.is_empty() && document.is_none_or(|t| t.trim().is_empty());
        if keep_unclaimed {
            report.raise(Diagnostic::PruningSuppressed {
                candidates: pass.unclaimed.len(),
                reason: if document.is_none() {
                    SuppressReason::DocumentNotFound
                } else {
                    SuppressReason::EmptyDocument
                },
            });
        } else {
            for (key, id) in &pass.unclaimed {
                if snap.delete(id) {
                    tracing::debug!(%key, %id, "line removed, pruning task");
                }
            }
        }
        snap.state.identities = pass.table(keep_unclaimed);

        if self.dependencies.is_some() {
            apply_indentation(&doc, &lines, &live, &implicated, snap);
        }

        Ok(())
    }
}

/// Update parent links from each section's indentation
fn apply_indentation(
    doc: &MarkdownDocument,
    lines: &[(usize, &ParsedTask)],
    live: &[Option<String>],
    implicated: &HashSet<String>,
    snap: &mut Snapshot,
) {
    let in_document: HashSet<&str> = live.iter().flatten().map(String::as_str).collect();

    for section in 0..doc.sections().len() {
        let members: Vec<usize> = (0..lines.len()).filter(|&i| lines[i].0 == section).collect();
        let depths: Vec<usize> = members.iter().map(|&i| lines[i].1.depth()).collect();

        for (local, parent) in parse_indentation(&depths).into_iter().enumerate() {
            let Some(id) = live[members[local]].as_deref() else {
                continue;
            };
            match parent {
                LineParent::Child(p) => {
                    if let Some(parent_id) = live[members[p]].as_deref() {
                        snap.set_parent(id, Some(parent_id));
                    }
                }
                LineParent::Root => {
                    let detach = snap
                        .parent(id)
                        .is_some_and(|p| in_document.contains(p) && !implicated.contains(id));
                    if detach {
                        snap.set_parent(id, None);
                    }
                }
                LineParent::Orphan => {}
            }
        }
    }
}

/// Fold one parsed line into the record it resolved to.
///
/// Fields the configured dialect hides keep their stored value; fields it
/// shows take the line's value, so removing a visible decoration clears it.
fn merge_line(
    existing: Option<&TaskRecord>,
    id: &str,
    task: &ParsedTask,
    group: Option<&Group>,
    display: &DisplayConfig,
) -> TaskRecord {
    let mut record = existing
        .cloned()
        .unwrap_or_else(|| TaskRecord::new(id, task.text.clone()));

    record.text = task.text.clone();
    record.status = task.status;
    record.priority = match display.priority_syntax {
        PrioritySyntax::Hidden => task.priority.or(existing.and_then(|r| r.priority)),
        _ => task.priority,
    };
    if let Some(created) = task.created {
        record.created_at = created.resolve(existing.map(|r| r.created_at));
    }
    record.tags = merge_tags(existing, task, group, display.tags_syntax);
    record
}

/// Section tag first (for roots under a grouping header), then inline tags,
/// de-duplicated by normalized form
fn merge_tags(
    existing: Option<&TaskRecord>,
    task: &ParsedTask,
    group: Option<&Group>,
    syntax: TagsSyntax,
) -> Vec<String> {
    let mut tags = Vec::new();
    let mut seen = HashSet::new();

    if let Some((key, section_tag)) = group {
        let literal = existing
            .and_then(TaskRecord::grouping_tag)
            .filter(|t| normalize(t) == *key)
            .or_else(|| {
                task.tags
                    .iter()
                    .map(String::as_str)
                    .find(|t| normalize(t) == *key)
            })
            .unwrap_or(section_tag);
        seen.insert(key.clone());
        tags.push(literal.to_string());
    }

    let inline = match (syntax, existing) {
        (TagsSyntax::Hidden, Some(record)) if task.tags.is_empty() => record.tags.clone(),
        _ => restore_literals(existing, &task.tags),
    };
    for tag in inline {
        if seen.insert(normalize(&tag)) {
            tags.push(tag);
        }
    }

    tags
}

/// Lines carry tags in canonical form. Map each parsed tag back to the stored
/// literal it was written from, and keep stored tags no line can carry.
fn restore_literals(existing: Option<&TaskRecord>, parsed: &[String]) -> Vec<String> {
    let stored = existing.map_or(&[][..], |r| r.tags.as_slice());
    let mut tags: Vec<String> = parsed
        .iter()
        .map(|tag| {
            stored
                .iter()
                .find(|s| canonical_tag(s).as_deref() == Some(tag.as_str()))
                .unwrap_or(tag)
                .clone()
        })
        .collect();
    tags.extend(
        stored
            .iter()
            .filter(|s| canonical_tag(s).is_none())
            .cloned(),
    );
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tasksync_content::syntax::parse_line;
    use tasksync_content::{Priority, SyntaxCodec, TaskStatus};

    fn stored() -> TaskRecord {
        TaskRecord::new("id-1", "Write report")
            .with_priority(Priority::High)
            .with_tags(["work", "q3"])
            .with_created_at(Utc.with_ymd_and_hms(2024, 1, 5, 10, 30, 0).unwrap())
    }

    #[test]
    fn hidden_fields_keep_stored_values() {
        let display = DisplayConfig {
            priority_syntax: PrioritySyntax::Hidden,
            tags_syntax: TagsSyntax::Hidden,
            ..DisplayConfig::default()
        };
        let line = parse_line("- [x] Write the report").unwrap();
        let merged = merge_line(Some(&stored()), "id-1", &line, None, &display);

        assert_eq!(merged.text, "Write the report");
        assert_eq!(merged.status, TaskStatus::Done);
        assert_eq!(merged.priority, Some(Priority::High));
        assert_eq!(merged.tags, ["work", "q3"]);
        assert_eq!(merged.created_at, stored().created_at);
    }

    #[test]
    fn visible_fields_follow_the_line() {
        let line = parse_line("- [ ] Write report #q4").unwrap();
        let merged = merge_line(Some(&stored()), "id-1", &line, None, &DisplayConfig::default());
        assert_eq!(merged.priority, None);
        assert_eq!(merged.tags, ["q4"]);
    }

    #[test]
    fn roots_under_a_group_header_get_the_section_tag_first() {
        let group = ("work".to_string(), "Work".to_string());
        let line = parse_line("- [ ] Write report #q3 #WORK").unwrap();

        let merged = merge_line(Some(&stored()), "id-1", &line, Some(&group), &DisplayConfig::default());
        assert_eq!(merged.tags, ["work", "q3"]);

        let fresh = merge_line(None, "id-2", &line, Some(&group), &DisplayConfig::default());
        assert_eq!(fresh.tags, ["WORK", "q3"]);
        assert_eq!(fresh.id(), "id-2");
    }

    #[test]
    fn canonical_tags_map_back_to_stored_literals() {
        let record = TaskRecord::new("id-1", "Learn templates").with_tags(["c++", "Q&A", "2024"]);
        let line = parse_line(&SyntaxCodec::default().render(&record)).unwrap();
        assert_eq!(line.text, "Learn templates");
        assert_eq!(line.tags, ["c", "Q-A"]);

        let merged = merge_line(Some(&record), "id-1", &line, None, &DisplayConfig::default());
        assert_eq!(merged, record);

        let retagged = parse_line("- [ ] Learn templates #Q-A #rust").unwrap();
        let merged = merge_line(Some(&record), "id-1", &retagged, None, &DisplayConfig::default());
        assert_eq!(merged.tags, ["Q&A", "rust", "2024"]);
    }
}
