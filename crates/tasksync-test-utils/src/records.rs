//! Task record builders.
//!
//! Records built here share one creation time so that documents rendered
//! with a visible timestamp dialect are reproducible.

use chrono::{DateTime, TimeZone, Utc};
use tasksync_content::TaskRecord;

/// 2024-01-05T10:30:00Z
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 5, 10, 30, 0)
        .single()
        .unwrap_or_else(|| panic!("fixed_time: invalid date"))
}

/// A pending, untagged record created at [`fixed_time`].
pub fn task(id: &str, text: &str) -> TaskRecord {
    TaskRecord::new(id, text).with_created_at(fixed_time())
}

/// Like [`task`], with `tags` in order (the first is the grouping tag).
pub fn tagged(id: &str, text: &str, tags: &[&str]) -> TaskRecord {
    task(id, text).with_tags(tags.iter().copied())
}

/// Set the `parent` field the way an external dependency subsystem would.
pub fn child_of(mut record: TaskRecord, parent: &str) -> TaskRecord {
    record.parent = Some(parent.to_string());
    record
}

/// Pretty JSON for a task file.
///
/// # Panics
/// Panics if the records cannot be serialized.
pub fn records_json(records: &[TaskRecord]) -> String {
    let mut json = serde_json::to_string_pretty(records)
        .unwrap_or_else(|e| panic!("records_json: failed to serialize: {e}"));
    json.push('\n');
    json
}
