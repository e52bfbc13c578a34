//! Task and dependency store seams
//!
//! The engine reads and writes tasks only through [`TaskStore`] and parent
//! links only through [`DependencyStore`]. Both are committed after the
//! remote document has been written.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tasksync_content::TaskRecord;

use crate::io::write_atomic;
use crate::{Error, Result};

/// The structured task list
pub trait TaskStore {
    /// All tasks, in the order the store keeps them
    fn tasks(&self) -> Result<Vec<TaskRecord>>;

    /// Insert a task, or replace the one with the same id in place
    fn upsert(&mut self, record: TaskRecord) -> Result<()>;

    /// Remove a task; returns whether it existed
    fn delete(&mut self, id: &str) -> Result<bool>;

    /// Make previous writes durable
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Parent/child links between tasks
pub trait DependencyStore {
    /// Direct children of `id`
    fn children(&self, id: &str) -> Vec<String>;

    /// Attach `id` under `parent`, or detach it with `None`
    fn set_parent(&mut self, id: &str, parent: Option<&str>) -> Result<()>;

    /// Make previous writes durable
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Keeps tasks in memory, in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    records: Vec<TaskRecord>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = TaskRecord>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&TaskRecord> {
        self.records.iter().find(|r| r.id() == id)
    }
}

fn upsert_in(records: &mut Vec<TaskRecord>, record: TaskRecord) {
    match records.iter_mut().find(|r| r.id() == record.id()) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}

fn delete_in(records: &mut Vec<TaskRecord>, id: &str) -> bool {
    let before = records.len();
    records.retain(|r| r.id() != id);
    records.len() != before
}

impl TaskStore for MemoryTaskStore {
    fn tasks(&self) -> Result<Vec<TaskRecord>> {
        Ok(self.records.clone())
    }

    fn upsert(&mut self, record: TaskRecord) -> Result<()> {
        upsert_in(&mut self.records, record);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool> {
        Ok(delete_in(&mut self.records, id))
    }
}

/// Tasks persisted as a pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct JsonTaskStore {
    path: PathBuf,
    records: Vec<TaskRecord>,
}

impl JsonTaskStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)
                    .map_err(|e| Error::store(format!("{}: {e}", path.display())))?
            }
        } else {
            Vec::new()
        };
        tracing::debug!(path = %path.display(), tasks = records.len(), "opened task store");
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [TaskRecord] {
        &mut self.records
    }

    pub fn save(&self) -> Result<()> {
        let mut content = serde_json::to_string_pretty(&self.records)?;
        content.push('\n');
        write_atomic(&self.path, content.as_bytes())
    }
}

impl TaskStore for JsonTaskStore {
    fn tasks(&self) -> Result<Vec<TaskRecord>> {
        Ok(self.records.clone())
    }

    fn upsert(&mut self, record: TaskRecord) -> Result<()> {
        upsert_in(&mut self.records, record);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool> {
        Ok(delete_in(&mut self.records, id))
    }

    fn flush(&mut self) -> Result<()> {
        self.save()
    }
}

/// Parent links held in memory, keyed by child id
#[derive(Debug, Clone, Default)]
pub struct MemoryDependencyStore {
    parents: BTreeMap<String, String>,
}

impl MemoryDependencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed links from each record's `parent` field
    pub fn from_records(records: &[TaskRecord]) -> Self {
        let parents = records
            .iter()
            .filter_map(|r| r.parent.clone().map(|p| (r.id().to_string(), p)))
            .collect();
        Self { parents }
    }

    pub fn with_link(mut self, child: &str, parent: &str) -> Self {
        self.parents.insert(child.to_string(), parent.to_string());
        self
    }

    pub fn parent(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }
}

impl DependencyStore for MemoryDependencyStore {
    fn children(&self, id: &str) -> Vec<String> {
        self.parents
            .iter()
            .filter(|(_, parent)| parent.as_str() == id)
            .map(|(child, _)| child.clone())
            .collect()
    }

    fn set_parent(&mut self, id: &str, parent: Option<&str>) -> Result<()> {
        match parent {
            Some(parent) => {
                self.parents.insert(id.to_string(), parent.to_string());
            }
            None => {
                self.parents.remove(id);
            }
        }
        Ok(())
    }
}

/// Copy the links held by `deps` into each record's `parent` field
pub fn write_parents(deps: &dyn DependencyStore, records: &mut [TaskRecord]) {
    let mut parents = BTreeMap::new();
    for record in records.iter() {
        for child in deps.children(record.id()) {
            parents.insert(child, record.id().to_string());
        }
    }
    for record in records.iter_mut() {
        record.parent = parents.remove(record.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn memory_store_upserts_in_place() {
        let mut store = MemoryTaskStore::with_records([
            TaskRecord::new("a", "one"),
            TaskRecord::new("b", "two"),
        ]);
        store.upsert(TaskRecord::new("a", "uno")).unwrap();
        store.upsert(TaskRecord::new("c", "three")).unwrap();

        let texts: Vec<_> = store.records().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["uno", "two", "three"]);
        assert!(store.delete("b").unwrap());
        assert!(!store.delete("b").unwrap());
    }

    #[test]
    fn json_store_persists_on_flush() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.json");

        let mut store = JsonTaskStore::open(&path).unwrap();
        assert!(store.records().is_empty());
        store.upsert(TaskRecord::new("a", "Buy milk")).unwrap();
        assert!(!path.exists());
        store.flush().unwrap();

        let reopened = JsonTaskStore::open(&path).unwrap();
        assert_eq!(reopened.records().len(), 1);
        assert_eq!(reopened.records()[0].text, "Buy milk");
    }

    #[test]
    fn corrupt_task_file_is_a_store_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonTaskStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::Store { .. }));
        assert!(err.to_string().contains("tasks.json"));
    }

    #[test]
    fn dependency_links_round_trip_through_records() {
        let mut child = TaskRecord::new("c", "child");
        child.parent = Some("p".into());
        let mut records = vec![TaskRecord::new("p", "parent"), child];

        let mut deps = MemoryDependencyStore::from_records(&records);
        assert_eq!(deps.children("p"), ["c"]);

        deps.set_parent("c", None).unwrap();
        deps.set_parent("p", Some("c")).unwrap();
        write_parents(&deps, &mut records);
        assert_eq!(records[0].parent.as_deref(), Some("c"));
        assert_eq!(records[1].parent, None);
    }
}
