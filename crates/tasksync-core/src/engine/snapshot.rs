//! Staged copy of everything a cycle may change
//!
//! A cycle reads the task store, the dependency links and the sync state
//! once into a [`Snapshot`] and mutates only the snapshot. Nothing reaches
//! the real stores until [`Snapshot::commit`].

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tasksync_content::{ForestLayout, TaskRecord, TreeCodec};

use crate::Result;
use crate::diagnostics::SyncReport;
use crate::state::SyncState;
use crate::store::{DependencyStore, TaskStore};

#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    /// Tasks in store order
    pub(crate) tasks: Vec<TaskRecord>,
    /// Child id to parent id
    pub(crate) parents: BTreeMap<String, String>,
    pub(crate) state: SyncState,
    original: HashSet<String>,
    changed: BTreeSet<String>,
    deleted: BTreeSet<String>,
    relinked: BTreeMap<String, Option<String>>,
}

impl Snapshot {
    pub(crate) fn load(
        store: &dyn TaskStore,
        deps: Option<&dyn DependencyStore>,
        state: SyncState,
    ) -> Result<Self> {
        let tasks = store.tasks()?;
        let mut parents = BTreeMap::new();
        if let Some(deps) = deps {
            for record in &tasks {
                for child in deps.children(record.id()) {
                    parents.insert(child, record.id().to_string());
                }
            }
        }

        Ok(Self {
            original: tasks.iter().map(|r| r.id().to_string()).collect(),
            tasks,
            parents,
            state,
            changed: BTreeSet::new(),
            deleted: BTreeSet::new(),
            relinked: BTreeMap::new(),
        })
    }

    pub(crate) fn get(&self, id: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|r| r.id() == id)
    }

    /// Stage a record; returns whether anything changed
    pub(crate) fn upsert(&mut self, record: TaskRecord) -> bool {
        let id = record.id().to_string();
        let changed = match self.tasks.iter_mut().find(|r| r.id() == id) {
            Some(existing) if *existing == record => false,
            Some(existing) => {
                *existing = record;
                true
            }
            None => {
                self.tasks.push(record);
                true
            }
        };
        if changed {
            self.deleted.remove(&id);
            self.changed.insert(id);
        }
        changed
    }

    /// Stage a deletion; returns whether the task existed
    pub(crate) fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|r| r.id() != id);
        if self.tasks.len() == before {
            return false;
        }
        self.changed.remove(id);
        self.deleted.insert(id.to_string());
        if self.parents.contains_key(id) {
            self.set_parent(id, None);
        }
        true
    }

    pub(crate) fn parent(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    pub(crate) fn set_parent(&mut self, id: &str, parent: Option<&str>) {
        if self.parent(id) == parent {
            return;
        }
        match parent {
            Some(p) => self.parents.insert(id.to_string(), p.to_string()),
            None => self.parents.remove(id),
        };
        self.relinked
            .insert(id.to_string(), parent.map(str::to_string));
    }

    /// Fill the report's id lists from the staged changes
    pub(crate) fn summarize(&self, report: &mut SyncReport) {
        for record in &self.tasks {
            let id = record.id().to_string();
            if !self.changed.contains(&id) {
                continue;
            }
            let list = if self.original.contains(&id) {
                &mut report.updated
            } else {
                &mut report.created
            };
            if !list.contains(&id) {
                list.push(id);
            }
        }
        for id in &self.deleted {
            if self.original.contains(id) && !report.deleted.contains(id) {
                report.deleted.push(id.clone());
            }
        }
    }

    /// Apply the staged changes: tasks first, then links. Returns the state
    /// for the caller to persist last.
    pub(crate) fn commit(
        self,
        store: &mut dyn TaskStore,
        deps: Option<&mut dyn DependencyStore>,
    ) -> Result<SyncState> {
        for id in &self.deleted {
            store.delete(id)?;
        }
        for record in &self.tasks {
            if self.changed.contains(record.id()) {
                store.upsert(record.clone())?;
            }
        }
        store.flush()?;

        if let Some(deps) = deps {
            for (id, parent) in &self.relinked {
                deps.set_parent(id, parent.as_deref())?;
            }
            deps.flush()?;
        }

        tracing::debug!(
            changed = self.changed.len(),
            deleted = self.deleted.len(),
            relinked = self.relinked.len(),
            "committed snapshot"
        );
        Ok(self.state)
    }
}

/// Forest layout of `ordered` under `parents`
pub(crate) fn layout(ordered: &[&TaskRecord], parents: &BTreeMap<String, String>) -> ForestLayout {
    let nodes: Vec<(&str, Option<&str>)> = ordered
        .iter()
        .map(|r| (r.id(), parents.get(r.id()).map(String::as_str)))
        .collect();
    TreeCodec::layout(&nodes)
}
