//! [`TestVault`] for file-backed sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tasksync_content::TaskRecord;
use tempfile::TempDir;

use crate::records::records_json;

/// A temporary directory laid out the way the `tasksync` CLI expects:
///
/// ```text
/// <root>/notes.md        the document
/// <root>/tasks.json      the task file
/// <root>/.tasksync/      sync state
/// <root>/tasksync.toml   configuration
/// ```
///
/// # Example
///
/// ```rust,no_run
/// use tasksync_test_utils::{TestVault, task};
///
/// let vault = TestVault::new();
/// vault.write_document("- [ ] Buy milk\n");
/// vault.write_tasks(&[task("id-1", "Call mom")]);
/// vault.assert_document_contains("Buy milk");
/// ```
pub struct TestVault {
    temp_dir: TempDir,
}

impl Default for TestVault {
    fn default() -> Self {
        Self::new()
    }
}

impl TestVault {
    /// Create an empty vault.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new()
                .unwrap_or_else(|e| panic!("TestVault::new: failed to create temp dir: {e}")),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn document_path(&self) -> PathBuf {
        self.root().join("notes.md")
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.root().join("tasks.json")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root().join(".tasksync")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("tasksync.toml")
    }

    /// Simulate a human edit of the note.
    pub fn write_document(&self, content: &str) {
        fs::write(self.document_path(), content)
            .unwrap_or_else(|e| panic!("write_document: {e}"));
    }

    /// The note, or `None` if it does not exist.
    pub fn read_document(&self) -> Option<String> {
        fs::read_to_string(self.document_path()).ok()
    }

    pub fn write_tasks(&self, records: &[TaskRecord]) {
        fs::write(self.tasks_path(), records_json(records))
            .unwrap_or_else(|e| panic!("write_tasks: {e}"));
    }

    /// Records in the task file; empty if it does not exist.
    ///
    /// # Panics
    /// Panics if the file exists but is not a valid task list.
    pub fn read_tasks(&self) -> Vec<TaskRecord> {
        match fs::read_to_string(self.tasks_path()) {
            Ok(json) => serde_json::from_str(&json)
                .unwrap_or_else(|e| panic!("read_tasks: invalid task file: {e}")),
            Err(_) => Vec::new(),
        }
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).unwrap_or_else(|e| panic!("write_config: {e}"));
    }

    /// Assert that the note exists and contains `expected`.
    ///
    /// # Panics
    /// Panics with the full document if it does not.
    pub fn assert_document_contains(&self, expected: &str) {
        let content = self
            .read_document()
            .unwrap_or_else(|| panic!("Document does not exist: {}", self.document_path().display()));
        assert!(
            content.contains(expected),
            "Document does not contain expected content.\nExpected: {expected}\nActual:\n{content}"
        );
    }

    /// Assert that a state file was written for the note.
    pub fn assert_state_written(&self) {
        let path = self.state_dir().join("notes.sync.toml");
        assert!(path.exists(), "Expected state file: {}", path.display());
    }
}
