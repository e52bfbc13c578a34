//! End-to-end workflows over the file adapters
//!
//! Each cycle builds a fresh engine and fresh adapters, the way separate
//! invocations of the binary would.

use pretty_assertions::assert_eq;
use tasksync_content::{Priority, TaskStatus};
use tasksync_core::{
    Diagnostic, FileDocument, FileStateStore, JsonTaskStore, MemoryDependencyStore, SyncConfig,
    SyncEngine, SyncReport, SyncStateStore, write_parents,
};
use tasksync_test_utils::{TestVault, child_of, tagged, task};

fn cycle(vault: &TestVault, config: SyncConfig) -> SyncReport {
    let mut store = JsonTaskStore::open(vault.tasks_path()).unwrap();
    let deps = MemoryDependencyStore::from_records(store.records());
    let mut engine = SyncEngine::new(config).with_dependencies(Box::new(deps));
    let mut doc = FileDocument::new(vault.document_path());
    let mut states = FileStateStore::new(vault.state_dir());

    let report = engine.sync(&mut doc, &mut store, &mut states).unwrap();
    if let Some(deps) = engine.dependencies() {
        write_parents(deps, store.records_mut());
    }
    store.save().unwrap();
    report
}

fn grouped() -> SyncConfig {
    let mut config = SyncConfig::default();
    config.display.group_by_tags = true;
    config
}

#[test]
fn test_edits_on_both_sides_meet() {
    let vault = TestVault::new();
    vault.write_document("# Week\n- [ ] Buy milk\n- [ ] Call plumber\n");
    cycle(&vault, SyncConfig::default());

    // Human ticks one task and adds another; an app adds a third
    vault.write_document("# Week\n- [x] Buy milk\n- [ ] Call plumber\n- [ ] Pay rent\n");
    let mut tasks = vault.read_tasks();
    tasks.push(task("app-1", "Renew passport").with_priority(Priority::Highest));
    vault.write_tasks(&tasks);

    let report = cycle(&vault, SyncConfig::default());

    assert_eq!(report.created.len(), 1);
    assert_eq!(report.updated.len(), 1);
    assert_eq!(
        vault.read_document().unwrap(),
        "# Week\n- [x] Buy milk\n- [ ] Call plumber\n- [ ] Pay rent\n- [ ] Renew passport 🔺\n"
    );
    let tasks = vault.read_tasks();
    assert_eq!(tasks.len(), 4);
    assert_eq!(tasks[0].status, TaskStatus::Done);

    assert!(cycle(&vault, SyncConfig::default()).is_noop());
}

#[test]
fn test_renamed_line_keeps_its_id_across_runs() {
    let vault = TestVault::new();
    vault.write_document("- [ ] Draft the quarterly report\n");
    cycle(&vault, SyncConfig::default());
    let id = vault.read_tasks()[0].id().to_string();

    vault.write_document("- [ ] Draft the quarterly reports\n");
    let report = cycle(&vault, SyncConfig::default());

    assert!(report.created.is_empty());
    assert_eq!(report.updated, [id.clone()]);
    let tasks = vault.read_tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id(), id);
    assert_eq!(tasks[0].text, "Draft the quarterly reports");

    let state = FileStateStore::new(vault.state_dir()).load("notes.md").unwrap();
    assert_eq!(state.identity("draft the quarterly reports"), Some(id.as_str()));
}

#[test]
fn test_grouped_note_survives_hand_edits() {
    let vault = TestVault::new();
    vault.write_tasks(&[
        tagged("a", "Write report", &["work"]),
        tagged("b", "Buy milk", &["errands"]),
    ]);
    cycle(&vault, grouped());
    assert_eq!(
        vault.read_document().unwrap(),
        "## work\n- [ ] Write report\n\n## errands\n- [ ] Buy milk\n"
    );

    // Move a task between sections by hand
    vault.write_document("## work\n- [ ] Write report\n- [ ] Buy milk\n\n## errands\n");
    let report = cycle(&vault, grouped());

    assert_eq!(report.updated, ["b"]);
    assert_eq!(vault.read_tasks()[1].tags, ["work"]);
    assert!(cycle(&vault, grouped()).is_noop());
}

#[test]
fn test_nesting_and_cycles_through_the_task_file() {
    let vault = TestVault::new();
    vault.write_tasks(&[
        task("a", "Plan trip"),
        child_of(task("b", "Book flights"), "a"),
        child_of(task("c", "Loop one"), "d"),
        child_of(task("d", "Loop two"), "c"),
    ]);

    let report = cycle(&vault, SyncConfig::default());

    assert!(report.has_errors());
    assert!(
        report
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::StructuralCycle { .. }))
    );
    assert_eq!(
        vault.read_document().unwrap(),
        "- [ ] Plan trip\n    - [ ] Book flights\n- [ ] Loop one\n- [ ] Loop two\n"
    );

    // The stranded links are not cleared by their flat rendering
    cycle(&vault, SyncConfig::default());
    let tasks = vault.read_tasks();
    assert_eq!(tasks[1].parent.as_deref(), Some("a"));
    assert_eq!(tasks[2].parent.as_deref(), Some("d"));
    assert_eq!(tasks[3].parent.as_deref(), Some("c"));
}

#[test]
fn test_clearing_the_note_keeps_the_tasks() {
    let vault = TestVault::new();
    vault.write_document("- [ ] Buy milk\n- [ ] Call plumber\n");
    cycle(&vault, SyncConfig::default());

    vault.write_document("");
    let report = cycle(&vault, SyncConfig::default());

    assert!(report.deleted.is_empty());
    assert_eq!(vault.read_tasks().len(), 2);
    assert_eq!(
        vault.read_document().unwrap(),
        "- [ ] Buy milk\n- [ ] Call plumber\n"
    );
}
