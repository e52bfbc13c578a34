//! Cross-crate round-trip tests
//!
//! A store rendered under any display configuration must read back to the
//! same records, and a second cycle must change nothing.

use pretty_assertions::assert_eq;
use rstest::rstest;
use tasksync_content::{
    DisplayConfig, Priority, PrioritySyntax, SortBy, TagsSyntax, TaskRecord, TaskStatus,
    TimestampSyntax,
};
use tasksync_core::{
    MemoryDependencyStore, MemoryDocument, MemoryStateStore, MemoryTaskStore, SyncConfig,
    SyncEngine,
};
use tasksync_test_utils::{tagged, task};

fn records() -> Vec<TaskRecord> {
    vec![
        tagged("a", "Write report", &["work", "q3"]).with_priority(Priority::High),
        tagged("b", "Fix login bug", &["work"]),
        tagged("c", "Buy milk", &["errands"]).with_priority(Priority::Low),
        task("d", "Call mom").with_status(TaskStatus::Done),
    ]
}

fn display(
    priority_syntax: PrioritySyntax,
    timestamp_syntax: TimestampSyntax,
    tags_syntax: TagsSyntax,
    group_by_tags: bool,
    sort_by: SortBy,
) -> DisplayConfig {
    DisplayConfig {
        priority_syntax,
        timestamp_syntax,
        tags_syntax,
        group_by_tags,
        sort_by,
        ..DisplayConfig::default()
    }
}

#[rstest]
#[case::defaults(DisplayConfig::default())]
#[case::symbol(display(PrioritySyntax::Symbol, TimestampSyntax::Symbol, TagsSyntax::Symbol, false, SortBy::Manual))]
#[case::emoji(display(PrioritySyntax::Emoji, TimestampSyntax::Emoji, TagsSyntax::Emoji, false, SortBy::Priority))]
#[case::dataview(display(PrioritySyntax::Dataview, TimestampSyntax::Dataview, TagsSyntax::Dataview, false, SortBy::Text))]
#[case::hidden(display(PrioritySyntax::Hidden, TimestampSyntax::Hidden, TagsSyntax::Hidden, false, SortBy::Status))]
#[case::grouped_symbol(display(PrioritySyntax::Symbol, TimestampSyntax::Hidden, TagsSyntax::Symbol, true, SortBy::Manual))]
#[case::grouped_dataview(display(PrioritySyntax::Dataview, TimestampSyntax::Emoji, TagsSyntax::Dataview, true, SortBy::Tag))]
#[case::grouped_hidden_tags(display(PrioritySyntax::Emoji, TimestampSyntax::Symbol, TagsSyntax::Hidden, true, SortBy::Created))]
fn test_render_then_sync_is_stable(#[case] display: DisplayConfig) {
    let mut engine = SyncEngine::new(SyncConfig {
        display,
        ..SyncConfig::default()
    });
    let mut doc = MemoryDocument::new("note.md");
    let mut store = MemoryTaskStore::with_records(records());
    let mut states = MemoryStateStore::new();

    let first = engine.sync(&mut doc, &mut store, &mut states).unwrap();
    assert!(first.document_written);
    assert!(first.created.is_empty());
    let rendered = doc.content().unwrap().to_string();

    let second = engine.sync(&mut doc, &mut store, &mut states).unwrap();

    assert!(second.is_noop(), "{second:?}\n{rendered}");
    assert!(second.diagnostics.is_empty());
    assert_eq!(doc.content().unwrap(), rendered);
    assert_eq!(store.records(), records().as_slice());
}

#[test]
fn test_dialect_switch_keeps_every_field() {
    let dataview = display(
        PrioritySyntax::Dataview,
        TimestampSyntax::Dataview,
        TagsSyntax::Dataview,
        false,
        SortBy::Manual,
    );
    let emoji = display(
        PrioritySyntax::Emoji,
        TimestampSyntax::Emoji,
        TagsSyntax::Emoji,
        false,
        SortBy::Manual,
    );
    let mut doc = MemoryDocument::new("note.md");
    let mut store = MemoryTaskStore::with_records(records());
    let mut states = MemoryStateStore::new();

    SyncEngine::new(SyncConfig {
        display: dataview,
        ..SyncConfig::default()
    })
    .sync(&mut doc, &mut store, &mut states)
    .unwrap();
    assert!(doc.content().unwrap().contains("[priority:: high]"));

    let mut engine = SyncEngine::new(SyncConfig {
        display: emoji,
        ..SyncConfig::default()
    });
    let switched = engine.sync(&mut doc, &mut store, &mut states).unwrap();

    assert!(switched.document_written);
    assert!(switched.updated.is_empty(), "{switched:?}");
    assert!(doc.content().unwrap().contains("⏫"));
    assert!(!doc.content().unwrap().contains("[priority::"));
    assert_eq!(store.records(), records().as_slice());

    let settled = engine.sync(&mut doc, &mut store, &mut states).unwrap();
    assert!(settled.is_noop(), "{settled:?}");
}

#[test]
fn test_nested_tasks_under_group_headers() {
    let deps = MemoryDependencyStore::new().with_link("k", "p");
    let mut engine = SyncEngine::new(SyncConfig {
        display: display(
            PrioritySyntax::Emoji,
            TimestampSyntax::Hidden,
            TagsSyntax::Symbol,
            true,
            SortBy::Manual,
        ),
        ..SyncConfig::default()
    })
    .with_dependencies(Box::new(deps));
    let mut doc = MemoryDocument::new("note.md");
    let mut store = MemoryTaskStore::with_records([
        tagged("p", "Plan offsite", &["work"]),
        tagged("k", "Book venue", &["home"]),
    ]);
    let mut states = MemoryStateStore::new();

    engine.sync(&mut doc, &mut store, &mut states).unwrap();

    assert_eq!(
        doc.content().unwrap(),
        "## work\n- [ ] Plan offsite\n    - [ ] Book venue #home\n"
    );

    let second = engine.sync(&mut doc, &mut store, &mut states).unwrap();
    assert!(second.is_noop(), "{second:?}");
    assert_eq!(store.get("k").unwrap().tags, ["home"]);
    assert_eq!(engine.dependencies().unwrap().children("p"), ["k"]);
}
