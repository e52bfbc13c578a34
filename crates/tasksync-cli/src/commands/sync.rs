//! Sync, pull, push and show command implementations

use colored::Colorize;
use tasksync_core::{
    CycleMode, FileDocument, FileStateStore, JsonTaskStore, MemoryDependencyStore, Severity,
    SyncEngine, SyncReport, write_parents,
};

use crate::error::Result;
use crate::workspace::Workspace;

/// Engine with nesting backed by the `parent` fields of the task file
fn engine_for(ws: &Workspace, store: &JsonTaskStore) -> SyncEngine {
    let deps = MemoryDependencyStore::from_records(store.records());
    SyncEngine::new(ws.config.clone()).with_dependencies(Box::new(deps))
}

/// Run one cycle in `mode` and print its report
pub fn run_cycle(ws: &Workspace, mode: CycleMode) -> Result<()> {
    let mut store = JsonTaskStore::open(&ws.tasks)?;
    let mut engine = engine_for(ws, &store);
    let mut doc = FileDocument::new(&ws.document);
    let mut states = FileStateStore::new(&ws.state_dir);

    let report = engine.run(mode, &mut doc, &mut store, &mut states)?;

    if let Some(deps) = engine.dependencies() {
        write_parents(deps, store.records_mut());
    }
    store.save()?;

    print_report(ws, mode, &report);
    Ok(())
}

/// Print the document a full cycle would write
pub fn run_show(ws: &Workspace) -> Result<()> {
    let store = JsonTaskStore::open(&ws.tasks)?;
    let engine = engine_for(ws, &store);
    let mut doc = FileDocument::new(&ws.document);
    let states = FileStateStore::new(&ws.state_dir);

    let (text, report) = engine.preview(&mut doc, &store, &states)?;

    print!("{text}");
    for diagnostic in &report.diagnostics {
        eprintln!("{} {}", label(diagnostic.severity()), diagnostic);
    }
    Ok(())
}

fn label(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Warning => "WARN".yellow().bold(),
        Severity::Error => "ERROR".red().bold(),
    }
}

fn print_report(ws: &Workspace, mode: CycleMode, report: &SyncReport) {
    if mode != CycleMode::PushOnly {
        println!(
            "{} {} created, {} updated, {} deleted",
            "=>".blue().bold(),
            report.created.len(),
            report.updated.len(),
            report.deleted.len()
        );
    }

    if report.document_written {
        println!("{} Wrote {}", "OK".green().bold(), ws.document.display());
    } else if mode != CycleMode::PullOnly {
        println!("{} {} is up to date", "OK".green().bold(), ws.document.display());
    }

    for diagnostic in &report.diagnostics {
        println!("{} {}", label(diagnostic.severity()), diagnostic);
    }
}
