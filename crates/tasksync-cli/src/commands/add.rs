//! Quick capture

use colored::Colorize;
use tasksync_content::{Priority, canonical_tag};
use tasksync_core::{FileDocument, SyncEngine};

use crate::error::{CliError, Result};
use crate::workspace::Workspace;

/// Append one task line to the document
pub fn run_add(ws: &Workspace, text: &str, priority: Option<Priority>, tags: &[String]) -> Result<()> {
    if text.trim().is_empty() {
        return Err(CliError::user("Task text cannot be empty"));
    }

    let tags = tags
        .iter()
        .map(|t| {
            canonical_tag(t).ok_or_else(|| {
                CliError::user(format!("Tag '{t}' cannot be written in a task line"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let engine = SyncEngine::new(ws.config.clone());
    let mut doc = FileDocument::new(&ws.document);
    let line = engine.capture(&mut doc, text, priority, &tags)?;

    println!("{} {}", "Added".green().bold(), line.trim_start());
    Ok(())
}
