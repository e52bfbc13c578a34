//! Resolved file locations and configuration for one command

use std::path::{Path, PathBuf};

use tasksync_core::SyncConfig;

use crate::cli::Paths;
use crate::error::{CliError, Result};

const STATE_DIR: &str = ".tasksync";

/// Everything a command needs to build an engine and its adapters
#[derive(Debug, Clone)]
pub struct Workspace {
    pub config: SyncConfig,
    pub document: PathBuf,
    pub tasks: PathBuf,
    pub state_dir: PathBuf,
}

impl Workspace {
    /// Load the configuration at `config_path` (defaults when missing) and
    /// resolve the state directory
    pub fn open(config_path: &Path, paths: &Paths) -> Result<Self> {
        if paths.document.is_dir() {
            return Err(CliError::user(format!(
                "Document path is a directory: {}",
                paths.document.display()
            )));
        }

        let config = SyncConfig::load_or_default(config_path)?;
        if config_path.exists() {
            tracing::info!(path = %config_path.display(), "using configuration");
        } else {
            tracing::info!(path = %config_path.display(), "configuration not found, using defaults");
        }

        let state_dir = paths
            .state_dir
            .clone()
            .unwrap_or_else(|| default_state_dir(&paths.tasks));

        Ok(Self {
            config,
            document: paths.document.clone(),
            tasks: paths.tasks.clone(),
            state_dir,
        })
    }
}

/// `.tasksync/` beside the task file
fn default_state_dir(tasks: &Path) -> PathBuf {
    match tasks.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(STATE_DIR),
        _ => PathBuf::from(STATE_DIR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn paths(document: PathBuf, tasks: PathBuf) -> Paths {
        Paths {
            document,
            tasks,
            state_dir: None,
        }
    }

    #[test]
    fn test_state_dir_defaults_beside_tasks() {
        assert_eq!(
            default_state_dir(Path::new("data/tasks.json")),
            PathBuf::from("data/.tasksync")
        );
        assert_eq!(default_state_dir(Path::new("tasks.json")), PathBuf::from(".tasksync"));
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let ws = Workspace::open(
            &dir.path().join("tasksync.toml"),
            &paths(dir.path().join("n.md"), dir.path().join("t.json")),
        )
        .unwrap();
        assert_eq!(ws.config, SyncConfig::default());
        assert_eq!(ws.state_dir, dir.path().join(".tasksync"));
    }

    #[test]
    fn test_directory_as_document_is_a_user_error() {
        let dir = tempdir().unwrap();
        let err = Workspace::open(
            &dir.path().join("tasksync.toml"),
            &paths(dir.path().to_path_buf(), dir.path().join("t.json")),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::User { .. }));
    }
}
