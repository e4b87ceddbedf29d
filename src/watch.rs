//! Debounced watchers for the task file and the settings file

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, error, info};
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{DebounceEventResult, Debouncer, RecommendedCache, new_debouncer};
use thiserror::Error;
use tokio::sync::mpsc;

const DEBOUNCE_TIMEOUT: Duration = Duration::from_millis(300);

/// Changes the workspace reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceEvent {
    TaskFileChanged,
    SettingsChanged,
}

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Error watching file: {0}")]
    Watch(#[from] notify::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("No directory to watch for {0}")]
    NoParent(PathBuf),
}

/// A running file watcher; watching stops when the handle is dropped
pub struct WatchHandle {
    path: PathBuf,
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// True if any of `paths` is `target`.
fn touches(paths: &[PathBuf], target: &Path) -> bool {
    paths.iter().any(|path| path == target)
}

/// Watch `path` and send `event` whenever it is created, modified or removed.
///
/// The file's directory is watched, so the file itself does not need to exist yet.
///
/// # Errors
///
/// Returns `WatchError::Io` if the directory cannot be resolved, or
/// `WatchError::Watch` if the watcher fails to start.
pub fn watch_file(
    path: &Path,
    event: WorkspaceEvent,
    sender: mpsc::Sender<WorkspaceEvent>,
) -> Result<WatchHandle, WatchError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| WatchError::NoParent(path.to_path_buf()))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let directory = std::fs::canonicalize(parent)?;
    let target = directory.join(file_name);

    let watched = target.clone();
    let mut debouncer = new_debouncer(
        DEBOUNCE_TIMEOUT,
        None,
        move |res: DebounceEventResult| match res {
            Ok(events) => {
                let changed = events
                    .iter()
                    .filter(|debounced| {
                        debounced.event.kind.is_create()
                            || debounced.event.kind.is_modify()
                            || debounced.event.kind.is_remove()
                    })
                    .any(|debounced| touches(&debounced.event.paths, &watched));
                if changed {
                    debug!("{} changed", watched.display());
                    if let Err(e) = sender.blocking_send(event) {
                        error!("Failed to send watch event: {e}");
                    }
                }
            }
            Err(errors) => error!("Watch error: {errors:?}"),
        },
    )?;

    debouncer.watch(&directory, RecursiveMode::NonRecursive)?;
    info!("Watching file: {}", target.display());

    Ok(WatchHandle {
        path: target,
        _debouncer: debouncer,
    })
}
