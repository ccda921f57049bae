// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Settings change notifications from the filesystem.
//!
//! Config files are often replaced by rename rather than written in place,
//! and may not exist yet. The watcher therefore follows each file's parent
//! directory and filters the debounced events down to the watched names.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Quiet period before a burst of writes is reported as one change.
pub const SETTINGS_DEBOUNCE: Duration = Duration::from_millis(500);

/// Reports changes to a fixed set of config files.
pub struct SettingsWatcher {
    debouncer: Option<Debouncer<RecommendedWatcher>>,
    changes: mpsc::UnboundedReceiver<Vec<PathBuf>>,
}

impl std::fmt::Debug for SettingsWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsWatcher")
            .field("active", &self.debouncer.is_some())
            .finish()
    }
}

/// The absolute path of `path`, plus its resolved form when the parent exists.
fn match_keys(path: &Path) -> Vec<PathBuf> {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut keys = vec![absolute.clone()];
    if let (Some(parent), Some(name)) = (absolute.parent(), absolute.file_name())
        && let Ok(parent) = std::fs::canonicalize(parent)
    {
        let resolved = parent.join(name);
        if resolved != absolute {
            keys.push(resolved);
        }
    }
    keys
}

impl SettingsWatcher {
    /// Watch `paths`, reporting a change at most once per `debounce` window.
    ///
    /// Files whose directory does not exist are skipped.
    pub fn new(paths: Vec<PathBuf>, debounce: Duration) -> Result<Self, notify::Error> {
        let watched: BTreeSet<PathBuf> = paths.iter().flat_map(|p| match_keys(p)).collect();
        let dirs: BTreeSet<PathBuf> = watched
            .iter()
            .filter_map(|p| p.parent().map(Path::to_path_buf))
            .filter(|dir| dir.is_dir())
            .collect();

        let (tx, changes) = mpsc::unbounded_channel();
        let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    let hits: Vec<PathBuf> = events
                        .into_iter()
                        .map(|event| event.path)
                        .filter(|path| watched.contains(path))
                        .collect();
                    if !hits.is_empty() {
                        let _ = tx.send(hits);
                    }
                }
                Err(error) => warn!(%error, "settings watcher error"),
            }
        })?;

        for dir in &dirs {
            match debouncer.watcher().watch(dir, RecursiveMode::NonRecursive) {
                Ok(()) => debug!(dir = %dir.display(), "watching for settings changes"),
                Err(error) => warn!(dir = %dir.display(), %error, "cannot watch settings directory"),
            }
        }

        Ok(Self {
            debouncer: Some(debouncer),
            changes,
        })
    }

    /// A watcher that never reports anything.
    pub fn disabled() -> Self {
        let (_, changes) = mpsc::unbounded_channel();
        Self {
            debouncer: None,
            changes,
        }
    }

    /// Wait for the next change and return the files it touched.
    pub async fn changed(&mut self) -> Vec<PathBuf> {
        match self.changes.recv().await {
            Some(paths) => paths,
            None => std::future::pending().await,
        }
    }
}
