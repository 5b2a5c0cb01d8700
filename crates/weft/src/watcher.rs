// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Filesystem watching for cache invalidation.
//!
//! The OS notification callback only forwards changed paths onto a
//! queue; a consumer thread owns the invalidation callback so cache
//! mutation never happens on the notification thread. A failure to
//! establish the watch is fatal to construction; errors on individual
//! events are logged and skipped so one bad event cannot stop future
//! invalidations.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};

use crate::error::Result;

/// Watches a directory tree and reports changed paths.
///
/// Dropping the watcher stops event delivery and joins the consumer
/// thread.
pub(crate) struct Watcher {
    watcher: Option<RecommendedWatcher>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Watcher {
    /// Starts watching `root` recursively. `on_change` runs on the
    /// consumer thread for every path named in a change event.
    pub fn start<F>(root: &Path, on_change: F) -> Result<Watcher>
    where
        F: Fn(&Path) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Vec<PathBuf>>();
        let mut watcher =
            notify::recommended_watcher(move |event: notify::Result<notify::Event>| match event {
                Ok(event) => {
                    let _ = tx.send(event.paths);
                }
                Err(err) => tracing::warn!(error = %err, "watch event error"),
            })?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        tracing::info!(root = %root.display(), "watching for changes");

        let thread = thread::spawn(move || {
            for paths in rx {
                for path in paths {
                    tracing::debug!(path = %path.display(), "change");
                    on_change(&path);
                }
            }
        });

        Ok(Watcher {
            watcher: Some(watcher),
            thread: Some(thread),
        })
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        // Dropping the OS watcher first closes the queue and lets the
        // consumer thread drain and exit.
        self.watcher.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::mpsc::channel;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_reports_changed_paths() {
        let dir = TempDir::new().unwrap();
        let (tx, rx) = channel();
        let _watcher = Watcher::start(dir.path(), move |path| {
            let _ = tx.send(path.to_path_buf());
        })
        .unwrap();

        fs::write(dir.path().join("a.html"), "x").unwrap();

        let changed = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("no change event");
        assert!(changed.ends_with("a.html"));
    }
}
