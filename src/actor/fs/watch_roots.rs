use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

/// Watch-root consistency manager.
///
/// Responsibility:
/// - Attach the root at startup (if it exists)
/// - Re-attach the root after it was removed and recreated
pub(super) struct WatchRoot {
    path: PathBuf,
    attached: bool,
}

impl WatchRoot {
    pub(super) fn new(path: PathBuf) -> Self {
        Self {
            path,
            attached: false,
        }
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn attach(&mut self, watcher: &mut RecommendedWatcher) -> notify::Result<()> {
        if !self.path.exists() {
            crate::log!("watch"; "root {} missing, waiting for it", self.path.display());
            return Ok(());
        }
        watcher.watch(&self.path, RecursiveMode::Recursive)?;
        self.attached = true;
        Ok(())
    }

    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        // Drop the stale handle if the root went away.
        if self.attached && !self.path.exists() {
            let _ = watcher.unwatch(&self.path);
            self.attached = false;
            crate::log!("watch"; "root {} removed", self.path.display());
        }

        if self.attached || !self.path.exists() {
            return;
        }

        if watcher.watch(&self.path, RecursiveMode::Recursive).is_ok() {
            self.attached = true;
            crate::debug!("watch"; "re-attached watch: {}", self.path.display());
        }
    }
}
