use std::path::PathBuf;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::classify::{NotifyKind, RawNotification};

/// Sleep used when nothing is pending.
pub(super) const IDLE_SLEEP: Duration = Duration::from_secs(86400);

/// Pure debouncer: only handles timing and per-path coalescing.
/// No classification, no filesystem access.
pub(super) struct Debouncer {
    window: Duration,
    /// Pending notifications in first-seen order
    pub(super) pending: Vec<RawNotification>,
    /// Path → index into `pending`
    pub(super) index: FxHashMap<PathBuf, usize>,
    pub(super) last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Vec::new(),
            index: FxHashMap::default(),
            last_event: None,
        }
    }

    /// Add a notification, applying coalescing rules:
    /// - Modify + Rename → Rename (structure changed, content follows from disk)
    /// - Rename + Modify → Rename
    /// - Same kind: kept once
    ///
    /// Every add restarts the quiet window.
    pub(super) fn add(&mut self, notification: RawNotification) {
        self.last_event = Some(Instant::now());

        if let Some(&slot) = self.index.get(&notification.path) {
            let existing = &mut self.pending[slot];
            if existing.kind == NotifyKind::Modify && notification.kind == NotifyKind::Rename {
                crate::debug!("watch"; "upgrade modify->rename: {}", notification.path.display());
                existing.kind = NotifyKind::Rename;
            }
            return;
        }

        crate::debug!("watch"; "event {}: {}", notification.kind.label(), notification.path.display());
        self.index.insert(notification.path.clone(), self.pending.len());
        self.pending.push(notification);
    }

    /// Take pending notifications once the window has been quiet.
    pub(super) fn take_if_ready(&mut self) -> Option<Vec<RawNotification>> {
        if !self.is_ready() {
            return None;
        }

        self.index.clear();
        self.last_event = None;
        Some(std::mem::take(&mut self.pending))
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };
        last_event.elapsed() >= self.window && !self.pending.is_empty()
    }

    /// Precise sleep duration until the window closes.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return IDLE_SLEEP;
        };

        self.window
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}
