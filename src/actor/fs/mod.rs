//! FileSystem Actor
//!
//! Watches the mods root and forwards raw notifications to the HubActor.
//! Implements the "Watcher-First" pattern: the watcher is attached before
//! any observer can connect, so no change falls between snapshot and watch.
//!
//! Architecture:
//! ```text
//! Watcher → to_notifications (root-relative) → [Debouncer] → HubMsg::Notify
//! ```
//!
//! Classification happens in the hub, in queue order with connections.

use std::path::PathBuf;
use std::time::Duration;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::HubMsg;
use crate::classify::RawNotification;

// Pure timing and per-path coalescing.
mod debouncer;
// notify event → RawNotification mapping.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;

#[cfg(test)]
mod tests;

use debouncer::Debouncer;
use types::to_notifications;
use watch_roots::WatchRoot;

/// How often the watch root is checked when no events arrive.
const ROOT_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// FileSystem Actor - watches the mods root
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    /// Watch-root consistency layer
    watch_root: WatchRoot,
    /// Channel to send messages to HubActor
    hub_tx: mpsc::Sender<HubMsg>,
    /// `None` forwards every notification immediately
    debouncer: Option<Debouncer>,
}

impl FsActor {
    /// Create a new FsActor with Watcher-First pattern
    ///
    /// The watcher starts immediately, buffering events until `run`.
    /// `root` must already be normalized: notify reports paths under it.
    pub fn new(
        root: PathBuf,
        debounce: Duration,
        hub_tx: mpsc::Sender<HubMsg>,
    ) -> notify::Result<Self> {
        // Create sync channel for notify (it doesn't support async)
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watch_root = WatchRoot::new(root);
        watch_root.attach(&mut watcher)?;

        let debouncer = (!debounce.is_zero()).then(|| Debouncer::new(debounce));

        Ok(Self {
            notify_rx,
            watcher,
            watch_root,
            hub_tx,
            debouncer,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let hub_tx = self.hub_tx;
        let mut debouncer = self.debouncer;
        let mut watcher = self.watcher;
        let mut watch_root = self.watch_root;
        let root = watch_root.path().to_path_buf();

        let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);

        // Spawn a thread to poll notify events and send to async channel
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            let tick = debouncer
                .as_ref()
                .map_or(ROOT_CHECK_INTERVAL, |d| d.sleep_duration().min(ROOT_CHECK_INTERVAL));

            tokio::select! {
                biased;
                event = async_rx.recv() => {
                    let Some(event) = event else { break };
                    crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

                    for notification in to_notifications(&event, &root) {
                        match debouncer.as_mut() {
                            Some(debouncer) => debouncer.add(notification),
                            None => {
                                if forward(&hub_tx, notification).await.is_err() {
                                    return;
                                }
                            }
                        }
                    }
                }
                _ = tokio::time::sleep(tick) => {
                    // Ensure the root stays attached.
                    watch_root.maintain(&mut watcher);

                    let Some(batch) = debouncer.as_mut().and_then(Debouncer::take_if_ready) else {
                        continue;
                    };
                    for notification in batch {
                        if forward(&hub_tx, notification).await.is_err() {
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Send one notification to the hub.
///
/// Returns `Err(())` if the HubActor shut down.
async fn forward(hub_tx: &mpsc::Sender<HubMsg>, notification: RawNotification) -> Result<(), ()> {
    hub_tx
        .send(HubMsg::Notify(notification))
        .await
        .map_err(|_| ())
}
