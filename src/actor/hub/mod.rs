//! Hub Actor - Snapshot and Broadcast
//!
//! This actor is responsible for:
//! - Classifying raw filesystem notifications into change events
//! - Sending a fresh snapshot to every new observer
//! - Broadcasting change events to every open observer
//!
//! # Architecture
//!
//! ```text
//! FsActor --[Notify]--+
//!                     +--> HubActor (one ordered queue) --[connect/changes]--> Observers
//! Acceptor --[Connect]+                                                           |
//!                         reader thread <-----------[inbound JSON, close]---------+
//! ```
//!
//! Notifications and connections share one queue and are handled one at a
//! time, so a snapshot never interleaves with a broadcast. Handshakes happen
//! before a socket enters the queue.
//!
//! Every close, whether from a failed send or a peer hanging up, goes
//! through [`Hub::disconnect`].

mod channel;
mod client_io;
mod registry;

use std::net::TcpStream;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::HubMsg;
use crate::classify::{ClassifyError, RawNotification, classify};
use crate::compiler::ScriptCompiler;
use crate::model::{ChangeEvent, Snapshot};
use crate::reload::message::SyncMessage;
use crate::snapshot::build_snapshot;

pub use channel::Channel;
pub use registry::{Delivery, ObserverId, ObserverRegistry};

/// Registry handle; the lock is only held for one registry operation.
pub type SharedRegistry<C> = Arc<Mutex<ObserverRegistry<C>>>;

/// Snapshot + broadcast logic, independent of the transport.
pub struct Hub<C> {
    root: PathBuf,
    compiler: Arc<dyn ScriptCompiler>,
    registry: SharedRegistry<C>,
}

impl<C: Channel> Hub<C> {
    pub fn new(root: PathBuf, compiler: Arc<dyn ScriptCompiler>) -> Self {
        Self {
            root,
            compiler,
            registry: Arc::new(Mutex::new(ObserverRegistry::new())),
        }
    }

    #[cfg(test)]
    pub fn registry(&self) -> &SharedRegistry<C> {
        &self.registry
    }

    /// Register an observer and send it a freshly built snapshot.
    ///
    /// Returns the observer id if the snapshot was delivered.
    pub fn connect(&self, channel: C) -> Option<ObserverId> {
        let id = self.registry.lock().add(channel);

        let snapshot = self.scan();
        crate::debug!("hub"; "snapshot for observer {}: {} mods", id, snapshot.len());

        let opened = self.registry.lock().open(id, &SyncMessage::Connect(snapshot));
        if !opened {
            self.disconnect(id);
            return None;
        }
        crate::log!("hub"; "observer {} connected (total: {})", id, self.registry.lock().len());
        Some(id)
    }

    /// Classify one notification and broadcast the result, if any.
    pub fn notify(&self, raw: &RawNotification) -> Option<Delivery> {
        crate::debug!("watch"; "{} {}", raw.kind.label(), raw.path.display());

        match classify(&self.root, raw, self.compiler.as_ref()) {
            Ok(Some(event)) => Some(self.broadcast(event)),
            Ok(None) => None,
            Err(e) => {
                on_failure(&e);
                None
            }
        }
    }

    /// Deliver one change event to every open observer.
    pub fn broadcast(&self, event: ChangeEvent) -> Delivery {
        crate::log!("watch"; "{}: {}", event.label(), describe(&event));
        let delivery = self.registry.lock().broadcast(&event.into());
        crate::debug!(
            "hub";
            "delivered to {}, skipped {}, closed {}",
            delivery.sent, delivery.skipped, delivery.closed.len()
        );
        for &id in &delivery.closed {
            self.disconnect(id);
        }
        delivery
    }

    /// Drain inbound text from every open observer.
    ///
    /// Observers whose peer hung up are disconnected.
    pub fn poll_inbound(&self) -> Vec<(ObserverId, String)> {
        let (messages, closed) = self.registry.lock().poll_inbound();
        for id in closed {
            self.disconnect(id);
        }
        messages
    }

    /// Close one observer and drop it from the registry.
    pub fn disconnect(&self, id: ObserverId) -> bool {
        let mut registry = self.registry.lock();
        let removed = registry.remove(id);
        if removed {
            crate::log!("hub"; "observer {} disconnected (total: {})", id, registry.len());
        }
        removed
    }

    pub fn close_all(&self) {
        self.registry.lock().close_all();
    }

    /// Build a snapshot, logging every recoverable problem.
    fn scan(&self) -> Snapshot {
        match build_snapshot(&self.root, self.compiler.as_ref()) {
            Ok(report) => {
                for warning in &report.warnings {
                    crate::log!("scan"; "{}", warning);
                }
                report.snapshot
            }
            Err(e) => {
                crate::log!("scan"; "failed to read {}: {}", self.root.display(), e);
                Snapshot::default()
            }
        }
    }
}

/// Single decision point for classification failures.
///
/// Failures are logged and the change is dropped; observers are not told.
fn on_failure(error: &ClassifyError) {
    match error {
        ClassifyError::Compile { .. } => crate::log!("compile"; "{}", error),
        ClassifyError::Metadata { .. } => crate::log!("watch"; "{}, change ignored", error),
        ClassifyError::Io { .. } => crate::log!("watch"; "{}", error),
    }
}

fn describe(event: &ChangeEvent) -> String {
    match event {
        ChangeEvent::AddScript(name, script) | ChangeEvent::UpdateScript(name, script) => {
            format!("{}/{}", name, script.name)
        }
        ChangeEvent::DeleteScript(name, script) => format!("{name}/{script}"),
        other => other.mod_name().to_string(),
    }
}

/// Hub Actor - owns the hub and its ordered message queue
pub struct HubActor {
    rx: mpsc::Receiver<HubMsg>,
    hub: Arc<Hub<WebSocket<TcpStream>>>,
}

impl HubActor {
    pub fn new(
        rx: mpsc::Receiver<HubMsg>,
        root: PathBuf,
        compiler: Arc<dyn ScriptCompiler>,
    ) -> Self {
        Self {
            rx,
            hub: Arc::new(Hub::new(root, compiler)),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        // Inbound reads happen off the queue; they never produce events
        let hub = Arc::downgrade(&self.hub);
        std::thread::spawn(move || client_io::reader_loop(hub));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                HubMsg::Notify(raw) => {
                    self.hub.notify(&raw);
                }
                HubMsg::Connect(ws) => {
                    self.hub.connect(ws);
                }
                HubMsg::Shutdown => {
                    crate::debug!("hub"; "shutting down");
                    self.hub.close_all();
                    break;
                }
            }
        }
    }
}
