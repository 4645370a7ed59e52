//! Observer registry: the live set of connected observers.
//!
//! Owned by the hub (shared with the inbound reader thread). A transport
//! failure only marks the observer `Closed`: it is never sent to or polled
//! again, and the hub drops it through its single disconnect path.

use super::channel::{Channel, Inbound, SendOutcome};
use crate::reload::message::SyncMessage;

/// Registry-assigned observer handle. Not stable across reconnects.
pub type ObserverId = u64;

/// Observer lifecycle: `Connecting -> Open -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    /// Registered, snapshot not delivered yet
    Connecting,
    /// Receives live events
    Open,
    /// Terminal
    Closed,
}

struct Observer<C> {
    id: ObserverId,
    state: ObserverState,
    channel: C,
}

/// Per-broadcast delivery outcome.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub sent: usize,
    pub skipped: usize,
    /// Observers whose transport failed during this broadcast
    pub closed: Vec<ObserverId>,
}

pub struct ObserverRegistry<C> {
    next_id: ObserverId,
    observers: Vec<Observer<C>>,
}

impl<C: Channel> Default for ObserverRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Channel> ObserverRegistry<C> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            observers: Vec::new(),
        }
    }

    /// Register a new observer in the `Connecting` state.
    pub fn add(&mut self, channel: C) -> ObserverId {
        let id = self.next_id;
        self.next_id += 1;
        self.observers.push(Observer {
            id,
            state: ObserverState::Connecting,
            channel,
        });
        id
    }

    /// Deliver the first message and move the observer to `Open`.
    ///
    /// The greeting must arrive, so "not ready" counts as failure here.
    /// Returns `false` (and marks the observer closed) if it could not be sent.
    pub fn open(&mut self, id: ObserverId, greeting: &SyncMessage) -> bool {
        let Some(observer) = self.observers.iter_mut().find(|o| o.id == id) else {
            return false;
        };
        if observer.state != ObserverState::Connecting {
            return false;
        }

        match observer.channel.send_text(&greeting.to_json()) {
            SendOutcome::Sent => {
                observer.state = ObserverState::Open;
                observer.channel.on_open();
                true
            }
            SendOutcome::NotReady => {
                crate::log!("hub"; "observer {} not ready for snapshot, closing", id);
                observer.state = ObserverState::Closed;
                false
            }
            SendOutcome::Closed(reason) => {
                crate::log!("hub"; "observer {} closed before snapshot: {}", id, reason);
                observer.state = ObserverState::Closed;
                false
            }
        }
    }

    /// Drop an observer and shut its transport. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let Some(index) = self.observers.iter().position(|o| o.id == id) else {
            return false;
        };
        let mut observer = self.observers.remove(index);
        observer.state = ObserverState::Closed;
        observer.channel.shutdown();
        true
    }

    /// Send a message to every `Open` observer.
    ///
    /// Not-ready observers are skipped for this message only. Observers
    /// whose transport failed are marked closed; the others are unaffected.
    pub fn broadcast(&mut self, msg: &SyncMessage) -> Delivery {
        let text = msg.to_json();
        let mut delivery = Delivery::default();

        for observer in &mut self.observers {
            if observer.state != ObserverState::Open {
                continue;
            }
            match observer.channel.send_text(&text) {
                SendOutcome::Sent => delivery.sent += 1,
                SendOutcome::NotReady => {
                    crate::debug!("hub"; "observer {} not ready, skipped", observer.id);
                    delivery.skipped += 1;
                }
                SendOutcome::Closed(reason) => {
                    crate::debug!("hub"; "observer {} send failed: {}", observer.id, reason);
                    observer.state = ObserverState::Closed;
                    delivery.closed.push(observer.id);
                }
            }
        }

        delivery
    }

    /// Poll every open observer once for inbound text.
    ///
    /// Observers whose peer closed are marked closed; their ids are returned too.
    pub fn poll_inbound(&mut self) -> (Vec<(ObserverId, String)>, Vec<ObserverId>) {
        let mut messages = Vec::new();
        let mut closed = Vec::new();

        for observer in &mut self.observers {
            if observer.state != ObserverState::Open {
                continue;
            }
            loop {
                match observer.channel.poll() {
                    Inbound::Text(text) => messages.push((observer.id, text)),
                    Inbound::Idle => break,
                    Inbound::Closed => {
                        observer.state = ObserverState::Closed;
                        closed.push(observer.id);
                        break;
                    }
                }
            }
        }

        (messages, closed)
    }

    /// Close every observer.
    pub fn close_all(&mut self) {
        for mut observer in self.observers.drain(..) {
            observer.state = ObserverState::Closed;
            observer.channel.shutdown();
        }
    }

    /// Current state; unknown ids are `Closed`.
    #[cfg(test)]
    pub fn state(&self, id: ObserverId) -> ObserverState {
        self.observers
            .iter()
            .find(|o| o.id == id)
            .map_or(ObserverState::Closed, |o| o.state)
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}
