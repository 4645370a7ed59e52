//! Observer transport seam.
//!
//! The registry only needs "send one text frame", "poll for inbound text"
//! and "close". WebSocket is the production transport; tests plug in an
//! in-memory channel.

use std::io::ErrorKind;
use std::net::TcpStream;

use tungstenite::protocol::Message;
use tungstenite::{Error, WebSocket};

/// Result of one send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Transport not ready; the message is skipped for this observer
    NotReady,
    /// Transport is gone; the observer must be closed
    Closed(String),
}

/// Result of one non-blocking read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    Idle,
    Closed,
}

/// A message-oriented connection to one observer.
pub trait Channel: Send {
    fn send_text(&mut self, text: &str) -> SendOutcome;

    fn poll(&mut self) -> Inbound;

    /// Called once the snapshot has been delivered.
    fn on_open(&mut self) {}

    fn shutdown(&mut self);
}

impl Channel for WebSocket<TcpStream> {
    fn send_text(&mut self, text: &str) -> SendOutcome {
        match self.send(Message::Text(text.into())) {
            Ok(()) => SendOutcome::Sent,
            Err(Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => SendOutcome::NotReady,
            Err(e) => SendOutcome::Closed(e.to_string()),
        }
    }

    fn poll(&mut self) -> Inbound {
        match self.read() {
            Ok(Message::Text(text)) => Inbound::Text(text.as_str().to_string()),
            Ok(Message::Close(_)) => Inbound::Closed,
            // Ping/pong are answered by tungstenite; binary frames carry nothing for us
            Ok(_) => Inbound::Idle,
            Err(Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => Inbound::Idle,
            Err(_) => Inbound::Closed,
        }
    }

    fn on_open(&mut self) {
        // Blocking during handshake + snapshot, non-blocking for polling reads
        if let Err(e) = self.get_ref().set_nonblocking(true) {
            crate::log!("ws"; "failed to switch to non-blocking: {}", e);
        }
    }

    fn shutdown(&mut self) {
        let _ = self.close(None);
        let _ = self.flush();
    }
}
