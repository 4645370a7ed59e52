//! Actor Message Definitions
//!
//! Message types for inter-actor communication.
//!
//! ```text
//! FsActor  --Notify--+
//!                    +--> HubActor
//! Acceptor --Connect-+
//! ```

use std::net::TcpStream;

use tungstenite::WebSocket;

use crate::classify::RawNotification;

// =============================================================================
// HubActor Messages
// =============================================================================

/// Messages to Hub Actor
///
/// Every producer writes into the same queue, so the hub sees connections
/// and notifications in arrival order.
#[derive(Debug)]
pub enum HubMsg {
    /// Raw filesystem notification (root-relative path)
    Notify(RawNotification),
    /// Observer socket, handshake done, snapshot pending
    Connect(WebSocket<TcpStream>),
    /// Close all observers and stop
    Shutdown,
}
