//! Reload Module
//!
//! WebSocket plumbing for live mod sync.
//!
//! # Architecture
//!
//! ```text
//! FsActor -> HubActor -> Observers
//!  (watch)   (classify, broadcast)
//! ```
//!
//! # Modules
//!
//! - `message` - Sync message types (connect, newmod, addscript, ...)
//! - `server` - WebSocket acceptor for observer connections

pub mod message;
pub mod server;
