//! Actor System for Hot Reload
//!
//! Message-passing concurrency for watch mode:
//!
//! ```text
//! FsActor -----> HubActor -----> Observers
//! (watch)     (classify, snapshot,   (WebSocket)
//!              broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with optional debouncing
//! - `hub` - Observer registry, snapshots and broadcast
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod hub;
pub mod messages;

pub use coordinator::Coordinator;
