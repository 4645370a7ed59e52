//! Configuration section definitions.
//!
//! | Section   | Purpose                              |
//! |-----------|--------------------------------------|
//! | `[watch]` | Mods root and debounce window        |
//! | `[serve]` | WebSocket bind address               |

mod serve;
mod watch;

pub use serve::ServeConfig;
pub use watch::WatchConfig;
