//! Sync Message Protocol
//!
//! JSON envelopes sent to observers over WebSocket, one per text frame:
//!
//! ```json
//! {"type": "<kind>", "data": <payload>}
//! ```
//!
//! # Message Types
//!
//! - `connect`: full snapshot, always the first message on a connection
//! - `newmod` / `deletemod`: mod directory appeared / disappeared
//! - `updatemoddata`: `mod.json` changed
//! - `addscript` / `updatescript` / `deletescript`: script file changes

use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::{ChangeEvent, Script, Snapshot};

/// Outbound message to an observer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum SyncMessage {
    /// Initial state for a new observer
    Connect(Snapshot),

    NewMod(String),

    DeleteMod(String),

    #[serde(rename = "updatemoddata")]
    UpdateModData {
        #[serde(rename = "mod")]
        mod_name: String,
        data: Map<String, Value>,
    },

    AddScript {
        #[serde(rename = "mod")]
        mod_name: String,
        script: Script,
    },

    UpdateScript {
        #[serde(rename = "mod")]
        mod_name: String,
        script: Script,
    },

    DeleteScript {
        #[serde(rename = "mod")]
        mod_name: String,
        /// Script name
        script: String,
    },
}

impl SyncMessage {
    /// Serialize to a JSON text frame.
    pub fn to_json(&self) -> String {
        // Only strings, integers and JSON maps inside: serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<ChangeEvent> for SyncMessage {
    fn from(event: ChangeEvent) -> Self {
        match event {
            ChangeEvent::NewMod(name) => Self::NewMod(name),
            ChangeEvent::DeleteMod(name) => Self::DeleteMod(name),
            ChangeEvent::UpdateModMetadata(mod_name, data) => Self::UpdateModData { mod_name, data },
            ChangeEvent::AddScript(mod_name, script) => Self::AddScript { mod_name, script },
            ChangeEvent::UpdateScript(mod_name, script) => Self::UpdateScript { mod_name, script },
            ChangeEvent::DeleteScript(mod_name, script) => Self::DeleteScript { mod_name, script },
        }
    }
}

impl From<Snapshot> for SyncMessage {
    fn from(snapshot: Snapshot) -> Self {
        Self::Connect(snapshot)
    }
}
