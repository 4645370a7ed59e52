//! Mod data model shared by the scanner, the classifier and the hub.
//!
//! Nothing here is cached between events: values are built from a live
//! filesystem read and dropped once sent.

use serde::Serialize;
use serde_json::{Map, Value};

/// Metadata file expected at the top of every mod directory.
pub const METADATA_FILE: &str = "mod.json";

/// Recognized script source extension (without the dot).
pub const SCRIPT_EXTENSION: &str = "ts";

/// Author used when `mod.json` is missing or has no usable author.
pub const DEFAULT_AUTHOR: &str = "Unknown author";

/// One compiled script belonging to a mod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Script {
    /// File name without the `.ts` extension
    pub name: String,
    /// Compiled JavaScript
    pub code: String,
}

impl Script {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

/// The `author` / `description` / `version` triple of a mod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModMetadata {
    pub author: String,
    pub description: String,
    pub version: u64,
}

impl Default for ModMetadata {
    fn default() -> Self {
        Self {
            author: DEFAULT_AUTHOR.to_string(),
            description: String::new(),
            version: 1,
        }
    }
}

/// A mod as sent inside the `connect` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mod {
    /// Directory name, unique among present mods
    pub name: String,
    pub author: String,
    pub description: String,
    pub version: u64,
    pub scripts: Vec<Script>,
}

impl Mod {
    /// Create a mod with default metadata and no scripts.
    #[cfg(test)]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_metadata(name, ModMetadata::default())
    }

    pub fn with_metadata(name: impl Into<String>, metadata: ModMetadata) -> Self {
        Self {
            name: name.into(),
            author: metadata.author,
            description: metadata.description,
            version: metadata.version,
            scripts: Vec::new(),
        }
    }

    /// Find a script by name.
    #[cfg(test)]
    pub fn script(&self, name: &str) -> Option<&Script> {
        self.scripts.iter().find(|s| s.name == name)
    }
}

/// Full state of the mods folder as of one scan.
///
/// Serializes as a plain JSON array of mods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot(pub Vec<Mod>);

impl Snapshot {
    #[cfg(test)]
    pub fn mods(&self) -> &[Mod] {
        &self.0
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&Mod> {
        self.0.iter().find(|m| m.name == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One semantic delta derived from a filesystem transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    NewMod(String),
    DeleteMod(String),
    /// Parsed `mod.json` object, forwarded as-is
    UpdateModMetadata(String, Map<String, Value>),
    AddScript(String, Script),
    UpdateScript(String, Script),
    /// Mod name and script name (extension stripped)
    DeleteScript(String, String),
}

impl ChangeEvent {
    /// Name of the mod this event refers to.
    pub fn mod_name(&self) -> &str {
        match self {
            Self::NewMod(name)
            | Self::DeleteMod(name)
            | Self::UpdateModMetadata(name, _)
            | Self::AddScript(name, _)
            | Self::UpdateScript(name, _)
            | Self::DeleteScript(name, _) => name,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NewMod(_) => "new mod",
            Self::DeleteMod(_) => "delete mod",
            Self::UpdateModMetadata(..) => "update metadata",
            Self::AddScript(..) => "add script",
            Self::UpdateScript(..) => "update script",
            Self::DeleteScript(..) => "delete script",
        }
    }
}
