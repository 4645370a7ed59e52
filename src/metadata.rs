//! `mod.json` parsing and merge policy.
//!
//! Only well-formed fields overwrite the defaults:
//!
//! | field         | accepted value            |
//! |---------------|---------------------------|
//! | `author`      | non-empty string          |
//! | `description` | non-empty string          |
//! | `version`     | positive integer          |
//!
//! Everything else in the file is ignored by the merge but still forwarded
//! to observers on `updatemoddata`.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::ModMetadata;

/// Malformed metadata file. Recovered by keeping defaults.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object at the top level")]
    NotAnObject,
}

/// Parse `mod.json` content into its top-level object.
pub fn parse(content: &str) -> Result<Map<String, Value>, ParseError> {
    match serde_json::from_str::<Value>(content)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(ParseError::NotAnObject),
    }
}

/// Overwrite `metadata` with the well-formed fields present in `fields`.
pub fn merge(metadata: &mut ModMetadata, fields: &Map<String, Value>) {
    if let Some(author) = non_empty_str(fields, "author") {
        metadata.author = author.to_string();
    }
    if let Some(description) = non_empty_str(fields, "description") {
        metadata.description = description.to_string();
    }
    if let Some(version) = fields.get("version").and_then(Value::as_u64)
        && version > 0
    {
        metadata.version = version;
    }
}

/// Parse and merge over defaults in one step.
pub fn load(content: &str) -> Result<ModMetadata, ParseError> {
    let fields = parse(content)?;
    let mut metadata = ModMetadata::default();
    merge(&mut metadata, &fields);
    Ok(metadata)
}

fn non_empty_str<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
