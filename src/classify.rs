//! Change Classification
//!
//! Turns one raw filesystem notification into at most one [`ChangeEvent`].
//! Pure decision logic plus live filesystem checks; no actor machinery and
//! no cached state. Every call re-reads the disk.
//!
//! ```text
//! (kind, relative path) --segments--> Target --disk state--> Option<ChangeEvent>
//! ```

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::compiler::{CompileError, ScriptCompiler};
use crate::metadata::{self, ParseError};
use crate::model::{ChangeEvent, METADATA_FILE, Script};
use crate::snapshot::script_name;

/// The two notification classes delivered by the watch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyKind {
    /// Create / remove / move transitions
    Rename,
    /// In-place content change
    Modify,
}

impl NotifyKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Rename => "rename",
            Self::Modify => "modify",
        }
    }
}

/// One raw notification, path relative to the watched root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawNotification {
    pub kind: NotifyKind,
    pub path: PathBuf,
}

impl RawNotification {
    pub fn new(kind: NotifyKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    #[cfg(test)]
    pub fn rename(path: impl Into<PathBuf>) -> Self {
        Self::new(NotifyKind::Rename, path)
    }

    #[cfg(test)]
    pub fn modify(path: impl Into<PathBuf>) -> Self {
        Self::new(NotifyKind::Modify, path)
    }
}

/// Recoverable classification failure. The change is dropped.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("failed compiling {}: {source}", path.display())]
    Compile {
        path: PathBuf,
        #[source]
        source: CompileError,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("failed reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What a relative path points at, by segment count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target<'a> {
    /// `<mod>`
    Mod(&'a str),
    /// `<mod>/<file>`
    File { mod_name: &'a str, file: &'a str },
}

/// Split a relative path into normal segments and map it to a target.
///
/// Returns `None` for empty, absolute, parent-escaping, non-UTF-8 or
/// deeper-than-two paths.
fn target(path: &Path) -> Option<Target<'_>> {
    let mut segments = Vec::with_capacity(2);
    for component in path.components() {
        match component {
            Component::Normal(segment) => segments.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    match segments.as_slice() {
        [mod_name] => Some(Target::Mod(mod_name.to_str()?)),
        [mod_name, file] => Some(Target::File {
            mod_name: mod_name.to_str()?,
            file: file.to_str()?,
        }),
        _ => None,
    }
}

/// Classify one notification against the current state of `root`.
pub fn classify(
    root: &Path,
    raw: &RawNotification,
    compiler: &dyn ScriptCompiler,
) -> Result<Option<ChangeEvent>, ClassifyError> {
    let Some(target) = target(&raw.path) else {
        crate::debug!("watch"; "ignored path shape: {}", raw.path.display());
        return Ok(None);
    };
    // Files vanishing with their mod are covered by `DeleteMod`.
    if let Target::File { mod_name, .. } = target
        && !is_dir(&root.join(mod_name))
    {
        return Ok(None);
    }
    let abs = root.join(&raw.path);

    match raw.kind {
        NotifyKind::Rename => classify_rename(&abs, target, compiler),
        NotifyKind::Modify => classify_modify(&abs, target, compiler),
    }
}

fn classify_rename(
    abs: &Path,
    target: Target<'_>,
    compiler: &dyn ScriptCompiler,
) -> Result<Option<ChangeEvent>, ClassifyError> {
    match target {
        Target::Mod(mod_name) => Ok(if !exists(abs) {
            Some(ChangeEvent::DeleteMod(mod_name.to_string()))
        } else if is_dir(abs) {
            Some(ChangeEvent::NewMod(mod_name.to_string()))
        } else {
            None
        }),
        Target::File { mod_name, file } => {
            let Some(name) = script_name(file) else {
                return Ok(None);
            };
            if !exists(abs) {
                return Ok(Some(ChangeEvent::DeleteScript(
                    mod_name.to_string(),
                    name.to_string(),
                )));
            }
            if is_dir(abs) {
                return Ok(None);
            }
            match compile_script(abs, name, compiler)? {
                Some(script) => Ok(Some(ChangeEvent::AddScript(mod_name.to_string(), script))),
                None => Ok(Some(ChangeEvent::DeleteScript(
                    mod_name.to_string(),
                    name.to_string(),
                ))),
            }
        }
    }
}

fn classify_modify(
    abs: &Path,
    target: Target<'_>,
    compiler: &dyn ScriptCompiler,
) -> Result<Option<ChangeEvent>, ClassifyError> {
    if is_dir(abs) {
        return Ok(None);
    }
    let Target::File { mod_name, file } = target else {
        return Ok(None);
    };

    if file == METADATA_FILE {
        let Some(content) = read_if_present(abs)? else {
            crate::debug!("watch"; "metadata vanished: {}", abs.display());
            return Ok(None);
        };
        let fields = metadata::parse(&content).map_err(|source| ClassifyError::Metadata {
            path: abs.to_path_buf(),
            source,
        })?;
        return Ok(Some(ChangeEvent::UpdateModMetadata(
            mod_name.to_string(),
            fields,
        )));
    }

    let Some(name) = script_name(file) else {
        return Ok(None);
    };
    match compile_script(abs, name, compiler)? {
        Some(script) => Ok(Some(ChangeEvent::UpdateScript(mod_name.to_string(), script))),
        // Vanished between notification and re-check.
        None => Ok(Some(ChangeEvent::DeleteScript(
            mod_name.to_string(),
            name.to_string(),
        ))),
    }
}

/// Read and compile a script. `Ok(None)` if the file is gone.
fn compile_script(
    path: &Path,
    name: &str,
    compiler: &dyn ScriptCompiler,
) -> Result<Option<Script>, ClassifyError> {
    let Some(source) = read_if_present(path)? else {
        return Ok(None);
    };
    let code = compiler
        .compile(&source)
        .map_err(|source| ClassifyError::Compile {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(Script::new(name, code)))
}

fn read_if_present(path: &Path) -> Result<Option<String>, ClassifyError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ClassifyError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// `exists` without following a dangling symlink into "missing".
fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// A real directory; a symlink to one is not a mod.
fn is_dir(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.is_dir())
}
