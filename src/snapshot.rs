//! Full scan of the mods folder.
//!
//! Produces one [`Snapshot`] plus every recoverable problem found on the way.
//! Nothing short of an unreadable root aborts the scan.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::compiler::{CompileError, ScriptCompiler};
use crate::metadata::{self, ParseError};
use crate::model::{METADATA_FILE, Mod, ModMetadata, SCRIPT_EXTENSION, Script, Snapshot};

/// Recoverable problem found while scanning.
#[derive(Debug, Error)]
pub enum ScanWarning {
    #[error("failed to parse {}, using defaults: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("failed compiling {}: {source}", path.display())]
    Compile {
        path: PathBuf,
        #[source]
        source: CompileError,
    },

    #[error("failed reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of a full scan.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub snapshot: Snapshot,
    pub warnings: Vec<ScanWarning>,
}

/// Scan `root` and build a snapshot of every mod directory in it.
///
/// Entry order follows `read_dir`, which is platform dependent.
pub fn build_snapshot(root: &Path, compiler: &dyn ScriptCompiler) -> io::Result<ScanReport> {
    let mut report = ScanReport::default();

    for entry in fs::read_dir(root)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                report.warnings.push(ScanWarning::Io {
                    path: root.to_path_buf(),
                    source,
                });
                continue;
            }
        };

        // Symlinked directories are not mods
        if !entry.file_type().is_ok_and(|t| t.is_dir()) {
            continue;
        }
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            crate::debug!("scan"; "skip non-utf8 mod directory: {}", path.display());
            continue;
        };

        let mod_data = scan_mod(&path, name, compiler, &mut report.warnings);
        report.snapshot.0.push(mod_data);
    }

    Ok(report)
}

/// Scan one mod directory.
fn scan_mod(
    dir: &Path,
    name: &str,
    compiler: &dyn ScriptCompiler,
    warnings: &mut Vec<ScanWarning>,
) -> Mod {
    let mut metadata = ModMetadata::default();
    let mut scripts = Vec::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            warnings.push(ScanWarning::Io {
                path: dir.to_path_buf(),
                source,
            });
            return Mod::with_metadata(name, metadata);
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if file_name == METADATA_FILE {
            match read_metadata(&path) {
                Ok(meta) => metadata = meta,
                Err(warning) => warnings.push(warning),
            }
        } else if let Some(script_name) = script_name(file_name) {
            match read_script(&path, script_name, compiler) {
                Ok(script) => scripts.push(script),
                Err(warning) => warnings.push(warning),
            }
        }
    }

    let mut mod_data = Mod::with_metadata(name, metadata);
    mod_data.scripts = scripts;
    mod_data
}

fn read_metadata(path: &Path) -> Result<ModMetadata, ScanWarning> {
    let content = fs::read_to_string(path).map_err(|source| ScanWarning::Io {
        path: path.to_path_buf(),
        source,
    })?;
    metadata::load(&content).map_err(|source| ScanWarning::Metadata {
        path: path.to_path_buf(),
        source,
    })
}

fn read_script(
    path: &Path,
    name: &str,
    compiler: &dyn ScriptCompiler,
) -> Result<Script, ScanWarning> {
    let source = fs::read_to_string(path).map_err(|source| ScanWarning::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let code = compiler
        .compile(&source)
        .map_err(|source| ScanWarning::Compile {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Script::new(name, code))
}

/// Script name for a file name with the script extension, `None` otherwise.
///
/// `bar.ts` -> `bar`, `types.d.ts` -> `types.d`. A bare `.ts` is not a script.
pub fn script_name(file_name: &str) -> Option<&str> {
    let stem = file_name.strip_suffix(SCRIPT_EXTENSION)?.strip_suffix('.')?;
    (!stem.is_empty()).then_some(stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::TypeScriptCompiler;
    use crate::compiler::testing::EchoCompiler;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_one_entry_per_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("alpha")).unwrap();
        fs::create_dir(root.join("beta")).unwrap();
        write(root, "notes.txt", "not a mod");
        write(root, "loose.ts", "const a = 1;");

        let report = build_snapshot(root, &EchoCompiler).unwrap();
        let mut names: Vec<_> = report.snapshot.mods().iter().map(|m| m.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["alpha", "beta"]);
        assert!(report.warnings.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_skipped() {
        let temp = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("real")).unwrap();
        write(elsewhere.path(), "bar.ts", "x");
        std::os::unix::fs::symlink(elsewhere.path(), temp.path().join("linked")).unwrap();

        let report = build_snapshot(temp.path(), &EchoCompiler).unwrap();
        let names: Vec<_> = report.snapshot.mods().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["real"]);
    }

    #[test]
    fn test_metadata_and_scripts() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "foo/mod.json", r#"{"author":"Bob","version":2}"#);
        write(root, "foo/bar.ts", "log('bar');");
        write(root, "foo/readme.md", "# foo");

        let report = build_snapshot(root, &EchoCompiler).unwrap();
        let foo = report.snapshot.get("foo").unwrap();
        assert_eq!(foo.author, "Bob");
        assert_eq!(foo.description, "");
        assert_eq!(foo.version, 2);
        assert_eq!(foo.scripts, vec![Script::new("bar", "compiled:log('bar');")]);
    }

    #[test]
    fn test_malformed_metadata_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "foo/mod.json", "{ not json");
        write(root, "foo/bar.ts", "x");

        let report = build_snapshot(root, &EchoCompiler).unwrap();
        let foo = report.snapshot.get("foo").unwrap();
        assert_eq!(foo.author, "Unknown author");
        assert_eq!(foo.description, "");
        assert_eq!(foo.version, 1);
        assert_eq!(foo.scripts.len(), 1);
        assert!(matches!(
            report.warnings.as_slice(),
            [ScanWarning::Metadata { .. }]
        ));
    }

    #[test]
    fn test_compile_failure_omits_script() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "foo/good.ts", "ok");
        write(root, "foo/bad.ts", "!fail");

        let report = build_snapshot(root, &EchoCompiler).unwrap();
        let foo = report.snapshot.get("foo").unwrap();
        assert!(foo.script("good").is_some());
        assert!(foo.script("bad").is_none());
        assert!(matches!(
            report.warnings.as_slice(),
            [ScanWarning::Compile { .. }]
        ));
    }

    #[test]
    fn test_nested_directories_ignored() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "foo/lib/helper.ts", "x");

        let report = build_snapshot(root, &EchoCompiler).unwrap();
        assert!(report.snapshot.get("foo").unwrap().scripts.is_empty());
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(build_snapshot(&temp.path().join("missing"), &EchoCompiler).is_err());
    }

    #[test]
    fn test_connect_payload_end_to_end() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let source = "const greeting: string = 'hi';\nlog(greeting);\n";
        write(root, "foo/mod.json", r#"{"author":"Bob","version":2}"#);
        write(root, "foo/bar.ts", source);

        let compiler = TypeScriptCompiler::new();
        let report = build_snapshot(root, &compiler).unwrap();
        let compiled = compiler.compile(source).unwrap();

        let expected = serde_json::json!([{
            "name": "foo",
            "author": "Bob",
            "description": "",
            "version": 2,
            "scripts": [{ "name": "bar", "code": compiled }],
        }]);
        assert_eq!(serde_json::to_value(&report.snapshot).unwrap(), expected);
    }

    #[test]
    fn test_script_name() {
        assert_eq!(script_name("bar.ts"), Some("bar"));
        assert_eq!(script_name("types.d.ts"), Some("types.d"));
        assert_eq!(script_name(".ts"), None);
        assert_eq!(script_name("bar.tsx"), None);
        assert_eq!(script_name("barts"), None);
        assert_eq!(script_name("mod.json"), None);
    }
}
