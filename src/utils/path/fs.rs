//! Path normalization utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_path` - resolve relative paths against a base directory
//! - `relative_to` - watcher paths to root-relative form

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve a configured path. Relative paths are taken from `base_dir`
/// (the config file's directory), then normalized.
#[inline]
pub fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize_path(path);
    }
    normalize_path(&base_dir.join(path))
}

/// Strip `root` from a watcher path.
///
/// Returns `None` for paths outside the root and for the root itself.
pub fn relative_to(path: &Path, root: &Path) -> Option<PathBuf> {
    let relative = path.strip_prefix(root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(relative.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_resolve_path_absolute() {
        let resolved = resolve_path(Path::new("/absolute/mods"), Path::new("/base"));
        assert_eq!(resolved, PathBuf::from("/absolute/mods"));
    }

    #[test]
    fn test_resolve_path_base_dir() {
        let resolved = resolve_path(Path::new("nonexistent/mods"), Path::new("/base"));
        assert_eq!(resolved, PathBuf::from("/base/nonexistent/mods"));
    }

    #[test]
    fn test_relative_to() {
        let root = Path::new("/srv/mods");
        assert_eq!(
            relative_to(Path::new("/srv/mods/foo/bar.ts"), root),
            Some(PathBuf::from("foo/bar.ts"))
        );
        assert_eq!(relative_to(Path::new("/srv/mods"), root), None);
        assert_eq!(relative_to(Path::new("/srv/other/foo"), root), None);
    }
}
