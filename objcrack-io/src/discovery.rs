//! Discovering OBJ files under a library root
//!
//! Folders that contain a `*.bad` file hold assets that were fixed by hand;
//! batch operations leave them alone unless asked otherwise.

use crate::error::{IoError, Result};
use crate::reader::is_obj_path;
use glob::Pattern;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Configuration for OBJ discovery
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Also return files from folders marked as manually fixed
    pub include_fixed: bool,
    /// Extension of the marker file that flags a folder as manually fixed
    pub fixed_marker_extension: String,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            include_fixed: false,
            fixed_marker_extension: "bad".to_string(),
        }
    }
}

impl DiscoveryOptions {
    /// Include or skip folders holding a fixed marker
    pub fn with_include_fixed(mut self, include: bool) -> Self {
        self.include_fixed = include;
        self
    }

    /// Use a different marker extension
    pub fn with_fixed_marker_extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.fixed_marker_extension = extension.into();
        self
    }
}

fn escaped(path: &Path) -> Result<String> {
    let text = path.to_str().ok_or_else(|| IoError::Pattern {
        message: format!("path is not valid UTF-8: {}", path.display()),
    })?;
    Ok(Pattern::escape(text))
}

fn run_glob(pattern: &str) -> Result<glob::Paths> {
    glob::glob(pattern).map_err(|e| IoError::Pattern {
        message: format!("{}: {}", pattern, e),
    })
}

/// True if `dir` directly contains a marker file with the given extension
pub fn is_fixed_dir(dir: &Path, marker_extension: &str) -> Result<bool> {
    let pattern = format!("{}/*.{}", escaped(dir)?, Pattern::escape(marker_extension));
    Ok(run_glob(&pattern)?.flatten().any(|path| path.is_file()))
}

/// Find every `.obj` file under `root`, sorted by path
///
/// A `root` that is itself an OBJ file is returned as the only result.
pub fn discover<P: AsRef<Path>>(root: P, options: &DiscoveryOptions) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    if root.is_file() {
        return Ok(if is_obj_path(root) { vec![root.to_path_buf()] } else { Vec::new() });
    }
    if !root.is_dir() {
        return Err(IoError::read(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "library root is not a directory"),
        ));
    }

    let pattern = format!("{}/**/*.[oO][bB][jJ]", escaped(root)?);
    let mut fixed_dirs: HashMap<PathBuf, bool> = HashMap::new();
    let mut found = Vec::new();

    for entry in run_glob(&pattern)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(path = %e.path().display(), error = %e.error(), "skipping unreadable entry");
                continue;
            }
        };
        if !path.is_file() || !is_obj_path(&path) {
            continue;
        }

        if !options.include_fixed {
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let fixed = match fixed_dirs.get(&dir) {
                Some(&fixed) => fixed,
                None => {
                    let fixed = is_fixed_dir(&dir, &options.fixed_marker_extension)?;
                    if fixed {
                        tracing::info!(dir = %dir.display(), "skipping manually fixed folder");
                    }
                    fixed_dirs.insert(dir, fixed);
                    fixed
                }
            };
            if fixed {
                continue;
            }
        }

        found.push(path);
    }

    found.sort();
    tracing::debug!(root = %root.display(), count = found.len(), "discovered OBJ files");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn library() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("forest/rocks")).unwrap();
        fs::create_dir_all(root.join("forest/fixed")).unwrap();
        fs::create_dir_all(root.join("beach")).unwrap();
        fs::write(root.join("forest/rocks/rock_LOD0.obj"), "# o A\n").unwrap();
        fs::write(root.join("forest/rocks/rock_LOD1.OBJ"), "# o A\n").unwrap();
        fs::write(root.join("forest/rocks/rock.fbx"), "").unwrap();
        fs::write(root.join("forest/fixed/tree.obj"), "# o A\n").unwrap();
        fs::write(root.join("forest/fixed/tree.bad"), "").unwrap();
        fs::write(root.join("beach/shell.obj"), "# o A\n").unwrap();
        fs::write(root.join("beach/shell.obj.partial"), "").unwrap();
        dir
    }

    #[test]
    fn test_discover_skips_fixed_folders() {
        let dir = library();
        let found = discover(dir.path(), &DiscoveryOptions::default()).unwrap();
        let expected = vec![
            dir.path().join("beach/shell.obj"),
            dir.path().join("forest/rocks/rock_LOD0.obj"),
            dir.path().join("forest/rocks/rock_LOD1.OBJ"),
        ];
        assert_eq!(found, expected);
    }

    #[test]
    fn test_discover_includes_fixed_folders_on_request() {
        let dir = library();
        let options = DiscoveryOptions::default().with_include_fixed(true);
        let found = discover(dir.path(), &options).unwrap();
        assert_eq!(found.len(), 4);
        assert!(found.contains(&dir.path().join("forest/fixed/tree.obj")));
    }

    #[test]
    fn test_discover_single_file() {
        let dir = library();
        let file = dir.path().join("beach/shell.obj");
        assert_eq!(discover(&file, &DiscoveryOptions::default()).unwrap(), vec![file]);
    }

    #[test]
    fn test_discover_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(dir.path().join("missing"), &DiscoveryOptions::default()).unwrap_err();
        assert!(matches!(err, IoError::Read { .. }));
    }

    #[test]
    fn test_is_fixed_dir() {
        let dir = library();
        assert!(is_fixed_dir(&dir.path().join("forest/fixed"), "bad").unwrap());
        assert!(!is_fixed_dir(&dir.path().join("forest/rocks"), "bad").unwrap());
        assert!(!is_fixed_dir(&dir.path().join("forest"), "bad").unwrap());
    }
}
