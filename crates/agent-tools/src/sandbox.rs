//! Path confinement shared by every filesystem and execution tool.
//!
//! A [`WorkingRoot`] is the one directory tools may touch. Every caller-supplied
//! path goes through [`WorkingRoot::resolve`] before it reaches the filesystem
//! or a child process.

use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathGuardError {
    /// The path resolves somewhere outside the working root. Carries the path
    /// exactly as the caller wrote it.
    #[error("path '{0}' resolves outside the working directory")]
    OutsideRoot(String),

    #[error("cannot resolve path '{path}': {source}")]
    Unresolvable {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// The sandbox boundary, stored in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingRoot {
    root: PathBuf,
}

impl WorkingRoot {
    /// Canonicalizes `path` and checks that it is an existing directory.
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let root = path.as_ref().canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("working root '{}' is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolves `relative` against the root and returns the canonical absolute
    /// path if it stays inside.
    ///
    /// Absolute inputs replace the root when joined, so they are only accepted
    /// when they point back inside it. Symlinks are followed for the part of
    /// the path that exists; a not-yet-created tail is appended to its nearest
    /// existing ancestor after that ancestor has been canonicalized.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, PathGuardError> {
        let joined = normalize_lexical(&self.root.join(relative));

        let mut ancestor = joined.clone();
        // missing components, deepest first
        let mut missing: Vec<OsString> = Vec::new();
        // symlink_metadata so a dangling link counts as present and then fails
        // to canonicalize instead of being written through
        while ancestor.symlink_metadata().is_err() {
            match ancestor.file_name() {
                Some(name) => missing.push(name.to_os_string()),
                None => break,
            }
            if !ancestor.pop() {
                break;
            }
        }

        let mut resolved = ancestor
            .canonicalize()
            .map_err(|source| PathGuardError::Unresolvable {
                path: relative.to_string(),
                source,
            })?;
        for name in missing.iter().rev() {
            resolved.push(name);
        }

        if self.contains_resolved(&resolved) {
            Ok(resolved)
        } else {
            log::debug!(
                "rejected path '{}' (resolved to {})",
                relative,
                resolved.display()
            );
            Err(PathGuardError::OutsideRoot(relative.to_string()))
        }
    }

    /// Whether `relative` resolves inside the root.
    pub fn contains(&self, relative: &str) -> bool {
        self.resolve(relative).is_ok()
    }

    // `Path::starts_with` compares whole components, so `/root-evil` is not
    // inside `/root`.
    fn contains_resolved(&self, resolved: &Path) -> bool {
        resolved.starts_with(&self.root)
    }
}

/// Resolves `.` and `..` without touching the filesystem.
fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::ParentDir => {
                // never pop past the filesystem root
                if !out.pop() {
                    out.push(comp);
                }
            }
            Component::CurDir => {}
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sandbox() -> (TempDir, WorkingRoot) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg/calc.py"), "print(1)").unwrap();
        let root = WorkingRoot::new(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn root_itself_is_inside() {
        let (_dir, root) = sandbox();
        assert_eq!(root.resolve(".").unwrap(), root.path());
        assert_eq!(root.resolve("").unwrap(), root.path());
        assert!(root.contains("pkg/.."));
    }

    #[test]
    fn nested_existing_and_missing_paths_are_inside() {
        let (_dir, root) = sandbox();
        assert_eq!(
            root.resolve("pkg/calc.py").unwrap(),
            root.path().join("pkg/calc.py")
        );
        assert_eq!(
            root.resolve("new/dir/file.txt").unwrap(),
            root.path().join("new/dir/file.txt")
        );
        assert!(root.contains("pkg/../pkg/./calc.py"));
    }

    #[test]
    fn missing_file_resolves_without_trailing_separator() {
        let (_dir, root) = sandbox();
        for path in ["new.txt", "pkg/new.txt", "a/b/c.txt"] {
            let resolved = root.resolve(path).unwrap();
            let text = resolved.to_string_lossy();
            assert!(!text.ends_with('/'), "{path} resolved to {text}");
            assert_eq!(text, root.path().join(path).to_string_lossy());
            assert_eq!(resolved.file_name().unwrap(), Path::new(path).file_name().unwrap());
        }
    }

    #[test]
    fn parent_escapes_are_rejected() {
        let (_dir, root) = sandbox();
        for path in ["..", "../../secret", "pkg/../../outside.txt", "missing/../../x"] {
            let error = root.resolve(path).unwrap_err();
            assert!(
                matches!(&error, PathGuardError::OutsideRoot(p) if p == path),
                "{path} should be rejected, got {error:?}"
            );
        }
    }

    #[test]
    fn absolute_paths_outside_are_rejected() {
        let (_dir, root) = sandbox();
        assert!(!root.contains("/etc/passwd"));
        assert!(!root.contains("/"));
    }

    #[test]
    fn absolute_path_inside_is_accepted() {
        let (_dir, root) = sandbox();
        let inside = root.path().join("pkg").to_string_lossy().to_string();
        assert_eq!(root.resolve(&inside).unwrap(), root.path().join("pkg"));
    }

    #[test]
    fn sibling_with_shared_prefix_is_rejected() {
        let parent = TempDir::new().unwrap();
        std::fs::create_dir_all(parent.path().join("root")).unwrap();
        std::fs::create_dir_all(parent.path().join("root-evil")).unwrap();
        let root = WorkingRoot::new(parent.path().join("root")).unwrap();

        assert!(!root.contains("../root-evil"));
        assert!(!root.contains("../root-evil/file.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escapes_are_rejected() {
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "secret").unwrap();
        let (dir, root) = sandbox();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        assert!(!root.contains("link"));
        assert!(!root.contains("link/secret.txt"));
        assert!(!root.contains("link/not-yet-created.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_within_root_is_accepted() {
        let (dir, root) = sandbox();
        std::os::unix::fs::symlink(dir.path().join("pkg"), dir.path().join("alias")).unwrap();

        assert_eq!(
            root.resolve("alias/calc.py").unwrap(),
            root.path().join("pkg/calc.py")
        );
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_not_treated_as_missing() {
        let outside = TempDir::new().unwrap();
        let (dir, root) = sandbox();
        std::os::unix::fs::symlink(
            outside.path().join("created-later.txt"),
            dir.path().join("dangling"),
        )
        .unwrap();

        assert!(root.resolve("dangling").is_err());
    }

    #[test]
    fn new_rejects_files() {
        let (dir, _root) = sandbox();
        let error = WorkingRoot::new(dir.path().join("pkg/calc.py")).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
        assert!(WorkingRoot::new(dir.path().join("missing")).is_err());
    }
}
