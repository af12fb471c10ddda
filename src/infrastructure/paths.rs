//! # Path Resolution
//!
//! Confines every path an action names to the project root. Absolute paths
//! are re-rooted rather than rejected, so `/src/main.rs` means
//! `<root>/src/main.rs`. Resolution never touches the filesystem beyond
//! canonicalization; it creates nothing.

use std::path::{Component, Path, PathBuf};

use crate::domain::errors::PathError;

/// Resolves action-supplied paths against a fixed project root.
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// The root must exist; it is canonicalized once so later containment
    /// checks compare like with like.
    pub fn new(root: &Path) -> Result<Self, PathError> {
        let root = std::fs::canonicalize(root).map_err(|e| PathError::Malformed {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve one action path to a real path under the root.
    ///
    /// The target may not exist yet (create_file). In that case the nearest
    /// existing ancestor is canonicalized and the remaining components are
    /// re-appended, so symlinked ancestors cannot smuggle the result out.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf, PathError> {
        if raw.is_empty() {
            return Err(PathError::Malformed {
                path: raw.to_string(),
                reason: "empty path".to_string(),
            });
        }

        // Re-root absolute paths under the project root.
        let joined = self.root.join(raw.trim_start_matches('/'));
        let normalized = lexical_normalize(&joined, raw)?;
        let real = canonicalize_nearest(&normalized)?;

        if real.starts_with(&self.root) {
            Ok(real)
        } else {
            Err(PathError::OutOfScope(raw.to_string()))
        }
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
/// A `..` that would climb above the first component is an escape attempt
/// reported against the raw input.
fn lexical_normalize(path: &Path, raw: &str) -> Result<PathBuf, PathError> {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                match parts.last() {
                    Some(Component::Normal(_)) => {
                        parts.pop();
                    }
                    _ => return Err(PathError::OutOfScope(raw.to_string())),
                }
            }
            other => parts.push(other),
        }
    }
    Ok(parts.iter().collect())
}

/// Canonicalize the longest existing prefix of `path`, then re-append the
/// nonexistent suffix.
fn canonicalize_nearest(path: &Path) -> Result<PathBuf, PathError> {
    let mut existing = path.to_path_buf();
    let mut suffix: Vec<std::ffi::OsString> = Vec::new();

    loop {
        match std::fs::canonicalize(&existing) {
            Ok(canon) => {
                let mut result = canon;
                for part in suffix.iter().rev() {
                    result.push(part);
                }
                return Ok(result);
            }
            Err(_) => match (existing.file_name(), existing.parent()) {
                (Some(name), Some(parent)) => {
                    suffix.push(name.to_os_string());
                    existing = parent.to_path_buf();
                }
                _ => {
                    return Err(PathError::Malformed {
                        path: path.display().to_string(),
                        reason: "no existing ancestor".to_string(),
                    });
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(dir: &tempfile::TempDir) -> PathResolver {
        PathResolver::new(dir.path()).expect("temp dir canonicalizes")
    }

    #[test]
    fn relative_paths_resolve_under_the_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        let resolver = resolver(&dir);
        let resolved = resolver.resolve("src/main.rs").unwrap();
        assert!(resolved.starts_with(resolver.root()));
        assert!(resolved.ends_with("src/main.rs"));
    }

    #[test]
    fn absolute_paths_are_rerooted() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(&dir);
        let resolved = resolver.resolve("/etc/passwd").unwrap();
        assert!(resolved.starts_with(resolver.root()));
        assert!(resolved.ends_with("etc/passwd"));
    }

    #[test]
    fn parent_traversal_is_out_of_scope() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(&dir);
        let err = resolver.resolve("../outside.txt").unwrap_err();
        assert_eq!(err, PathError::OutOfScope("../outside.txt".into()));
    }

    #[test]
    fn interior_dotdot_stays_contained() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        let resolver = resolver(&dir);
        let resolved = resolver.resolve("src/../notes.md").unwrap();
        assert_eq!(resolved, resolver.root().join("notes.md"));
    }

    #[test]
    fn nonexistent_target_resolves_through_existing_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(&dir);
        let resolved = resolver.resolve("new_dir/new_file.txt").unwrap();
        assert_eq!(resolved, resolver.root().join("new_dir/new_file.txt"));
        assert!(!resolved.exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escape_is_out_of_scope() {
        let outside = tempfile::tempdir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("escape")).unwrap();
        let resolver = resolver(&dir);
        let err = resolver.resolve("escape/secret.txt").unwrap_err();
        assert_eq!(err, PathError::OutOfScope("escape/secret.txt".into()));
    }

    #[test]
    fn empty_path_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(&dir);
        assert!(matches!(
            resolver.resolve(""),
            Err(PathError::Malformed { .. })
        ));
    }
}
