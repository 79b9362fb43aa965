//! Filesystem utilities.

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob, Pattern};
use thiserror::Error;

/// A path that joined outside of its root.
#[derive(Debug, Error)]
#[error("path `{}` escapes its root `{}`", path.display(), root.display())]
pub struct PathOutsideRoot {
    pub root: PathBuf,
    pub path: PathBuf,
}

/// An absolute path paired with the root it must stay within.
///
/// Joins are checked lexically and, for paths that already exist, again
/// after resolving symlinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootedPath {
    root: PathBuf,
    subpath: PathBuf,
}

impl RootedPath {
    /// Create a rooted path pointing at the root itself.
    ///
    /// A relative root is resolved against the current directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let absolute = std::path::absolute(&root).unwrap_or(root);
        RootedPath {
            root: normalize_lexically(&absolute),
            subpath: PathBuf::new(),
        }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path relative to the root.
    pub fn subpath(&self) -> &Path {
        &self.subpath
    }

    /// The full path.
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.subpath)
    }

    /// Join `path` onto this one, refusing to leave the root.
    pub fn join_within_root(&self, path: impl AsRef<Path>) -> Result<RootedPath, PathOutsideRoot> {
        let joined = self.subpath.join(path.as_ref());
        let outside = || PathOutsideRoot {
            root: self.root.clone(),
            path: self.root.join(&joined),
        };

        if joined.is_absolute() {
            return Err(outside());
        }

        let mut subpath = PathBuf::new();
        for component in joined.components() {
            match component {
                Component::Normal(part) => subpath.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !subpath.pop() {
                        return Err(outside());
                    }
                }
                Component::RootDir | Component::Prefix(_) => return Err(outside()),
            }
        }

        let full = self.root.join(&subpath);
        if let (Ok(real_root), Ok(real_full)) = (self.root.canonicalize(), full.canonicalize()) {
            if !is_inside(&real_full, &real_root) {
                return Err(outside());
            }
        }

        Ok(RootedPath {
            root: self.root.clone(),
            subpath,
        })
    }
}

impl fmt::Display for RootedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

/// Resolve `.` and `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Ensure a directory exists, creating it and its parents if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

/// Find paths matching glob patterns relative to a base directory.
pub fn glob_paths(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    let escaped_base = Pattern::escape(&base.to_string_lossy());

    for pattern in patterns {
        let pattern_str = format!("{}/{}", escaped_base.trim_end_matches('/'), pattern);

        for entry in
            glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => results.push(path),
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Check if a path is inside another path.
pub fn is_inside(path: &Path, parent: &Path) -> bool {
    path.starts_with(parent)
}
