//! Prefetch requests.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::util::fs::RootedPath;

/// One yarn project to prefetch, relative to the request's source directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YarnPackageInput {
    #[serde(default = "default_subpath")]
    pub path: PathBuf,
}

fn default_subpath() -> PathBuf {
    PathBuf::from(".")
}

impl Default for YarnPackageInput {
    fn default() -> Self {
        YarnPackageInput {
            path: default_subpath(),
        }
    }
}

/// A prefetch request covering one or more projects in a repository.
#[derive(Debug, Clone)]
pub struct Request {
    /// Repository root; project subpaths may not leave it.
    pub source_dir: RootedPath,
    /// Where the offline mirror is written.
    pub output_dir: RootedPath,
    /// Projects to process, in order.
    pub yarn_packages: Vec<YarnPackageInput>,
}

impl Request {
    /// Create a request. An empty project list means the repository root.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        subpaths: Vec<PathBuf>,
    ) -> Self {
        let yarn_packages = if subpaths.is_empty() {
            vec![YarnPackageInput::default()]
        } else {
            subpaths
                .into_iter()
                .map(|path| YarnPackageInput { path })
                .collect()
        };

        Request {
            source_dir: RootedPath::new(source_dir),
            output_dir: RootedPath::new(output_dir),
            yarn_packages,
        }
    }
}
