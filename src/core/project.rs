//! A yarn classic project on disk.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::util::fs::{glob_paths, RootedPath};

/// File name of the yarn classic lockfile.
pub const LOCKFILE_NAME: &str = "yarn.lock";

/// File name of the npm manifest.
pub const PACKAGE_JSON_NAME: &str = "package.json";

/// Error reading `package.json`.
#[derive(Debug, Error)]
pub enum PackageJsonError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Parsed `package.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageJson {
    data: Value,
}

impl From<Value> for PackageJson {
    fn from(data: Value) -> Self {
        PackageJson { data }
    }
}

impl PackageJson {
    /// Read and parse a `package.json` file.
    pub fn from_file(path: &Path) -> Result<Self, PackageJsonError> {
        let text = std::fs::read_to_string(path).map_err(|source| PackageJsonError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let data: Value = serde_json::from_str(&text).map_err(|source| PackageJsonError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(PackageJson::from(data))
    }

    pub fn name(&self) -> Option<&str> {
        self.data.get("name").and_then(Value::as_str)
    }

    pub fn version(&self) -> Option<&str> {
        self.data.get("version").and_then(Value::as_str)
    }

    /// `installConfig.pnp`
    pub fn pnp_enabled(&self) -> bool {
        self.data
            .get("installConfig")
            .and_then(|config| config.get("pnp"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// `(name, range)` pairs of a dependency table such as `dependencies`.
    pub fn dependency_table(&self, table: &str) -> Vec<(String, String)> {
        self.data
            .get(table)
            .and_then(Value::as_object)
            .map(|deps| {
                deps.iter()
                    .filter_map(|(name, range)| {
                        range.as_str().map(|range| (name.clone(), range.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Workspace globs, in either the array or the `{ packages: [...] }` form.
    pub fn workspaces(&self) -> Vec<String> {
        let workspaces = match self.data.get("workspaces") {
            Some(Value::Array(items)) => Some(items),
            Some(Value::Object(obj)) => obj.get("packages").and_then(Value::as_array),
            _ => None,
        };

        workspaces
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A directory holding a yarn classic project.
///
/// Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Project {
    source_dir: RootedPath,
    package_json: Option<PackageJson>,
    is_pnp_install: bool,
}

impl Project {
    /// Load the project rooted at `source_dir`.
    ///
    /// A missing `package.json` is tolerated here so that repository
    /// validation can report the more specific problem.
    pub fn from_source_dir(source_dir: RootedPath) -> Result<Self, PackageJsonError> {
        let dir = source_dir.path();
        let manifest_path = dir.join(PACKAGE_JSON_NAME);

        let package_json = if manifest_path.is_file() {
            Some(PackageJson::from_file(&manifest_path)?)
        } else {
            None
        };

        let is_pnp_install = package_json.as_ref().is_some_and(PackageJson::pnp_enabled)
            || has_pnp_loader(&dir);

        Ok(Project {
            source_dir,
            package_json,
            is_pnp_install,
        })
    }

    pub fn source_dir(&self) -> &RootedPath {
        &self.source_dir
    }

    pub fn package_json(&self) -> Option<&PackageJson> {
        self.package_json.as_ref()
    }

    /// Whether the project is set up for Plug'n'Play installs.
    pub fn is_pnp_install(&self) -> bool {
        self.is_pnp_install
    }

    /// Path of `yarn.lock`.
    pub fn lockfile_path(&self) -> PathBuf {
        self.source_dir.path().join(LOCKFILE_NAME)
    }
}

/// Any generated `*.pnp.cjs` loader in the project directory.
fn has_pnp_loader(dir: &Path) -> bool {
    match glob_paths(dir, &["*.pnp.cjs".to_string()]) {
        Ok(found) => !found.is_empty(),
        Err(e) => {
            tracing::warn!("could not scan {} for PnP loaders: {:#}", dir.display(), e);
            false
        }
    }
}
