//! Test fixtures for common test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::package::{Package, PackageSource};
use crate::core::project::Project;
use crate::util::fs::RootedPath;
use crate::util::process::ProcessOutput;

/// Header yarn 1.x writes at the top of `yarn.lock`.
pub const V1_LOCKFILE_HEADER: &str = "# THIS IS AN AUTOGENERATED FILE. DO NOT EDIT THIS FILE DIRECTLY.\n\
# yarn lockfile v1\n\n\n";

/// A yarn project laid out on disk by tests.
#[derive(Debug, Clone)]
pub struct YarnProjectFixture {
    /// package.json content.
    pub package_json: String,
    /// yarn.lock content, `None` to leave the lockfile out.
    pub lockfile: Option<String>,
    /// Extra files (path relative to project root -> content).
    pub files: Vec<(PathBuf, String)>,
}

impl YarnProjectFixture {
    /// A project with the given package.json and an empty v1 lockfile.
    pub fn new(package_json: impl Into<String>) -> Self {
        YarnProjectFixture {
            package_json: package_json.into(),
            lockfile: Some(V1_LOCKFILE_HEADER.to_string()),
            files: Vec::new(),
        }
    }

    /// A minimal valid project.
    pub fn minimal() -> Self {
        YarnProjectFixture::new(r#"{"name": "app", "version": "1.0.0"}"#)
    }

    /// Drop the lockfile.
    pub fn without_lockfile(mut self) -> Self {
        self.lockfile = None;
        self
    }

    /// Replace the lockfile text entirely.
    pub fn with_lockfile(mut self, text: impl Into<String>) -> Self {
        self.lockfile = Some(text.into());
        self
    }

    /// Append a lockfile entry.
    pub fn with_entry(
        mut self,
        specifier: &str,
        version: &str,
        resolved: &str,
        dependencies: &[(&str, &str)],
    ) -> Self {
        let mut entry = format!(
            "\"{}\":\n  version \"{}\"\n  resolved \"{}\"\n",
            specifier, version, resolved
        );
        if !dependencies.is_empty() {
            entry.push_str("  dependencies:\n");
            for (name, range) in dependencies {
                entry.push_str(&format!("    \"{}\" \"{}\"\n", name, range));
            }
        }
        self.with_raw_entry(entry)
    }

    /// Append raw lockfile text.
    pub fn with_raw_entry(mut self, text: impl AsRef<str>) -> Self {
        let lockfile = self.lockfile.get_or_insert_with(String::new);
        if !lockfile.is_empty() && !lockfile.ends_with("\n\n") {
            lockfile.push('\n');
        }
        lockfile.push_str(text.as_ref());
        self
    }

    /// Add an extra file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }

    /// Write the fixture into `dir`.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<()> {
        fs::create_dir_all(dir)?;
        fs::write(dir.join("package.json"), &self.package_json)?;
        if let Some(ref lockfile) = self.lockfile {
            fs::write(dir.join("yarn.lock"), lockfile)?;
        }
        for (path, content) in &self.files {
            let full = dir.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(full, content)?;
        }
        Ok(())
    }

    /// Write the fixture into `dir` and load it as a [`Project`].
    pub fn write_project(&self, dir: &Path) -> Project {
        self.write_to(dir).expect("write fixture");
        Project::from_source_dir(RootedPath::new(dir)).expect("load fixture project")
    }
}

/// Canned yarn outputs.
pub mod yarn_outputs {
    use super::ProcessOutput;

    /// `yarn --version` output.
    pub fn version(version: &str) -> ProcessOutput {
        ProcessOutput::success(format!("{}\n", version))
    }

    /// Successful `yarn install`.
    pub fn install_success() -> ProcessOutput {
        ProcessOutput::success("[1/4] Resolving packages...\nDone in 0.42s.\n")
    }

    /// `yarn install --frozen-lockfile` with an outdated lockfile.
    pub fn install_outdated_lockfile() -> ProcessOutput {
        ProcessOutput::failure(
            1,
            "error Your lockfile needs to be updated, but yarn was run with `--frozen-lockfile`.\n",
        )
    }
}

/// A registry package with a yarnpkg tarball URL.
pub fn registry_package(name: &str, version: &str, dev: bool) -> Package {
    let basename = name.rsplit('/').next().unwrap_or(name);
    Package::registry(
        name,
        version,
        format!(
            "https://registry.yarnpkg.com/{}/-/{}-{}.tgz",
            name, basename, version
        ),
        dev,
    )
}

/// A workspace package at `path`.
pub fn workspace_package(name: &str, path: &str) -> Package {
    Package::new(
        name,
        "0.0.0",
        false,
        PackageSource::Workspace {
            path: PathBuf::from(path),
        },
    )
}
