//! Turn `yarn.lock` into typed packages.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::core::package::{Package, PackageSource};
use crate::core::project::{PackageJson, Project, PACKAGE_JSON_NAME};
use crate::resolver::errors::ResolveError;
use crate::resolver::lockfile::{split_specifier, LockfileEntry, YarnLock};
use crate::resolver::mirror::{is_registry_tarball, mirror_name};
use crate::resolver::Resolver;
use crate::util::fs::glob_paths;

/// Dependency tables that make a package part of the production graph.
const PRODUCTION_TABLES: &[&str] = &["dependencies", "optionalDependencies"];

/// [`Resolver`] that reads `yarn.lock` and `package.json` from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LockfileResolver;

impl Resolver for LockfileResolver {
    fn resolve(&self, project: &Project, mirror_dir: &Path) -> Result<Vec<Package>, ResolveError> {
        let source_dir = project.source_dir().path();
        let package_json = project
            .package_json()
            .ok_or_else(|| ResolveError::MissingPackageJson {
                dir: source_dir.clone(),
            })?;

        let lock = YarnLock::from_file(&project.lockfile_path())?;
        let workspaces = load_workspaces(&source_dir, package_json)?;

        let mut roots = vec![package_json];
        roots.extend(workspaces.iter().map(|(_, pj)| pj));
        let production = production_entries(&lock, &roots);

        let mut packages = Vec::with_capacity(lock.entries().len() + workspaces.len());
        for (idx, entry) in lock.entries().iter().enumerate() {
            let package = classify_entry(entry, !production.contains(&idx))?;
            warn_if_missing_from_mirror(&package, mirror_dir);
            packages.push(package);
        }

        for (path, pj) in &workspaces {
            packages.push(Package::new(
                pj.name().unwrap_or_default(),
                pj.version().unwrap_or_default(),
                false,
                PackageSource::Workspace { path: path.clone() },
            ));
        }

        Ok(packages)
    }
}

/// Workspace members as `(path relative to the project, package.json)`.
fn load_workspaces(
    source_dir: &Path,
    package_json: &PackageJson,
) -> Result<Vec<(PathBuf, PackageJson)>, ResolveError> {
    let mut members = Vec::new();

    for pattern in package_json.workspaces() {
        let matches = glob_paths(source_dir, std::slice::from_ref(&pattern)).map_err(|e| {
            ResolveError::Workspace {
                pattern: pattern.clone(),
                message: format!("{:#}", e),
            }
        })?;

        for dir in matches {
            let manifest = dir.join(PACKAGE_JSON_NAME);
            if !manifest.is_file() {
                continue;
            }
            let relative = dir.strip_prefix(source_dir).unwrap_or(&dir).to_path_buf();
            if members.iter().any(|(path, _)| path == &relative) {
                continue;
            }
            members.push((relative, PackageJson::from_file(&manifest)?));
        }
    }

    Ok(members)
}

/// Entries reachable from the production dependencies of any root.
fn production_entries(lock: &YarnLock, roots: &[&PackageJson]) -> HashSet<usize> {
    let mut seen = HashSet::new();
    let mut queue: VecDeque<usize> = roots
        .iter()
        .flat_map(|pj| {
            PRODUCTION_TABLES
                .iter()
                .flat_map(move |table| pj.dependency_table(table))
        })
        .filter_map(|(name, range)| lock.find(&name, &range))
        .collect();

    while let Some(idx) = queue.pop_front() {
        if !seen.insert(idx) {
            continue;
        }
        let entry = &lock.entries()[idx];
        for (name, range) in entry.all_dependencies() {
            if let Some(dep) = lock.find(name, range) {
                if !seen.contains(&dep) {
                    queue.push_back(dep);
                }
            }
        }
    }

    seen
}

/// Real package name, looking through `alias@npm:real@range` specifiers.
fn package_name(specifier: &str) -> &str {
    let (name, range) = split_specifier(specifier);
    match range.strip_prefix("npm:") {
        Some(target) if target.contains('@') => split_specifier(target).0,
        Some(target) if !target.is_empty() => target,
        _ => name,
    }
}

fn looks_like_git(url: &str) -> bool {
    url.starts_with("git+")
        || url.starts_with("git://")
        || url.starts_with("git@")
        || url.starts_with("ssh://")
        || url.contains(".git#")
        || url.ends_with(".git")
}

fn classify_entry(entry: &LockfileEntry, dev: bool) -> Result<Package, ResolveError> {
    let specifier = entry.primary_specifier();
    let name = package_name(specifier);
    let (_, range) = split_specifier(specifier);

    let local = |prefix: &str| {
        range
            .strip_prefix(prefix)
            .map(|p| PathBuf::from(p.trim_start_matches("./")))
    };

    let source = if let Some(path) = local("link:") {
        PackageSource::Link { path }
    } else if let Some(path) = local("file:") {
        PackageSource::File { path }
    } else {
        let url = entry
            .resolved
            .clone()
            .ok_or_else(|| ResolveError::UnsupportedEntry {
                specifier: specifier.to_string(),
                reason: "missing `resolved` field".to_string(),
            })?;

        if let Some(path) = url.strip_prefix("file:") {
            PackageSource::File {
                path: PathBuf::from(path.trim_start_matches("./")),
            }
        } else if looks_like_git(&url) {
            PackageSource::Git { url }
        } else if is_registry_tarball(&url) {
            PackageSource::Registry {
                url,
                integrity: entry.integrity.clone(),
            }
        } else if url.starts_with("http://") || url.starts_with("https://") {
            PackageSource::Url {
                url,
                integrity: entry.integrity.clone(),
            }
        } else {
            return Err(ResolveError::UnsupportedEntry {
                specifier: specifier.to_string(),
                reason: format!("unrecognized `resolved` value `{}`", url),
            });
        }
    };

    Ok(Package::new(name, entry.version.clone(), dev, source))
}

fn warn_if_missing_from_mirror(package: &Package, mirror_dir: &Path) {
    let Some(filename) = mirror_name(package) else {
        return;
    };

    if !mirror_dir.join(&filename).exists() {
        tracing::warn!(
            "{}@{} was not found in the offline mirror as {}",
            package.name,
            package.version,
            filename
        );
    }
}
