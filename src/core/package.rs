//! Resolved yarn packages.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use url::form_urlencoded::byte_serialize;

/// Variant tag of a [`PackageSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    Registry,
    Git,
    Url,
    File,
    Link,
    Workspace,
}

impl PackageKind {
    /// Whether yarn copies packages of this kind into the offline mirror.
    pub fn is_mirrored(self) -> bool {
        matches!(self, PackageKind::Registry | PackageKind::Git | PackageKind::Url)
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PackageKind::Registry => "registry",
            PackageKind::Git => "git",
            PackageKind::Url => "url",
            PackageKind::File => "file",
            PackageKind::Link => "link",
            PackageKind::Workspace => "workspace",
        };
        write!(f, "{}", s)
    }
}

/// Where a package comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PackageSource {
    /// Tarball from an npm registry.
    Registry {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        integrity: Option<String>,
    },
    /// Git repository at a commit.
    Git { url: String },
    /// Arbitrary tarball URL.
    Url {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        integrity: Option<String>,
    },
    /// `file:` dependency, relative to the project.
    File { path: PathBuf },
    /// `link:` dependency, relative to the project.
    Link { path: PathBuf },
    /// Workspace member, relative to the project.
    Workspace { path: PathBuf },
}

impl PackageSource {
    pub fn kind(&self) -> PackageKind {
        match self {
            PackageSource::Registry { .. } => PackageKind::Registry,
            PackageSource::Git { .. } => PackageKind::Git,
            PackageSource::Url { .. } => PackageKind::Url,
            PackageSource::File { .. } => PackageKind::File,
            PackageSource::Link { .. } => PackageKind::Link,
            PackageSource::Workspace { .. } => PackageKind::Workspace,
        }
    }

    /// Remote URL for registry, git and URL sources.
    pub fn url(&self) -> Option<&str> {
        match self {
            PackageSource::Registry { url, .. }
            | PackageSource::Git { url }
            | PackageSource::Url { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Local path for file, link and workspace sources.
    pub fn path(&self) -> Option<&Path> {
        match self {
            PackageSource::File { path }
            | PackageSource::Link { path }
            | PackageSource::Workspace { path } => Some(path),
            _ => None,
        }
    }
}

/// A package resolved from `yarn.lock`.
///
/// One record per lockfile entry; aliases can produce several equal records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    /// Only reachable through development dependencies.
    pub dev: bool,
    #[serde(flatten)]
    pub source: PackageSource,
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        dev: bool,
        source: PackageSource,
    ) -> Self {
        Package {
            name: name.into(),
            version: version.into(),
            dev,
            source,
        }
    }

    /// Convenience constructor for a registry package.
    pub fn registry(
        name: impl Into<String>,
        version: impl Into<String>,
        url: impl Into<String>,
        dev: bool,
    ) -> Self {
        Package::new(
            name,
            version,
            dev,
            PackageSource::Registry {
                url: url.into(),
                integrity: None,
            },
        )
    }

    pub fn kind(&self) -> PackageKind {
        self.source.kind()
    }

    /// Package URL identifying this package.
    pub fn purl(&self) -> String {
        let mut purl = format!(
            "pkg:npm/{}@{}",
            encode_name(&self.name.to_lowercase()),
            encode(&self.version)
        );

        match &self.source {
            PackageSource::Registry { .. } => {}
            PackageSource::Url { url, .. } => {
                purl.push_str("?download_url=");
                purl.push_str(&encode(url));
            }
            PackageSource::Git { url } => {
                purl.push_str("?vcs_url=");
                purl.push_str(&encode(&vcs_url(url)));
            }
            PackageSource::File { path }
            | PackageSource::Link { path }
            | PackageSource::Workspace { path } => {
                let subpath = path.to_string_lossy();
                let subpath = subpath.trim_matches('/');
                if !subpath.is_empty() && subpath != "." {
                    purl.push('#');
                    purl.push_str(
                        &subpath
                            .split('/')
                            .map(encode)
                            .collect::<Vec<_>>()
                            .join("/"),
                    );
                }
            }
        }

        purl
    }
}

fn encode(s: &str) -> String {
    byte_serialize(s.as_bytes()).collect()
}

/// Encode an npm name, keeping the scope separator.
fn encode_name(name: &str) -> String {
    name.split('/').map(encode).collect::<Vec<_>>().join("/")
}

/// `git+<repo>@<commit>` form of a git dependency URL.
fn vcs_url(url: &str) -> String {
    let url = url.strip_prefix("git+").unwrap_or(url);
    match url.split_once('#') {
        Some((repo, commit)) if !commit.is_empty() => format!("git+{}@{}", repo, commit),
        Some((repo, _)) => format!("git+{}", repo),
        None => format!("git+{}", url),
    }
}
