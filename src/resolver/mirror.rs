//! Offline mirror file names.
//!
//! yarn stores every fetched tarball in the mirror under a name derived
//! from its URL. These functions reproduce that naming so the mirror can be
//! checked without asking yarn.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::core::package::{Package, PackageSource};

/// Default npm registries. Tarballs from these hosts are registry packages.
pub const DEFAULT_REGISTRIES: &[&str] = &["registry.yarnpkg.com", "registry.npmjs.org"];

/// `<@scope>/<name>/-/<file>` tail of a registry tarball path.
///
/// Unanchored at the start so registries served under a path prefix match.
/// The scope separator may be `%2f` and `_attachments` may replace `-`.
static REGISTRY_TARBALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:(@[^/]+)(?:/|%2f))?[^/]+/(?:-|_attachments)/(?:@[^/]+/)?([^/]+)$")
        .expect("valid regex")
});

fn url_path(url: &str) -> String {
    let url = url.trim();
    let without_fragment = url.split('#').next().unwrap_or(url);
    match Url::parse(without_fragment) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => without_fragment
            .split('?')
            .next()
            .unwrap_or(without_fragment)
            .to_string(),
    }
}

/// Mirror file name for a registry or URL tarball.
///
/// Scoped registry tarballs are prefixed with their scope so that
/// `@a/util` and `@b/util` do not share `util-1.0.0.tgz`.
pub fn tarball_mirror_name(url: &str) -> String {
    let path = url_path(url);

    if let Some(caps) = REGISTRY_TARBALL.captures(&path) {
        let file = &caps[2];
        return match caps.get(1) {
            Some(scope) => format!("{}-{}", scope.as_str(), file),
            None => file.to_string(),
        };
    }

    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Mirror file name for a git dependency: `<repo basename>-<commit>`.
pub fn git_tarball_mirror_name(url: &str) -> String {
    let url = url.trim();
    let (base, commit) = url.split_once('#').unwrap_or((url, ""));
    let base = base.split('?').next().unwrap_or(base).trim_end_matches('/');
    let name = base.rsplit('/').next().unwrap_or(base);

    let filename = if commit.is_empty() {
        name.to_string()
    } else {
        format!("{}-{}", name, commit)
    };

    match filename.strip_prefix(':') {
        Some(stripped) => stripped.to_string(),
        None => filename,
    }
}

/// Mirror file name of a package, `None` for kinds yarn does not mirror.
pub fn mirror_name(package: &Package) -> Option<String> {
    match &package.source {
        PackageSource::Registry { url, .. } | PackageSource::Url { url, .. } => {
            Some(tarball_mirror_name(url))
        }
        PackageSource::Git { url } => Some(git_tarball_mirror_name(url)),
        PackageSource::File { .. } | PackageSource::Link { .. } | PackageSource::Workspace { .. } => {
            None
        }
    }
}

/// Whether `url` points at a tarball on an npm registry.
pub fn is_registry_tarball(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    let default_host = parsed
        .host_str()
        .is_some_and(|host| DEFAULT_REGISTRIES.contains(&host));
    default_host || REGISTRY_TARBALL.is_match(parsed.path())
}
