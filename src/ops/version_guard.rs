//! Check the yarn that corepack resolves in the prefetch environment.

use std::path::Path;

use semver::Version;

use crate::ops::env::EnvMap;
use crate::ops::errors::PrefetchError;
use crate::ops::yarn::Yarn;
use crate::util::events::{EventSink, PrefetchEvent};
use crate::util::version::{parse_version_lenient, VersionsRange};

/// Yarn releases that still behave as yarn classic: `>=1.22.0,<2.0.0`.
pub fn yarn_classic_range() -> VersionsRange {
    VersionsRange::new(Version::new(1, 22, 0), Version::new(2, 0, 0))
}

/// Accept `version` only if it falls inside [`yarn_classic_range`].
pub fn check_yarn_version(version: &Version) -> Result<(), PrefetchError> {
    let expected = yarn_classic_range();
    if expected.contains(version) {
        Ok(())
    } else {
        Err(PrefetchError::VersionMismatch {
            expected,
            found: version.clone(),
        })
    }
}

/// Ask yarn for its version, running it exactly as the install will.
pub fn installed_yarn_version(
    yarn: &Yarn<'_>,
    source_dir: &Path,
    env: &EnvMap,
) -> Result<Version, PrefetchError> {
    let output = yarn.run(&["--version"], source_dir, env)?;

    if !output.is_success() {
        let detail = if output.stderr.trim().is_empty() {
            output.stdout
        } else {
            output.stderr
        };
        return Err(PrefetchError::VersionUnavailable {
            output: detail.trim().to_string(),
        });
    }

    let raw = output.stdout.trim();
    parse_version_lenient(raw).ok_or_else(|| PrefetchError::VersionUnavailable {
        output: raw.to_string(),
    })
}

/// Fail unless the installed yarn is a supported yarn classic release.
pub fn verify_yarn_version(
    yarn: &Yarn<'_>,
    source_dir: &Path,
    env: &EnvMap,
    events: &dyn EventSink,
) -> Result<Version, PrefetchError> {
    let version = installed_yarn_version(yarn, source_dir, env)?;
    check_yarn_version(&version)?;

    events.emit(PrefetchEvent::YarnVersion {
        version: version.to_string(),
    });
    Ok(version)
}
