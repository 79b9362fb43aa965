//! Repository eligibility checks.
//!
//! Runs before anything is spawned: a project without a yarn classic
//! lockfile, or one set up for Plug'n'Play, is rejected outright.

use std::fs;

use crate::core::project::Project;
use crate::ops::errors::PrefetchError;
use crate::resolver::YARN_CLASSIC_MARKER;

/// Reject projects that cannot be fetched hermetically.
///
/// Checks, in order: the lockfile exists, it is a v1 lockfile, the project
/// does not use PnP. The first failing check wins.
pub fn verify_repository(project: &Project) -> Result<(), PrefetchError> {
    let lockfile_path = project.lockfile_path();
    if !lockfile_path.is_file() {
        return Err(PrefetchError::MissingLockfile {
            path: lockfile_path,
        });
    }

    let text = fs::read_to_string(&lockfile_path).map_err(|source| PrefetchError::Io {
        action: "read",
        path: lockfile_path.clone(),
        source,
    })?;

    check_lockfile_text(project, &text)?;
    check_install_mode(project)
}

/// Whether lockfile text is in the yarn classic format.
pub fn is_v1_lockfile(text: &str) -> bool {
    text.contains(YARN_CLASSIC_MARKER)
}

fn check_lockfile_text(project: &Project, text: &str) -> Result<(), PrefetchError> {
    if is_v1_lockfile(text) {
        Ok(())
    } else {
        Err(PrefetchError::WrongLockfileVersion {
            path: project.source_dir().path(),
        })
    }
}

fn check_install_mode(project: &Project) -> Result<(), PrefetchError> {
    if project.is_pnp_install() {
        Err(PrefetchError::UnsupportedInstallMode {
            path: project.source_dir().path(),
        })
    } else {
        Ok(())
    }
}
