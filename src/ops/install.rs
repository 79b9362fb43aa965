//! Populate the offline mirror with `yarn install`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::ops::env::{mirror_dir, EnvMap};
use crate::ops::errors::PrefetchError;
use crate::ops::yarn::Yarn;
use crate::util::events::{EventSink, PrefetchEvent};
use crate::util::fs::RootedPath;

/// Arguments for the hermetic install.
pub const INSTALL_ARGS: &[&str] = &[
    "install",
    "--disable-pnp",
    "--frozen-lockfile",
    "--ignore-engines",
    "--no-default-rc",
    "--non-interactive",
];

/// Create the offline mirror directory. Safe to call repeatedly.
pub fn ensure_mirror_dir(output_dir: &RootedPath) -> Result<PathBuf, PrefetchError> {
    let mirror = mirror_dir(output_dir)?.path();
    fs::create_dir_all(&mirror).map_err(|source| PrefetchError::Io {
        action: "create",
        path: mirror.clone(),
        source,
    })?;
    Ok(mirror)
}

/// Run `yarn install` in `source_dir`, writing every tarball to the mirror.
pub fn fetch_dependencies(
    yarn: &Yarn<'_>,
    source_dir: &Path,
    output_dir: &RootedPath,
    env: &EnvMap,
    events: &dyn EventSink,
) -> Result<(), PrefetchError> {
    let mirror = ensure_mirror_dir(output_dir)?;

    let cmd = yarn.command(INSTALL_ARGS, source_dir, env);
    events.emit(PrefetchEvent::InstallStarted {
        command: cmd.display_command(),
        mirror_dir: mirror,
    });

    let output = yarn.run(INSTALL_ARGS, source_dir, env)?;
    if output.is_success() {
        return Ok(());
    }

    Err(PrefetchError::FetchFailure {
        command: cmd.display_command(),
        status: output.status,
        stderr: output.stderr,
    })
}
