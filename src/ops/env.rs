//! Environments for fetching and for the later offline build.

use std::collections::BTreeMap;
use std::io;

use crate::core::component::EnvironmentVariable;
use crate::ops::errors::PrefetchError;
use crate::util::fs::{PathOutsideRoot, RootedPath};

/// Offline mirror location relative to the output directory.
pub const MIRROR_DIR: &str = "deps/yarn-classic";

/// Placeholder the build environment uses for the output directory.
pub const OUTPUT_DIR_PLACEHOLDER: &str = "${output_dir}";

/// Environment variables as passed to a subprocess.
pub type EnvMap = BTreeMap<String, String>;

/// The offline mirror directory under `output_dir`.
pub fn mirror_dir(output_dir: &RootedPath) -> Result<RootedPath, PathOutsideRoot> {
    output_dir.join_within_root(MIRROR_DIR)
}

/// Variables for running yarn during the prefetch.
///
/// Corepack may not prompt or honor the project's `packageManager` pin,
/// yarn ignores `yarn-path` overrides and lifecycle scripts, and every
/// tarball lands in the unpruned offline mirror.
pub fn prefetch_environment(
    output_dir: &RootedPath,
    network_timeout_ms: u64,
) -> Result<EnvMap, PrefetchError> {
    let mirror = mirror_dir(output_dir)?.path();
    let mirror = match mirror.to_str() {
        Some(mirror) => mirror.to_string(),
        None => {
            return Err(PrefetchError::Io {
                action: "use output directory",
                source: io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8"),
                path: mirror,
            })
        }
    };

    let vars = [
        ("COREPACK_ENABLE_DOWNLOAD_PROMPT", "0".to_string()),
        ("COREPACK_ENABLE_PROJECT_SPEC", "0".to_string()),
        ("YARN_IGNORE_PATH", "true".to_string()),
        ("YARN_IGNORE_SCRIPTS", "true".to_string()),
        ("YARN_NETWORK_TIMEOUT", network_timeout_ms.to_string()),
        ("YARN_YARN_OFFLINE_MIRROR", mirror),
        ("YARN_YARN_OFFLINE_MIRROR_PRUNING", "false".to_string()),
    ];

    Ok(vars
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect())
}

/// Variables the offline build needs, with the output directory left as
/// [`OUTPUT_DIR_PLACEHOLDER`].
pub fn build_environment() -> Vec<EnvironmentVariable> {
    vec![
        EnvironmentVariable::new(
            "YARN_YARN_OFFLINE_MIRROR",
            format!("{}/{}", OUTPUT_DIR_PLACEHOLDER, MIRROR_DIR),
        ),
        EnvironmentVariable::new("YARN_YARN_OFFLINE_MIRROR_PRUNING", "false"),
    ]
}

/// Substitute a concrete output directory into build environment values.
pub fn substitute_output_dir(vars: &[EnvironmentVariable], output_dir: &str) -> Vec<EnvironmentVariable> {
    vars.iter()
        .map(|var| {
            EnvironmentVariable::new(
                var.name.clone(),
                var.value.replace(OUTPUT_DIR_PLACEHOLDER, output_dir),
            )
        })
        .collect()
}
