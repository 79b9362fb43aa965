//! Prefetch error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use semver::Version;
use thiserror::Error;

use crate::core::project::PackageJsonError;
use crate::resolver::ResolveError;
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::fs::PathOutsideRoot;
use crate::util::version::VersionsRange;
use crate::APP_NAME;

/// Who has to act on an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The repository is not eligible for a hermetic fetch.
    Rejected,
    /// Yarn or the fetched content misbehaved.
    PackageManager,
}

/// Error aborting a prefetch request. None of these are retried.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum PrefetchError {
    #[error("Yarn lockfile 'yarn.lock' missing, refusing to continue")]
    #[diagnostic(code(yarn_prefetch::missing_lockfile))]
    MissingLockfile { path: PathBuf },

    #[error("{} not a Yarn v1", path.display())]
    #[diagnostic(code(yarn_prefetch::wrong_lockfile_version))]
    WrongLockfileVersion { path: PathBuf },

    #[error("Yarn PnP install detected; PnP installs are unsupported by {APP_NAME}")]
    #[diagnostic(code(yarn_prefetch::unsupported_install_mode))]
    UnsupportedInstallMode { path: PathBuf },

    #[error(
        "{APP_NAME} expected corepack to install yarn {expected}, but instead found yarn@{found}."
    )]
    #[diagnostic(code(yarn_prefetch::version_mismatch))]
    VersionMismatch {
        expected: VersionsRange,
        found: Version,
    },

    #[error("could not determine the yarn version from `{output}`")]
    #[diagnostic(code(yarn_prefetch::version_unavailable))]
    VersionUnavailable { output: String },

    #[error("`{command}` failed {}", describe_status(*status))]
    #[diagnostic(code(yarn_prefetch::fetch_failure))]
    FetchFailure {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Tarball collision in the offline mirror: {filename} ({count}x)")]
    #[diagnostic(code(yarn_prefetch::mirror_collision))]
    MirrorCollision { filename: String, count: usize },

    #[error("failed to run `{command}`: {message}")]
    #[diagnostic(code(yarn_prefetch::command))]
    Command { command: String, message: String },

    #[error(transparent)]
    #[diagnostic(code(yarn_prefetch::path_outside_root))]
    PathOutsideRoot(#[from] PathOutsideRoot),

    #[error(transparent)]
    #[diagnostic(code(yarn_prefetch::package_json))]
    PackageJson(#[from] PackageJsonError),

    #[error("failed to {action} {}", path.display())]
    #[diagnostic(code(yarn_prefetch::io))]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(yarn_prefetch::resolve))]
    Resolve(#[from] ResolveError),
}

fn describe_status(status: Option<i32>) -> String {
    match status {
        Some(code) => format!("with exit code {}", code),
        None => "after being terminated by a signal".to_string(),
    }
}

impl PrefetchError {
    /// Short reason suitable for a one-line report.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// Remediation for the user, when there is one.
    pub fn solution(&self) -> Option<&'static str> {
        match self {
            PrefetchError::MissingLockfile { .. } => Some(suggestions::MISSING_LOCKFILE),
            PrefetchError::WrongLockfileVersion { .. } => Some(suggestions::NOT_V1_LOCKFILE),
            PrefetchError::UnsupportedInstallMode { .. } => Some(suggestions::PNP_INSTALL),
            PrefetchError::VersionMismatch { .. } => Some(suggestions::YARN_VERSION),
            PrefetchError::FetchFailure { .. } => Some(suggestions::INSTALL_FAILED),
            PrefetchError::MirrorCollision { .. } => Some(suggestions::MIRROR_COLLISION),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PrefetchError::MissingLockfile { .. }
            | PrefetchError::WrongLockfileVersion { .. }
            | PrefetchError::UnsupportedInstallMode { .. }
            | PrefetchError::PathOutsideRoot(_)
            | PrefetchError::PackageJson(_) => ErrorCategory::Rejected,
            _ => ErrorCategory::PackageManager,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        if let PrefetchError::Resolve(err) = self {
            return err.to_diagnostic();
        }

        let mut diag = Diagnostic::error(self.reason());

        match self {
            PrefetchError::MissingLockfile { path }
            | PrefetchError::WrongLockfileVersion { path }
            | PrefetchError::UnsupportedInstallMode { path }
            | PrefetchError::Io { path, .. } => {
                diag = diag.with_location(path);
            }
            PrefetchError::FetchFailure { stderr, .. } => {
                for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
                    diag = diag.with_context(line.trim_end());
                }
            }
            _ => {}
        }

        if let Some(source) = std::error::Error::source(self) {
            diag = diag.with_context(source.to_string());
        }

        if let Some(solution) = self.solution() {
            diag = diag.with_suggestion(solution);
        }

        diag
    }
}
