//! Resolution error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::project::PackageJsonError;
use crate::util::diagnostic::Diagnostic;

/// Error while turning `yarn.lock` into packages.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to read {}", path.display())]
    ReadLockfile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed yarn.lock at line {line}: {message}")]
    MalformedLockfile { line: usize, message: String },

    #[error("no package.json in {}", dir.display())]
    MissingPackageJson { dir: PathBuf },

    #[error(transparent)]
    PackageJson(#[from] PackageJsonError),

    #[error("cannot classify lockfile entry `{specifier}`: {reason}")]
    UnsupportedEntry { specifier: String, reason: String },

    #[error("invalid workspace pattern `{pattern}`: {message}")]
    Workspace { pattern: String, message: String },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::ReadLockfile { path, source } => {
                Diagnostic::error(format!("failed to read lockfile: {}", source))
                    .with_location(path)
            }

            ResolveError::MalformedLockfile { line, message } => {
                Diagnostic::error(format!("yarn.lock could not be parsed: {}", message))
                    .with_context(format!("at line {}", line))
                    .with_suggestion("Regenerate yarn.lock with `yarn install` using yarn 1.x")
            }

            ResolveError::MissingPackageJson { dir } => {
                Diagnostic::error("package.json not found")
                    .with_location(dir)
                    .with_suggestion("Run the prefetch on the directory containing package.json")
            }

            ResolveError::PackageJson(err) => {
                let mut diag = Diagnostic::error(err.to_string());
                if let Some(source) = std::error::Error::source(err) {
                    diag = diag.with_context(source.to_string());
                }
                diag
            }

            ResolveError::UnsupportedEntry { specifier, reason } => Diagnostic::error(format!(
                "unsupported dependency `{}`",
                specifier
            ))
            .with_context(reason.clone()),

            ResolveError::Workspace { pattern, message } => {
                Diagnostic::error(format!("invalid workspace pattern `{}`", pattern))
                    .with_context(message.clone())
                    .with_suggestion("Fix the `workspaces` field in package.json")
            }
        }
    }
}
