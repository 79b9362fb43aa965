//! Package resolution.
//!
//! The pipeline only needs the [`Resolver`] trait. [`LockfileResolver`] is the
//! implementation used by the CLI.

pub mod errors;
pub mod lockfile;
pub mod mirror;
pub mod resolve;

use std::path::Path;

use crate::core::package::Package;
use crate::core::project::Project;

pub use errors::ResolveError;
pub use lockfile::{YarnLock, YARN_CLASSIC_MARKER};
pub use mirror::{git_tarball_mirror_name, mirror_name, tarball_mirror_name};
pub use resolve::LockfileResolver;

/// Produces the package set of a project after its dependencies were fetched.
pub trait Resolver {
    /// One package per lockfile entry, plus workspace members.
    fn resolve(&self, project: &Project, mirror_dir: &Path) -> Result<Vec<Package>, ResolveError>;
}
