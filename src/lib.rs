//! yarn-prefetch - hermetic prefetch of yarn classic dependencies
//!
//! This crate validates yarn v1 projects, runs `yarn install` against a
//! locked-down environment to populate an offline mirror, verifies the
//! mirror is consistent, and reports the fetched packages as provenance
//! components.

pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// Only compiled for `cfg(test)`. Provides a mock command runner, a static
/// resolver and on-disk project fixtures.
#[cfg(test)]
pub mod test_support;

/// Name used in user-facing messages.
pub const APP_NAME: &str = "yarn-prefetch";

pub use core::{
    component::{Component, EnvironmentVariable, RequestOutput},
    package::{Package, PackageKind, PackageSource},
    project::Project,
    request::Request,
};

pub use ops::{fetch_yarn_source, PrefetchContext, PrefetchError};
pub use resolver::{LockfileResolver, Resolver};
pub use util::context::GlobalContext;
