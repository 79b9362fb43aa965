//! High-level operations.
//!
//! This module contains the prefetch pipeline behind the CLI commands.

pub mod env;
pub mod errors;
pub mod install;
pub mod mirror_check;
pub mod prefetch;
pub mod sbom;
pub mod verify_repo;
pub mod version_guard;
pub mod yarn;

pub use env::{build_environment, prefetch_environment, substitute_output_dir, EnvMap, MIRROR_DIR};
pub use errors::{ErrorCategory, PrefetchError};
pub use install::{ensure_mirror_dir, fetch_dependencies, INSTALL_ARGS};
pub use mirror_check::{group_by_mirror_name, verify_no_mirror_collisions, MirrorReport};
pub use prefetch::{check_request, fetch_yarn_source, request_mirror_dir, PrefetchContext};
pub use sbom::create_components;
pub use verify_repo::verify_repository;
pub use version_guard::{check_yarn_version, verify_yarn_version, yarn_classic_range};
pub use yarn::Yarn;
