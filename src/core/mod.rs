//! Core data types: requests, projects, packages and output records.

pub mod component;
pub mod package;
pub mod project;
pub mod request;

pub use component::{Component, EnvironmentVariable, Property, PropertySet, RequestOutput};
pub use package::{Package, PackageKind, PackageSource};
pub use project::{PackageJson, Project};
pub use request::{Request, YarnPackageInput};
