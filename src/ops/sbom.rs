//! Provenance components for fetched packages.

use crate::core::component::{Component, PropertySet};
use crate::core::package::Package;

/// One component per package, in input order.
pub fn create_components(packages: &[Package]) -> Vec<Component> {
    packages.iter().map(create_component).collect()
}

fn create_component(package: &Package) -> Component {
    Component {
        name: package.name.clone(),
        purl: package.purl(),
        version: package.version.clone(),
        properties: PropertySet {
            npm_development: package.dev,
        }
        .to_properties(),
    }
}
