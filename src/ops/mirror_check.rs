//! Offline mirror consistency.
//!
//! The mirror is a flat directory keyed by tarball file name. Two different
//! packages mapping to one name would overwrite each other, so such a
//! package set is refused.

use std::collections::BTreeMap;

use crate::core::package::Package;
use crate::ops::errors::PrefetchError;
use crate::resolver::mirror_name;

/// Mirror file names that several identical packages share.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    /// `(filename, number of packages)`, ordered by filename.
    pub duplicates: Vec<(String, usize)>,
}

/// Group mirrored packages by the file name yarn stores them under.
///
/// File, link and workspace packages never reach the mirror and are left
/// out. Groups are ordered by file name; packages keep their input order.
pub fn group_by_mirror_name(packages: &[Package]) -> BTreeMap<String, Vec<&Package>> {
    let mut groups: BTreeMap<String, Vec<&Package>> = BTreeMap::new();
    for package in packages {
        if !package.kind().is_mirrored() {
            continue;
        }
        if let Some(name) = mirror_name(package) {
            groups.entry(name).or_default().push(package);
        }
    }
    groups
}

/// Fail on the first mirror file name (in name order) claimed by packages
/// that are not all equal.
pub fn verify_no_mirror_collisions(packages: &[Package]) -> Result<MirrorReport, PrefetchError> {
    let mut report = MirrorReport::default();

    for (filename, group) in group_by_mirror_name(packages) {
        if group.len() < 2 {
            continue;
        }

        let first = group[0];
        if group.iter().any(|package| *package != first) {
            return Err(PrefetchError::MirrorCollision {
                filename,
                count: group.len(),
            });
        }

        report.duplicates.push((filename, group.len()));
    }

    Ok(report)
}
