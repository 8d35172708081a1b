// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use crate::{
    devspec::{member_matches, DeviceSpec},
    discovery::{DmraidDiscovery, RaidDiscovery},
    identity::{DeviceIdentity, UdevIdentity},
    result::{DmResult, ErrorEnum},
};

/// A block device belonging to a RAID set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RaidMember {
    path: PathBuf,
}

impl RaidMember {
    /// Make a member from its device path, e.g. "/dev/sda1".
    pub fn new(path: PathBuf) -> RaidMember {
        RaidMember { path }
    }

    /// The member's device path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A RAID set as discovered from on-disk metadata.
///
/// A group set contains other sets; a leaf set contains devices.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RaidSet {
    /// A set whose components are sets
    Group {
        /// the set's name
        name: String,
        /// the component sets, in discovery order
        subsets: Vec<RaidSet>,
    },
    /// A set whose components are devices
    Leaf {
        /// the set's name
        name: String,
        /// the member devices, in discovery order
        members: Vec<RaidMember>,
    },
}

impl RaidSet {
    /// The set's name.
    pub fn name(&self) -> &str {
        match self {
            RaidSet::Group { name, .. } | RaidSet::Leaf { name, .. } => name,
        }
    }
}

fn walk<I>(set: &RaidSet, spec: &DeviceSpec, identity: &I, acc: &mut Vec<String>) -> DmResult<()>
where
    I: DeviceIdentity + ?Sized,
{
    match set {
        RaidSet::Group { subsets, .. } => {
            for subset in subsets {
                walk(subset, spec, identity, acc)?;
            }
        }
        RaidSet::Leaf { name, members } => {
            for member in members {
                match member_matches(member, spec, identity) {
                    Ok(true) => acc.push(name.clone()),
                    Ok(false) => (),
                    Err(err) if matches!(err.kind(), ErrorEnum::NotFound | ErrorEnum::Invalid) => {
                        warn!(
                            "Skipping member {} of RAID set {name}: {err}",
                            member.path().display()
                        );
                    }
                    Err(err) => return Err(err),
                }
            }
        }
    }
    Ok(())
}

/// The names of the leaf sets in forest that have a member satisfying
/// spec, in walk order. A set is named once for every matching member.
///
/// A member that cannot be identified is skipped. Failure of the identity
/// provider itself ends the walk with an error.
pub fn find_matching_sets<I>(
    forest: &[RaidSet],
    spec: &DeviceSpec,
    identity: &I,
) -> DmResult<Vec<String>>
where
    I: DeviceIdentity + ?Sized,
{
    let mut acc = Vec::new();
    for root in forest {
        walk(root, spec, identity, &mut acc)?;
    }
    Ok(acc)
}

/// Find the RAID sets, discovered with dmraid, that have a member satisfying
/// spec, identifying members through udev.
///
/// The udev context is only created once discovery has found RAID sets.
pub fn get_member_raid_sets(spec: &DeviceSpec) -> DmResult<Vec<String>> {
    search(&DmraidDiscovery::new(), UdevIdentity::new, spec)
}

/// Find the RAID sets that have a member satisfying spec, using the given
/// discovery and identity sources.
pub fn get_member_raid_sets_with<D, I>(
    discovery: &D,
    identity: &I,
    spec: &DeviceSpec,
) -> DmResult<Vec<String>>
where
    D: RaidDiscovery + ?Sized,
    I: DeviceIdentity + ?Sized,
{
    search(discovery, || Ok(identity), spec)
}

fn search<D, I, F>(discovery: &D, make_identity: F, spec: &DeviceSpec) -> DmResult<Vec<String>>
where
    D: RaidDiscovery + ?Sized,
    I: DeviceIdentity,
    F: FnOnce() -> DmResult<I>,
{
    let forest = discovery.discover()?;
    debug!(
        "Searching {} discovered RAID sets for {spec:?}",
        forest.len()
    );
    let identity = make_identity()?;
    find_matching_sets(&forest, spec, &identity)
}
