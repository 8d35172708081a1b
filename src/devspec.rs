// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::Path;

use crate::{identity::DeviceIdentity, raidset::RaidMember, result::DmResult};

/// A filter over block devices. Every field that is set must match; an
/// unset field matches anything.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DeviceSpec {
    /// The bare kernel name, e.g. "sda1"
    pub name: Option<String>,
    /// The filesystem UUID. An empty string matches anything.
    pub uuid: Option<String>,
    /// The device's major number
    pub major: Option<u32>,
    /// The device's minor number
    pub minor: Option<u32>,
}

impl DeviceSpec {
    /// Return true if no field is set, in which case the spec matches
    /// every device.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.uuid.as_deref().map_or(true, str::is_empty)
            && self.major.is_none()
            && self.minor.is_none()
    }
}

/// The bare device name of a member path, e.g. "sda1" for "/dev/sda1".
///
/// The path must contain at least two '/' with something after the second;
/// the name is its final component. Anything else yields None.
pub fn dev_name_from_path(path: &Path) -> Option<&str> {
    let path = path.to_str()?;
    let mut parts = path.splitn(3, '/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(_), Some(rest)) if !rest.is_empty() => {
            path.rsplit('/').next().filter(|name| !name.is_empty())
        }
        _ => None,
    }
}

/// Return true if member satisfies spec.
///
/// A member whose path yields no device name does not match. A name
/// mismatch is decided without consulting identity.
pub fn member_matches<I>(member: &RaidMember, spec: &DeviceSpec, identity: &I) -> DmResult<bool>
where
    I: DeviceIdentity + ?Sized,
{
    let name = match dev_name_from_path(member.path()) {
        Some(name) => name,
        None => {
            warn!(
                "Skipping RAID member {}: no device name in path",
                member.path().display()
            );
            return Ok(false);
        }
    };

    if let Some(ref wanted) = spec.name {
        if wanted != name {
            return Ok(false);
        }
    }

    let attrs = identity.attributes_of(name)?;

    if let Some(wanted) = spec.uuid.as_deref().filter(|uuid| !uuid.is_empty()) {
        if attrs.uuid.as_deref() != Some(wanted) {
            return Ok(false);
        }
    }
    if spec.major.is_some_and(|major| major != attrs.device.major) {
        return Ok(false);
    }
    if spec.minor.is_some_and(|minor| minor != attrs.device.minor) {
        return Ok(false);
    }
    Ok(true)
}
