// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Identifying attributes of block devices, as recorded by udev.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use nix::libc::dev_t;

use crate::{
    consts::SYSFS_ROOT,
    core::Device,
    result::{DmError, DmResult, ErrorEnum},
};

/// The identifying attributes of a block device.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeviceAttributes {
    /// The filesystem UUID, if the device carries one
    pub uuid: Option<String>,
    /// The device number
    pub device: Device,
}

/// A source of identifying attributes for block devices given their bare
/// kernel names, e.g. "sda1".
pub trait DeviceIdentity {
    /// Look up the device named name.
    ///
    /// An unknown device is a `NotFound` error; failure of the lookup
    /// facility itself is reported with a different kind.
    fn attributes_of(&self, name: &str) -> DmResult<DeviceAttributes>;
}

impl<T: DeviceIdentity + ?Sized> DeviceIdentity for &T {
    fn attributes_of(&self, name: &str) -> DmResult<DeviceAttributes> {
        (**self).attributes_of(name)
    }
}

/// Look up device attributes in the udev database.
///
/// The udev context is released when this value is dropped.
pub struct UdevIdentity {
    context: libudev::Context,
    sysfs_root: PathBuf,
}

impl UdevIdentity {
    /// Create a udev context. Failure is `ResourceUnavailable`.
    pub fn new() -> DmResult<UdevIdentity> {
        UdevIdentity::with_sysfs_root(SYSFS_ROOT)
    }

    /// Create a udev context that resolves device names under root
    /// instead of /sys.
    pub fn with_sysfs_root<P: AsRef<Path>>(root: P) -> DmResult<UdevIdentity> {
        let context = libudev::Context::new().map_err(|err| {
            DmError::Dm(
                ErrorEnum::ResourceUnavailable,
                format!("failed to create udev context: {err}"),
            )
        })?;
        Ok(UdevIdentity {
            context,
            sysfs_root: root.as_ref().to_path_buf(),
        })
    }
}

/// Get a udev property as a string. A value that is not valid UTF-8 is
/// treated as absent.
fn udev_property<T: AsRef<OsStr>>(device: &libudev::Device<'_>, property_name: T) -> Option<String> {
    device
        .property_value(property_name)
        .and_then(|value| value.to_str())
        .map(|value| value.to_string())
}

impl DeviceIdentity for UdevIdentity {
    fn attributes_of(&self, name: &str) -> DmResult<DeviceAttributes> {
        let syspath: PathBuf = [
            self.sysfs_root.as_path(),
            Path::new("class/block"),
            Path::new(name),
        ]
        .iter()
        .collect();
        let device = self.context.device_from_syspath(&syspath).map_err(|err| {
            DmError::Dm(
                ErrorEnum::NotFound,
                format!("no udev device for {name} at {}: {err}", syspath.display()),
            )
        })?;

        attributes_from(name, device.devnum(), |key| udev_property(&device, key))
    }
}

/// The attributes of the device named name, given its device number, if
/// udev knows it, and a lookup of its udev properties.
///
/// The uuid is ID_FS_UUID, else UUID. Without a device number the MAJOR
/// and MINOR properties are used; if they are missing too the result is
/// `Invalid`.
fn attributes_from<F>(
    name: &str,
    devnum: Option<dev_t>,
    property: F,
) -> DmResult<DeviceAttributes>
where
    F: Fn(&str) -> Option<String>,
{
    let uuid = property("ID_FS_UUID").or_else(|| property("UUID"));

    let device_number = match devnum {
        Some(devnum) => Device::from(devnum),
        None => {
            let number =
                |key: &str| property(key).and_then(|value| value.trim().parse::<u32>().ok());
            match (number("MAJOR"), number("MINOR")) {
                (Some(major), Some(minor)) => Device { major, minor },
                _ => {
                    return Err(DmError::Dm(
                        ErrorEnum::Invalid,
                        format!("udev reports no device number for {name}"),
                    ))
                }
            }
        }
    };

    debug!(
        "Device {name} has device number {device_number} and uuid {}",
        uuid.as_deref().unwrap_or("<none>")
    );

    Ok(DeviceAttributes {
        uuid,
        device: device_number,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Look up properties in a fixed table, as udev would.
    fn attributes(
        devnum: Option<dev_t>,
        properties: &[(&str, &str)],
    ) -> DmResult<DeviceAttributes> {
        let properties = properties.iter().copied().collect::<HashMap<_, _>>();
        attributes_from("sda1", devnum, |key| {
            properties.get(key).map(|value| value.to_string())
        })
    }

    #[test]
    /// ID_FS_UUID is preferred; UUID is used only in its absence.
    fn test_uuid_property() {
        let both = attributes(
            Some(0x801),
            &[("ID_FS_UUID", "ABC-123"), ("UUID", "ZZZ")],
        )
        .unwrap();
        assert_eq!(both.uuid.as_deref(), Some("ABC-123"));

        let fallback = attributes(Some(0x801), &[("UUID", "ZZZ")]).unwrap();
        assert_eq!(fallback.uuid.as_deref(), Some("ZZZ"));

        let none = attributes(Some(0x801), &[("ID_FS_TYPE", "ext4")]).unwrap();
        assert_eq!(none.uuid, None);
    }

    #[test]
    /// The device number comes from udev's devnum, else from the MAJOR and
    /// MINOR properties.
    fn test_device_number() {
        let sda1 = Device { major: 8, minor: 1 };
        let devnum = attributes(Some(0x801), &[("MAJOR", "259"), ("MINOR", "3")]).unwrap();
        assert_eq!(devnum.device, sda1);

        let properties = attributes(None, &[("MAJOR", "8"), ("MINOR", " 1\n")]).unwrap();
        assert_eq!(properties.device, sda1);

        assert_matches!(
            attributes(None, &[("MAJOR", "8")]),
            Err(DmError::Dm(ErrorEnum::Invalid, _))
        );
        assert_matches!(
            attributes(None, &[("MAJOR", "8"), ("MINOR", "x")]),
            Err(DmError::Dm(ErrorEnum::Invalid, _))
        );
    }

    #[test]
    /// A device that does not exist is not found, rather than being an
    /// error of the lookup facility.
    fn test_unknown_device() {
        let root = tempfile::Builder::new().prefix("dmquery").tempdir().unwrap();
        let identity = match UdevIdentity::with_sysfs_root(root.path()) {
            Ok(identity) => identity,
            // No udev in this environment.
            Err(err) => {
                assert_eq!(err.kind(), ErrorEnum::ResourceUnavailable);
                return;
            }
        };
        assert_matches!(
            identity.attributes_of("sdzz9"),
            Err(DmError::Dm(ErrorEnum::NotFound, _))
        );
    }
}
