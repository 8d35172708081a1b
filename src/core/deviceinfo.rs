// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use nix::libc::c_char;
use semver::Version;

use crate::{
    core::{
        device::Device,
        dm_flags::DmFlags,
        dm_ioctl as dmi, errors,
        types::{DmName, DmNameBuf, DmUuid, DmUuidBuf},
        util::str_from_c_str,
    },
    result::{DmError, DmResult},
};

/// Contains information about the device.
#[derive(Clone, Debug)]
pub struct DeviceInfo {
    version: Version,
    flags: DmFlags,
    dev: Device,
    name: Option<DmNameBuf>,
    uuid: Option<DmUuidBuf>,
}

impl TryFrom<dmi::Struct_dm_ioctl> for DeviceInfo {
    type Error = DmError;

    fn try_from(ioctl: dmi::Struct_dm_ioctl) -> DmResult<Self> {
        let uuid = str_from_c_str(&ioctl.uuid as &[c_char]).ok_or_else(|| {
            errors::Error::InvalidArgument("Devicemapper UUID is not null terminated".to_string())
        })?;
        let uuid = if uuid.is_empty() {
            None
        } else {
            Some(DmUuidBuf::new(uuid.to_string())?)
        };
        let name = str_from_c_str(&ioctl.name as &[c_char]).ok_or_else(|| {
            errors::Error::InvalidArgument("Devicemapper name is not null terminated".to_string())
        })?;
        let name = if name.is_empty() {
            None
        } else {
            Some(DmNameBuf::new(name.to_string())?)
        };
        Ok(DeviceInfo {
            version: Version::new(
                u64::from(ioctl.version[0]),
                u64::from(ioctl.version[1]),
                u64::from(ioctl.version[2]),
            ),
            flags: DmFlags::from_bits_truncate(ioctl.flags),
            // dm_ioctl struct reserves 64 bits for device but kernel "huge"
            // encoding is only 32 bits.
            dev: Device::from_kdev_t(ioctl.dev as u32),
            uuid,
            name,
        })
    }
}

impl DeviceInfo {
    /// Parses a DM ioctl structure.
    ///
    /// Equivalent to `DeviceInfo::try_from(hdr)`.
    pub fn new(hdr: dmi::Struct_dm_ioctl) -> DmResult<Self> {
        DeviceInfo::try_from(hdr)
    }

    /// The major, minor, and patchlevel versions of devicemapper.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The device's major and minor device numbers, as a Device.
    pub fn device(&self) -> Device {
        self.dev
    }

    /// The device's name.
    pub fn name(&self) -> Option<&DmName> {
        self.name.as_ref().map(|name| name.as_ref())
    }

    /// The device's devicemapper uuid.
    pub fn uuid(&self) -> Option<&DmUuid> {
        self.uuid.as_ref().map(|uuid| uuid.as_ref())
    }

    /// Whether a table is loaded into the device's active slot.
    pub fn live_table(&self) -> bool {
        self.flags.contains(DmFlags::DM_ACTIVE_PRESENT)
    }

    /// Whether I/O to the device is currently held.
    pub fn suspended(&self) -> bool {
        self.flags.contains(DmFlags::DM_SUSPEND)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::util::mut_slice_from_c_str;

    use super::*;

    fn header(name: &str, flags: DmFlags) -> dmi::Struct_dm_ioctl {
        let mut hdr = dmi::Struct_dm_ioctl {
            version: [4, 48, 0],
            flags: flags.bits(),
            dev: 0xfd03,
            ..Default::default()
        };
        mut_slice_from_c_str(&mut hdr.name)[..name.len()].copy_from_slice(name.as_bytes());
        hdr
    }

    #[test]
    /// A header returned for a live, resumed map.
    fn test_live_header() {
        let info = DeviceInfo::new(header("vol0", DmFlags::DM_ACTIVE_PRESENT)).unwrap();
        assert_eq!(info.name().map(|n| n.to_string()), Some("vol0".to_string()));
        assert_eq!(info.uuid(), None);
        assert_eq!(
            info.device(),
            Device {
                major: 253,
                minor: 3
            }
        );
        assert_eq!(*info.version(), Version::new(4, 48, 0));
        assert!(info.live_table());
        assert!(!info.suspended());
    }

    #[test]
    /// A header for a suspended map with no live table. Flags this crate
    /// does not know about are ignored.
    fn test_suspended_header() {
        let mut hdr = header("vol0", DmFlags::DM_SUSPEND);
        hdr.flags |= 1 << 6;
        let info = DeviceInfo::new(hdr).unwrap();
        assert!(!info.live_table());
        assert!(info.suspended());
    }

    #[test]
    /// A name without a terminating NUL can not be parsed.
    fn test_unterminated_name() {
        let hdr = dmi::Struct_dm_ioctl {
            name: [b'a' as c_char; dmi::DM_NAME_LEN],
            ..Default::default()
        };
        assert_matches!(
            DeviceInfo::new(hdr),
            Err(DmError::Core(errors::Error::InvalidArgument(_)))
        );
    }
}
