// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{cmp, fs::File, mem::size_of, os::unix::io::AsRawFd, ptr};

use nix::libc::ioctl as nix_ioctl;

use crate::{
    consts::DM_CTL_PATH,
    core::{
        dm_ioctl as dmi, errors,
        util::{mut_slice_from_c_str, read_u32, read_u64, slice_from_c_struct, slice_to_null},
        Device, DeviceInfo, DmFlags, DmName, DmNameBuf,
    },
    result::{DmError, DmResult},
};

/// Major version
const DM_VERSION_MAJOR: u32 = 4;
/// Minor version
const DM_VERSION_MINOR: u32 = 30;
/// Patch level
const DM_VERSION_PATCHLEVEL: u32 = 0;

/// Start with a large buffer to make BUFFER_FULL rare. Libdm does this too.
const MIN_BUF_SIZE: usize = 16 * 1024;

/// Context needed for communicating with devicemapper.
///
/// The control file is closed when the context is dropped.
pub struct DM {
    file: File,
}

impl DM {
    /// Create a new context for communicating with DM.
    pub fn new() -> DmResult<DM> {
        Ok(DM {
            file: File::open(DM_CTL_PATH).map_err(|err| {
                DmError::Core(errors::Error::ContextInit(format!(
                    "failed to open {DM_CTL_PATH}: {err}"
                )))
            })?,
        })
    }

    /// Generate a header to be used for IOCTL, addressed to the map named
    /// name if there is one.
    fn ioctl_hdr(name: Option<&DmName>) -> dmi::Struct_dm_ioctl {
        let mut hdr = dmi::Struct_dm_ioctl {
            version: [DM_VERSION_MAJOR, DM_VERSION_MINOR, DM_VERSION_PATCHLEVEL],
            data_start: size_of::<dmi::Struct_dm_ioctl>() as u32,
            ..Default::default()
        };

        if let Some(name) = name {
            DM::hdr_set_name(&mut hdr, name);
        }

        hdr
    }

    fn hdr_set_name(hdr: &mut dmi::Struct_dm_ioctl, name: &DmName) {
        let bytes = name.as_bytes();
        mut_slice_from_c_str(&mut hdr.name)[..bytes.len()].clone_from_slice(bytes);
    }

    // Give this a filled-in header and optionally add'l stuff.
    // Does the ioctl and maybe returns stuff. Handles BUFFER_FULL flag.
    // On return hdr holds the header as updated by the kernel.
    fn do_ioctl(
        &self,
        ioctl: u8,
        hdr: &mut dmi::Struct_dm_ioctl,
        in_data: Option<&[u8]>,
    ) -> DmResult<Vec<u8>> {
        let hdr_size = size_of::<dmi::Struct_dm_ioctl>();

        hdr.data_size = cmp::max(MIN_BUF_SIZE, hdr_size + in_data.map_or(0, |x| x.len())) as u32;

        let mut v: Vec<u8> = Vec::with_capacity(hdr.data_size as usize);
        v.extend_from_slice(slice_from_c_struct(hdr));
        if let Some(in_data) = in_data {
            v.extend_from_slice(in_data);
        }
        // zero out the rest
        v.resize(hdr.data_size as usize, 0);

        let op = request_code_readwrite!(dmi::DM_IOCTL, ioctl, size_of::<dmi::Struct_dm_ioctl>());
        loop {
            if let Err(err) =
                unsafe { convert_ioctl_res!(nix_ioctl(self.file.as_raw_fd(), op, v.as_mut_ptr())) }
            {
                let info = DeviceInfo::new(*hdr).ok().map(Box::new);
                return Err(DmError::Core(errors::Error::Ioctl(
                    ioctl,
                    info,
                    Box::new(err),
                )));
            }

            *hdr = unsafe { ptr::read_unaligned(v.as_ptr() as *const dmi::Struct_dm_ioctl) };

            // If DM was able to write the requested data into the provided buffer, break the loop
            if (hdr.flags & DmFlags::DM_BUFFER_FULL.bits()) == 0 {
                break;
            }

            // If DM_BUFFER_FULL is set, DM requires more space for the
            // response.  Double the size of the buffer and re-try the ioctl.
            // Never allow the size to exceed u32::MAX.
            let len = v.len();
            if len == u32::MAX as usize {
                return Err(DmError::Core(errors::Error::IoctlResultTooLarge));
            }
            let new_len = (len as u32).saturating_mul(2);
            v.resize(new_len as usize, 0);
            hdr.data_size = new_len;
            v[..hdr_size].clone_from_slice(slice_from_c_struct(hdr));
        }

        // Return header data section.
        let data_end = cmp::min(cmp::max(hdr.data_start, hdr.data_size) as usize, v.len());
        let data_start = cmp::min(hdr.data_start as usize, data_end);
        Ok(v[data_start..data_end].to_vec())
    }

    /// Devicemapper version information: Major, Minor, and patchlevel versions.
    pub fn version(&self) -> DmResult<(u32, u32, u32)> {
        let mut hdr = DM::ioctl_hdr(None);

        self.do_ioctl(dmi::DM_VERSION_CMD as u8, &mut hdr, None)?;

        Ok((hdr.version[0], hdr.version[1], hdr.version[2]))
    }

    /// Iterate lazily over the maps the kernel currently knows about.
    ///
    /// The kernel's reply is fetched once; each step of the iterator decodes
    /// one record of it.
    pub fn device_names(&self) -> DmResult<DeviceNames> {
        let mut hdr = DM::ioctl_hdr(None);
        let data_out = self.do_ioctl(dmi::DM_LIST_DEVICES_CMD as u8, &mut hdr, None)?;
        Ok(DeviceNames::new(data_out))
    }

    /// Returns a list of tuples containing DM device names and a Device,
    /// which holds their major and minor device numbers.
    pub fn list_devices(&self) -> DmResult<Vec<(DmNameBuf, Device)>> {
        Ok(self.device_names()?.collect())
    }

    /// Get DeviceInfo for a device. This is also returned by other
    /// methods, but if just the DeviceInfo is desired then this just
    /// gets it.
    pub fn device_info(&self, name: &DmName) -> DmResult<DeviceInfo> {
        let mut hdr = DM::ioctl_hdr(Some(name));

        self.do_ioctl(dmi::DM_DEV_STATUS_CMD as u8, &mut hdr, None)?;

        DeviceInfo::new(hdr)
    }
}

/// Iterator over the records of a DM_LIST_DEVICES reply, a chain of
/// struct dm_name_list entries linked by their byte offsets.
#[derive(Debug)]
pub struct DeviceNames {
    buf: Vec<u8>,
    offset: Option<usize>,
}

impl DeviceNames {
    fn new(buf: Vec<u8>) -> DeviceNames {
        DeviceNames {
            buf,
            offset: Some(0),
        }
    }

    /// Decode the record at offset, returning the entry, if any, and the
    /// offset of the following record.
    #[allow(clippy::type_complexity)]
    fn record(&self, offset: usize) -> Option<(Option<(DmNameBuf, Device)>, Option<usize>)> {
        let record = self.buf.get(offset..)?;
        let dev = read_u64(record, dmi::DM_NAME_LIST_DEV_OFFSET)?;
        // A zero device flags an empty list.
        if dev == 0 {
            return None;
        }
        let next = read_u32(record, dmi::DM_NAME_LIST_NEXT_OFFSET)?;
        let name = record
            .get(dmi::DM_NAME_LIST_NAME_OFFSET..)
            .and_then(slice_to_null)?;
        let name = String::from_utf8_lossy(name).into_owned();

        let entry = match DmNameBuf::new(name) {
            Ok(name) => Some((name, Device::from_kdev_t(dev as u32))),
            Err(err) => {
                warn!("Skipping devicemapper device with unusable name: {err}");
                None
            }
        };
        let next = if next == 0 {
            None
        } else {
            Some(offset + next as usize)
        };
        Some((entry, next))
    }
}

impl Iterator for DeviceNames {
    type Item = (DmNameBuf, Device);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let offset = self.offset?;
            let (entry, next) = match self.record(offset) {
                Some(record) => record,
                None => {
                    self.offset = None;
                    return None;
                }
            };
            self.offset = next;
            if entry.is_some() {
                return entry;
            }
        }
    }
}
