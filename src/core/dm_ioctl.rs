// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::mem::offset_of;

pub use devicemapper_sys::{
    dm_ioctl as Struct_dm_ioctl, dm_name_list as Struct_dm_name_list, DM_ACTIVE_PRESENT_FLAG,
    DM_BUFFER_FULL_FLAG, DM_DEV_STATUS_CMD, DM_LIST_DEVICES_CMD, DM_SUSPEND_FLAG, DM_VERSION_CMD,
};

/// Indicator to send IOCTL to DM
pub const DM_IOCTL: u8 = devicemapper_sys::DM_IOCTL as u8;

/// Length of the name field in the ioctl header, including the trailing NUL.
pub const DM_NAME_LEN: usize = devicemapper_sys::DM_NAME_LEN as usize;
/// Length of the uuid field in the ioctl header, including the trailing NUL.
pub const DM_UUID_LEN: usize = devicemapper_sys::DM_UUID_LEN as usize;

pub const DM_NAME_LIST_DEV_OFFSET: usize = offset_of!(Struct_dm_name_list, dev);
pub const DM_NAME_LIST_NEXT_OFFSET: usize = offset_of!(Struct_dm_name_list, next);
pub const DM_NAME_LIST_NAME_OFFSET: usize = offset_of!(Struct_dm_name_list, name);
