// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Modules that support handling of devicemapper ioctls at a low-level.

mod device;
mod deviceinfo;
mod dm;
mod dm_flags;
mod dm_ioctl;
pub mod errors;
mod types;
mod util;

pub use self::{
    device::Device,
    deviceinfo::DeviceInfo,
    dm::{DeviceNames, DM},
    dm_flags::DmFlags,
    types::{DmName, DmNameBuf, DmUuid, DmUuidBuf},
};
