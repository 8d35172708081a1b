// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Queries about the Linux devicemapper maps and the firmware RAID sets of
//! the running system.
//!
//! # Overview
//!
//! Linux's devicemapper allows the creation of block devices whose
//! storage is mapped to other block devices. Firmware ("fake") RAID sets,
//! as set up by a BIOS and discovered by dmraid, are activated as
//! devicemapper maps.
//!
//! This crate answers two questions:
//!
//! * Does the kernel have a map with a given name, optionally with a live
//!   table loaded and not suspended? See `map_exists()`.
//! * Which RAID sets have a member device with a given name, filesystem
//!   UUID, or device number? See `get_member_raid_sets()`.
//!
//! # Usage
//!
//! Map queries talk to the kernel through the devicemapper control file,
//! and so require root. RAID queries run dmraid to discover the sets and
//! consult udev to identify their members.
//!
//! Both queries are also available in forms that take their sources of
//! information as arguments: `map_exists_in()` and
//! `get_member_raid_sets_with()`.
//!
//! `MapControl` creates and removes simple linear maps and translates
//! between a map's name and its kernel device node.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate nix;
#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

/// Macros for string identifiers
#[macro_use]
mod id_macros;
/// Macros for unit newtypes
#[macro_use]
mod range_macros;

/// shared constants
mod consts;
/// invocation of external binaries
mod cmd;
/// creating and removing maps, name translation
mod control;
/// core lower level API
mod core;
/// matching RAID member devices against a filter
mod devspec;
/// discovery of RAID sets
mod discovery;
/// block device identity
mod identity;
/// map existence queries
mod mapexists;
/// RAID set forests and queries over them
mod raidset;
/// return results container
mod result;
/// basic types (Bytes, Sectors)
mod units;

#[cfg(test)]
mod testing;

pub use crate::{
    cmd::verify_binaries,
    consts::IEC,
    control::MapControl,
    core::{
        errors, Device, DeviceInfo, DeviceNames, DmFlags, DmName, DmNameBuf, DmUuid, DmUuidBuf,
        DM,
    },
    devspec::{dev_name_from_path, member_matches, DeviceSpec},
    discovery::{parse_dmraid_sets, DmraidDiscovery, RaidDiscovery},
    identity::{DeviceAttributes, DeviceIdentity, UdevIdentity},
    mapexists::{map_exists, map_exists_in, MapInfo, MapSource},
    raidset::{
        find_matching_sets, get_member_raid_sets, get_member_raid_sets_with, RaidMember, RaidSet,
    },
    result::{DmError, DmResult, ErrorEnum},
    units::{Bytes, Sectors, SECTOR_SIZE},
};
