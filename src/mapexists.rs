// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use nix::unistd::geteuid;

use crate::{
    core::{DmName, DmNameBuf, DM},
    result::{DmError, DmResult, ErrorEnum},
};

/// The state of a map as reported by the kernel.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MapInfo {
    /// the kernel knows a map by this name
    pub exists: bool,
    /// the map has a live table loaded
    pub live_table: bool,
    /// the map is suspended
    pub suspended: bool,
}

impl MapInfo {
    /// A map is active if it exists, has a live table and is not suspended.
    pub fn is_active(&self) -> bool {
        self.exists && self.live_table && !self.suspended
    }
}

/// A source of information about the maps the kernel knows.
pub trait MapSource {
    /// The names of all maps, in the order the kernel reports them.
    fn map_names(&self) -> DmResult<Box<dyn Iterator<Item = DmNameBuf> + '_>>;

    /// The state of the map named name. A map that does not exist is not
    /// an error.
    fn map_info(&self, name: &DmName) -> DmResult<MapInfo>;
}

impl MapSource for DM {
    fn map_names(&self) -> DmResult<Box<dyn Iterator<Item = DmNameBuf> + '_>> {
        Ok(Box::new(self.device_names()?.map(|(name, _)| name)))
    }

    fn map_info(&self, name: &DmName) -> DmResult<MapInfo> {
        match self.device_info(name) {
            Ok(info) => Ok(MapInfo {
                exists: true,
                live_table: info.live_table(),
                suspended: info.suspended(),
            }),
            Err(err) if err.kind() == ErrorEnum::NotFound => Ok(MapInfo::default()),
            Err(err) => Err(err),
        }
    }
}

/// Decide whether a map named name exists in source.
///
/// If live_only is set the map must also have a live table; if
/// active_only is set it must also not be suspended. The first listed map
/// with this name that still exists decides the result.
///
/// A listing that cannot be obtained is treated as empty.
pub fn map_exists_in<S>(
    source: &S,
    name: &DmName,
    live_only: bool,
    active_only: bool,
) -> DmResult<bool>
where
    S: MapSource + ?Sized,
{
    let names = match source.map_names() {
        Ok(names) => names,
        Err(err) => {
            warn!("Could not list devicemapper maps, assuming there are none: {err}");
            return Ok(false);
        }
    };

    for candidate in names {
        if *candidate != *name {
            continue;
        }
        let info = source.map_info(name)?;
        if !info.exists {
            debug!("Map {name} was listed but no longer exists");
            continue;
        }
        return Ok((!live_only || info.live_table) && (!active_only || !info.suspended));
    }
    Ok(false)
}

/// Decide whether the kernel has a map named name, optionally requiring
/// that it have a live table and that it not be suspended.
///
/// Querying the kernel requires root; otherwise the result is a
/// `PermissionDenied` error. Failure to open the devicemapper control file
/// is `ResourceUnavailable`.
pub fn map_exists(name: &DmName, live_only: bool, active_only: bool) -> DmResult<bool> {
    if !geteuid().is_root() {
        return Err(DmError::Dm(
            ErrorEnum::PermissionDenied,
            "querying devicemapper maps requires root privileges".into(),
        ));
    }
    let dm = DM::new()?;
    map_exists_in(&dm, name, live_only, active_only)
}
