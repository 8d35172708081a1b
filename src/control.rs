// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    cmd::{dmsetup_create, dmsetup_remove},
    consts::{DEV_DIR, SYSFS_ROOT},
    core::{DmName, DmNameBuf, DmUuid},
    result::{DmError, DmResult, ErrorEnum},
    units::Sectors,
};

/// Client for creating and removing maps and for translating between a
/// map's name and its kernel block device node name (e.g. "dm-0").
///
/// Creation and removal are delegated to dmsetup. Name translation reads
/// sysfs and the /dev/mapper symlinks directly.
#[derive(Debug, Clone)]
pub struct MapControl {
    sysfs_root: PathBuf,
    dev_dir: PathBuf,
}

impl Default for MapControl {
    fn default() -> MapControl {
        MapControl::new()
    }
}

impl MapControl {
    /// A client that uses the system's sysfs and /dev.
    pub fn new() -> MapControl {
        MapControl {
            sysfs_root: PathBuf::from(SYSFS_ROOT),
            dev_dir: PathBuf::from(DEV_DIR),
        }
    }

    /// Look for block device attributes under root instead of /sys.
    pub fn set_sysfs_root<P: AsRef<Path>>(mut self, root: P) -> MapControl {
        self.sysfs_root = root.as_ref().to_path_buf();
        self
    }

    /// Look for the mapper directory under dir instead of /dev.
    pub fn set_dev_dir<P: AsRef<Path>>(mut self, dir: P) -> MapControl {
        self.dev_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Create and activate a map named name that maps length sectors of
    /// device linearly, starting at sector 0.
    pub fn create_linear(
        &self,
        name: &DmName,
        device: &Path,
        length: Sectors,
        uuid: Option<&DmUuid>,
    ) -> DmResult<()> {
        let table = format!("0 {} linear {} 0", *length, device.display());
        debug!("Creating map {name} with table \"{table}\"");
        dmsetup_create(name, &table, uuid)
    }

    /// Remove the map named name.
    pub fn remove(&self, name: &DmName) -> DmResult<()> {
        debug!("Removing map {name}");
        dmsetup_remove(name)
    }

    /// The name of the map whose kernel node is node, e.g. "dm-0".
    pub fn name_from_node(&self, node: &str) -> DmResult<DmNameBuf> {
        let path: PathBuf = [
            self.sysfs_root.as_path(),
            Path::new("class/block"),
            Path::new(node),
            Path::new("dm/name"),
        ]
        .iter()
        .collect();
        let name = fs::read_to_string(&path).map_err(|err| {
            DmError::Dm(
                ErrorEnum::NotFound,
                format!("no map name for node {node} at {}: {err}", path.display()),
            )
        })?;
        DmNameBuf::new(name.trim().to_string())
    }

    /// The kernel node name, e.g. "dm-0", of the map named name.
    pub fn node_from_name(&self, name: &DmName) -> DmResult<String> {
        let link: PathBuf = [
            self.dev_dir.as_path(),
            Path::new("mapper"),
            Path::new(name.as_str()),
        ]
        .iter()
        .collect();
        let target = fs::read_link(&link).map_err(|err| {
            DmError::Dm(
                ErrorEnum::NotFound,
                format!("no node for map {name} at {}: {err}", link.display()),
            )
        })?;
        target
            .file_name()
            .and_then(|node| node.to_str())
            .map(|node| node.to_string())
            .ok_or_else(|| {
                DmError::Dm(
                    ErrorEnum::Invalid,
                    format!(
                        "symlink {} points to {}, which has no usable final component",
                        link.display(),
                        target.display()
                    ),
                )
            })
    }
}
