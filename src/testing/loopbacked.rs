// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    panic,
    path::{Path, PathBuf},
};

use loopdev::{LoopControl, LoopDevice};
use tempfile::TempDir;

use crate::{
    consts::IEC,
    testing::{logger::init_logger, test_lib::clean_up},
    units::{Bytes, SECTOR_SIZE},
};

/// Size of each backing file. The files are sparse.
const BACKING_FILE_SIZE: u64 = 64 * IEC::Mi;

/// Zero the first MiB of the device at path. Earlier tests may have left
/// devicemapper or RAID metadata there.
fn wipe_start(path: &Path) -> io::Result<()> {
    let mut f = OpenOptions::new().write(true).open(path)?;
    let zeroes = [0u8; SECTOR_SIZE];
    for _ in 0..*Bytes(u128::from(IEC::Mi)).sectors() {
        f.write_all(&zeroes)?;
    }
    f.sync_all()
}

/// A loop device that is detached when dropped.
struct LoopTestDev {
    ld: LoopDevice,
}

impl LoopTestDev {
    fn new(lc: &LoopControl, backing: &Path) -> LoopTestDev {
        let ld = lc.next_free().unwrap();
        ld.attach_file(backing).unwrap();
        wipe_start(&ld.path().unwrap()).unwrap();
        LoopTestDev { ld }
    }

    fn path(&self) -> PathBuf {
        self.ld.path().unwrap()
    }
}

impl Drop for LoopTestDev {
    fn drop(&mut self) {
        if let Err(err) = self.ld.detach() {
            warn!("Failed to detach loop device: {err}");
        }
    }
}

/// Attach count loop devices, each backed by a sparse file in dir.
fn get_devices(count: u8, dir: &TempDir) -> Vec<LoopTestDev> {
    let lc = LoopControl::open().unwrap();
    (0..count)
        .map(|index| {
            let backing = dir.path().join(format!("store{index}"));
            let f = File::create(&backing).unwrap();
            f.set_len(BACKING_FILE_SIZE).unwrap();
            f.sync_all().unwrap();
            LoopTestDev::new(&lc, &backing)
        })
        .collect()
}

/// Set up count loop devices, run test on their paths, and take the
/// devices down again. Maps left behind by the test are removed, even if
/// it panics.
pub fn test_with_spec<F>(count: u8, test: F)
where
    F: Fn(&[&Path]) + panic::RefUnwindSafe,
{
    init_logger();
    clean_up().unwrap();

    let tmpdir = tempfile::Builder::new().prefix("dmquery").tempdir().unwrap();
    let loop_devices = get_devices(count, &tmpdir);
    let device_paths: Vec<PathBuf> = loop_devices.iter().map(|x| x.path()).collect();
    let device_paths: Vec<&Path> = device_paths.iter().map(|x| x.as_path()).collect();

    let result = panic::catch_unwind(|| test(&device_paths));
    let tear_down = clean_up();

    result.unwrap();
    tear_down.unwrap();
}
