// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// Control path for user space to pass IOCTL to kernel DM
pub const DM_CTL_PATH: &str = "/dev/mapper/control";

/// Where sysfs is mounted.
pub const SYSFS_ROOT: &str = "/sys";

/// Where device nodes live. DM maps get symlinks in the "mapper"
/// subdirectory.
pub const DEV_DIR: &str = "/dev";

/// Directories searched, in order, for the external binaries this crate runs.
/// PATH is not consulted.
pub const BINARIES_PATHS: [&str; 4] = ["/usr/sbin", "/sbin", "/usr/bin", "/bin"];

#[allow(non_upper_case_globals)]
#[allow(non_snake_case)]
/// International Electrotechnical Commission Units Standards
pub mod IEC {
    /// kibi
    pub const Ki: u64 = 1024;
    /// mebi
    pub const Mi: u64 = 1024 * Ki;
    /// gibi
    pub const Gi: u64 = 1024 * Mi;
}
