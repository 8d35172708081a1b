// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt;

use nix::libc::{dev_t, major, minor};

/// A struct containing the device's major and minor numbers
///
/// Also allows conversion from a single 64bit dev_t value.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Device {
    /// Device major number
    pub major: u32,
    /// Device minor number
    pub minor: u32,
}

/// Display format is the device number in "<major>:<minor>" format
impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

impl From<dev_t> for Device {
    fn from(val: dev_t) -> Device {
        #[allow(unused_unsafe)] // No longer unsafe in libc 0.2.133.
        let (major, minor) = unsafe { (major(val), minor(val)) };
        Device { major, minor }
    }
}

/// The Linux kernel's kdev_t encodes major/minor values as mmmM MMmm.
impl Device {
    /// Make a Device from a kdev_t.
    pub fn from_kdev_t(val: u32) -> Device {
        Device {
            major: (val & 0xf_ff00) >> 8,
            minor: (val & 0xff) | ((val >> 12) & 0xf_ff00),
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    /// Verify conversion from the glibc encoding
    fn test_dev_t_conversion() {
        let test_devt_1: dev_t = 0xabcd_ef12_3456_7890;

        let dev1 = Device::from(test_devt_1);
        // Default glibc dev_t encoding is MMMM Mmmm mmmM MMmm. I guess if
        // we're on a platform where non-default is used, we'll fail.
        assert_eq!(dev1.major, 0xabcd_e678);
        assert_eq!(dev1.minor, 0xf123_4590);
    }

    #[test]
    /// The kernel reports sda1 as 8:1 and dm-3 as 253:3 in kdev_t form.
    fn test_from_kdev_t() {
        assert_eq!(Device::from_kdev_t(0x801), Device { major: 8, minor: 1 });
        assert_eq!(
            Device::from_kdev_t(0x1_2345_678),
            Device {
                major: 0x456,
                minor: 0x1_2378
            }
        );
    }
}
