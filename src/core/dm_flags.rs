// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::core::dm_ioctl as dmi;

bitflags! {
    /// Flags used by devicemapper.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct DmFlags: u32 {
        /// In: Device should be suspended.
        /// Out: Device is suspended.
        const DM_SUSPEND              = dmi::DM_SUSPEND_FLAG;
        /// Out: Active table is present.
        const DM_ACTIVE_PRESENT       = dmi::DM_ACTIVE_PRESENT_FLAG;
        /// Out: Passed-in buffer was too small.
        const DM_BUFFER_FULL          = dmi::DM_BUFFER_FULL_FLAG;
    }
}
