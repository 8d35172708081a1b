// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    core::{
        dm_ioctl::{DM_NAME_LEN, DM_UUID_LEN},
        errors,
    },
    result::DmError,
};

/// An error function to construct an error when creating a new string id.
fn err_func(err_msg: &str) -> DmError {
    DmError::Core(errors::Error::InvalidArgument(err_msg.into()))
}

str_id!(
    /// A devicemapper name. Really just a string, but the kernel refuses
    /// names containing '/'.
    DmName,
    DmNameBuf,
    DM_NAME_LEN,
    ['/'],
    err_func
);

str_id!(
    /// A devicemapper uuid. A devicemapper uuid has a devicemapper-specific
    /// format.
    DmUuid,
    DmUuidBuf,
    DM_UUID_LEN,
    [] as [char; 0],
    err_func
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// A name that fills the whole kernel field leaves no room for the NUL.
    fn test_name_length_limit() {
        assert!(DmName::new(&"a".repeat(DM_NAME_LEN - 1)).is_ok());
        assert_matches!(
            DmName::new(&"a".repeat(DM_NAME_LEN)),
            Err(DmError::Core(errors::Error::InvalidArgument(_)))
        );
    }

    #[test]
    fn test_name_separator() {
        assert_eq!(
            DmName::new("isw_raid0").expect("is valid DM name").to_string(),
            "isw_raid0"
        );
        assert_matches!(
            DmName::new("isw/raid0"),
            Err(DmError::Core(errors::Error::InvalidArgument(_)))
        );
        assert!(DmUuid::new("DMRAID-isw/raid0").is_ok());
    }
}
