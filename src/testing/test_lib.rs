// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use uuid::Uuid;

use crate::{
    control::MapControl,
    core::{DmNameBuf, DmUuidBuf, DM},
    result::DmResult,
};

/// String that is appended to every test supplied name, so that maps left
/// behind by failed tests can be identified and removed.
static DM_TEST_ID: &str = "_dmquery_test_delme";

/// Generate the test name given the test supplied name.
pub fn test_name(name: &str) -> DmResult<DmNameBuf> {
    DmNameBuf::new(format!("{name}{DM_TEST_ID}"))
}

/// Generate a test uuid, unique to this invocation, given the test supplied
/// name.
pub fn test_uuid(name: &str) -> DmResult<DmUuidBuf> {
    DmUuidBuf::new(format!(
        "{name}{DM_TEST_ID}-{}",
        Uuid::new_v4().as_simple()
    ))
}

/// Remove every map whose name contains DM_TEST_ID.
pub fn clean_up() -> DmResult<()> {
    let dm = DM::new()?;
    let control = MapControl::new();
    for (name, _) in dm.list_devices()? {
        if name.as_str().contains(DM_TEST_ID) {
            debug!("Removing leftover test map {name}");
            control.remove(&name)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_marked() {
        assert!(test_name("vol0").unwrap().as_str().ends_with(DM_TEST_ID));
        let first = test_uuid("vol0").unwrap();
        let second = test_uuid("vol0").unwrap();
        assert!(first.as_str().contains(DM_TEST_ID));
        assert_ne!(first, second);
    }
}
