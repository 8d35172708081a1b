// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// disk sector size in bytes
pub const SECTOR_SIZE: usize = 512;

range_u128!(
    /// A type for bytes
    Bytes,
    "bytes"
);

impl Bytes {
    /// Return the number of Sectors fully contained in these bytes.
    pub fn sectors(self) -> Sectors {
        Sectors((self.0 / SECTOR_SIZE as u128) as u64)
    }
}

range_u64!(
    /// A type for sectors
    Sectors,
    "sectors"
);

impl Sectors {
    /// The number of bytes in these sectors.
    pub fn bytes(self) -> Bytes {
        // Keep both as u128 before multiplication or overflow could occur
        Bytes(u128::from(self.0) * SECTOR_SIZE as u128)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_large() {
        let max_sectors = Sectors(u64::MAX).bytes();
        let size_sectors = max_sectors.sectors();
        assert_eq!(size_sectors.bytes(), max_sectors);
    }

    #[test]
    fn test_partial_sector() {
        assert_eq!(Bytes(1023).sectors(), Sectors(1));
        assert_eq!(Sectors(2).bytes(), Bytes(1024));
        assert_eq!(Sectors(2048).to_string(), "2048 sectors");
        assert_eq!(*Bytes(1536).sectors(), 3);
    }
}
