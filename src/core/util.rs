// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{mem::size_of, slice, str};

use nix::libc::c_char;

/// Return the slice up to, but not including, the first \0, or None if
/// there is no \0.
pub fn slice_to_null(slc: &[u8]) -> Option<&[u8]> {
    slc.iter().position(|c| *c == b'\0').map(|i| &slc[..i])
}

/// Convert from a &[c_char] to a &[u8].
pub fn byte_slice_from_c_str(c_str: &[c_char]) -> &[u8] {
    unsafe { slice::from_raw_parts(c_str as *const _ as *const u8, c_str.len()) }
}

/// Return a str parsed from the C string up to the first \0, or None
pub fn str_from_c_str(slc: &[c_char]) -> Option<&str> {
    str_from_byte_slice(byte_slice_from_c_str(slc))
}

/// Return a str parsed from the byte slice up to the first \0, or None
pub fn str_from_byte_slice(slc: &[u8]) -> Option<&str> {
    slice_to_null(slc).and_then(|s| str::from_utf8(s).ok())
}

/// Return a mutable slice from the mutable C string provided as input
pub fn mut_slice_from_c_str(c_str: &mut [c_char]) -> &mut [u8] {
    unsafe { slice::from_raw_parts_mut(c_str as *mut _ as *mut u8, c_str.len()) }
}

/// Convert the C struct into a properly-sized byte slice
pub fn slice_from_c_struct<T>(strct: &T) -> &[u8] {
    unsafe { slice::from_raw_parts(strct as *const _ as *const u8, size_of::<T>()) }
}

/// Read a native-endian u32 at offset, or None if the slice is too short.
pub fn read_u32(slc: &[u8], offset: usize) -> Option<u32> {
    slc.get(offset..offset + size_of::<u32>())
        .and_then(|b| b.try_into().ok())
        .map(u32::from_ne_bytes)
}

/// Read a native-endian u64 at offset, or None if the slice is too short.
pub fn read_u64(slc: &[u8], offset: usize) -> Option<u64> {
    slc.get(offset..offset + size_of::<u64>())
        .and_then(|b| b.try_into().ok())
        .map(u64::from_ne_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_to_null() {
        assert_eq!(slice_to_null(b"abc\0def"), Some(&b"abc"[..]));
        assert_eq!(slice_to_null(b"\0"), Some(&b""[..]));
        assert_eq!(slice_to_null(b"abc"), None);
        assert_eq!(str_from_byte_slice(b"vg-lv\0\0\0"), Some("vg-lv"));
    }

    #[test]
    fn test_c_str() {
        let mut c_str = [0 as c_char; 8];
        mut_slice_from_c_str(&mut c_str)[..5].copy_from_slice(b"vol0/");
        assert_eq!(byte_slice_from_c_str(&c_str), b"vol0/\0\0\0");
        assert_eq!(str_from_c_str(&c_str), Some("vol0/"));
        assert_eq!(str_from_c_str(&[b'a' as c_char; 4]), None);
    }

    #[test]
    fn test_read_ints() {
        let mut buf = 7u64.to_ne_bytes().to_vec();
        buf.extend_from_slice(&9u32.to_ne_bytes());
        assert_eq!(read_u64(&buf, 0), Some(7));
        assert_eq!(read_u32(&buf, 8), Some(9));
        assert_eq!(read_u32(&buf, 10), None);
    }
}
