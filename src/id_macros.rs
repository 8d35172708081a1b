// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

// Macros for the string identifiers handed to devicemapper, which restricts
// their length and character set.

// Evaluates to an error string if the value does not match the requirements.
macro_rules! str_check {
    ($value:expr, $max_allowed_chars:expr, $forbidden:expr) => {{
        let value = $value;
        let max_allowed_chars = $max_allowed_chars;
        if !value.is_ascii() {
            Some(format!("value {} has some non-ascii characters", value))
        } else if let Some(c) = value.chars().find(|c| $forbidden.contains(c)) {
            Some(format!("value {} contains forbidden character '{}'", value, c))
        } else {
            let num_chars = value.len();
            if num_chars == 0 {
                Some("value has zero characters".into())
            } else if num_chars > max_allowed_chars {
                Some(format!(
                    "value {} has {} chars which is greater than maximum allowed {}",
                    value, num_chars, max_allowed_chars
                ))
            } else {
                None
            }
        }
    }};
}

/// Define borrowed and owned versions of string types that guarantee
/// conformance to DM restrictions, such as maximum length.
// This implementation follows the example of Path/PathBuf as closely as
// possible.
macro_rules! str_id {
    ($(#[$meta:meta])* $B:ident, $O:ident, $MAX:ident, $forbidden:expr, $err_func:ident) => {
        $(#[$meta])*
        #[derive(Debug, PartialEq, Eq, Hash)]
        pub struct $B {
            inner: str,
        }

        /// The owned version of the identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $O {
            inner: String,
        }

        impl $B {
            /// Create a new borrowed identifier from a `&str`.
            pub fn new(value: &str) -> $crate::result::DmResult<&$B> {
                if let Some(err_msg) = str_check!(value, $MAX - 1, $forbidden) {
                    return Err($err_func(&err_msg));
                }
                Ok(unsafe { &*(value as *const str as *const $B) })
            }

            /// Get the inner value as bytes
            pub fn as_bytes(&self) -> &[u8] {
                self.inner.as_bytes()
            }

            /// Get the inner value as a string slice
            pub fn as_str(&self) -> &str {
                &self.inner
            }
        }

        impl ToOwned for $B {
            type Owned = $O;
            fn to_owned(&self) -> $O {
                $O {
                    inner: self.inner.to_owned(),
                }
            }
        }

        impl std::fmt::Display for $B {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", &self.inner)
            }
        }

        impl $O {
            /// Construct a new owned identifier.
            pub fn new(value: String) -> $crate::result::DmResult<$O> {
                if let Some(err_msg) = str_check!(&value, $MAX - 1, $forbidden) {
                    return Err($err_func(&err_msg));
                }
                Ok($O { inner: value })
            }
        }

        impl std::fmt::Display for $O {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", &self.inner)
            }
        }

        impl AsRef<$B> for $O {
            fn as_ref(&self) -> &$B {
                self
            }
        }

        impl std::borrow::Borrow<$B> for $O {
            fn borrow(&self) -> &$B {
                std::ops::Deref::deref(self)
            }
        }

        impl std::ops::Deref for $O {
            type Target = $B;
            fn deref(&self) -> &$B {
                $B::new(&self.inner).expect("inner satisfies all correctness criteria for $B::new")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::ops::Deref;

    use crate::{core::errors::Error, result::DmError};

    fn err_func(err_msg: &str) -> DmError {
        DmError::Core(Error::InvalidArgument(err_msg.into()))
    }

    const TYPE_LEN: usize = 12;
    str_id!(
        /// A short identifier for testing.
        Id,
        IdBuf,
        TYPE_LEN,
        ['/'],
        err_func
    );

    #[test]
    /// Test for errors on an empty name.
    fn test_empty_name() {
        assert_matches!(Id::new(""), Err(DmError::Core(Error::InvalidArgument(_))));
        assert_matches!(
            IdBuf::new("".into()),
            Err(DmError::Core(Error::InvalidArgument(_)))
        );
    }

    #[test]
    /// Test for errors on an overlong name.
    fn test_too_long_name() {
        let name = "a".repeat(TYPE_LEN);
        assert_matches!(
            Id::new(&name),
            Err(DmError::Core(Error::InvalidArgument(_)))
        );
        assert_matches!(
            IdBuf::new(name),
            Err(DmError::Core(Error::InvalidArgument(_)))
        );
    }

    #[test]
    /// Non-ascii and forbidden characters are rejected.
    fn test_bad_chars() {
        assert_matches!(
            Id::new("vol\u{e9}"),
            Err(DmError::Core(Error::InvalidArgument(_)))
        );
        assert_matches!(
            Id::new("vg/lv"),
            Err(DmError::Core(Error::InvalidArgument(_)))
        );
    }

    #[test]
    /// Test the concrete methods and traits of the interface.
    fn test_interface() {
        let id = Id::new("id").expect("is valid id");
        let id_buf = IdBuf::new("id".into()).expect("is valid id");

        assert_eq!(id.as_bytes(), &[105u8, 100u8]);
        assert_eq!(id_buf.as_str(), "id");

        assert_eq!(id.to_owned(), id_buf);

        assert_eq!(id.to_string(), "id");
        assert_eq!(id_buf.to_string(), "id");

        assert_eq!(id_buf.deref(), id);
        assert_eq!(*id_buf, *id);
    }
}
