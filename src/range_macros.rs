// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

// Unit newtypes over an unsigned integer.
macro_rules! range {
    ($(#[$comment:meta])? $T:ident, $inner:ty, $display_name:expr) => {
        $(
            #[$comment]
        )?
        #[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $T(pub $inner);

        impl std::ops::Deref for $T {
            type Target = $inner;
            fn deref(&self) -> &$inner {
                &self.0
            }
        }

        impl std::fmt::Debug for $T {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, stringify!($T))?;
                write!(f, "({})", **self)
            }
        }

        impl std::fmt::Display for $T {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{} {}", self.0, $display_name)
            }
        }
    };
}

macro_rules! range_u64 {
    ($(#[$comment:meta])? $T:ident, $display_name:expr) => {
        range!($(#[$comment])? $T, u64, $display_name);
    };
}

macro_rules! range_u128 {
    ($(#[$comment:meta])? $T:ident, $display_name:expr) => {
        range!($(#[$comment])? $T, u128, $display_name);
    };
}
