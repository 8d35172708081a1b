// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{error::Error, fmt};

use crate::core::errors;

/// A very simple breakdown of outer layer errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorEnum {
    /// generic error code
    Error,
    /// invalid value passed as argument, or malformed data
    Invalid,
    /// something not found
    NotFound,
    /// the operation requires privileges the process does not have
    PermissionDenied,
    /// a kernel or library context could not be created
    ResourceUnavailable,
    /// RAID device discovery failed outright
    DiscoveryFailed,
    /// RAID device discovery succeeded but found no RAID devices
    NoCandidates,
}

impl fmt::Display for ErrorEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Super error type, with constructors distinguishing outer errors from
/// core errors.
#[derive(Clone, Debug)]
pub enum DmError {
    /// DM errors
    Dm(ErrorEnum, String),
    /// Errors in the core devicemapper functionality
    Core(errors::Error),
}

impl DmError {
    /// The category of this error, so that callers can decide on retry or
    /// messaging without matching on the low-level details.
    pub fn kind(&self) -> ErrorEnum {
        match self {
            DmError::Dm(kind, _) => *kind,
            DmError::Core(errors::Error::ContextInit(_)) => ErrorEnum::ResourceUnavailable,
            DmError::Core(errors::Error::InvalidArgument(_)) => ErrorEnum::Invalid,
            DmError::Core(err) if err.errno() == Some(nix::errno::Errno::ENXIO) => {
                ErrorEnum::NotFound
            }
            DmError::Core(err) if err.errno() == Some(nix::errno::Errno::EPERM) => {
                ErrorEnum::PermissionDenied
            }
            DmError::Core(_) => ErrorEnum::Error,
        }
    }
}

/// return result for DM functions
pub type DmResult<T> = Result<T, DmError>;

impl From<errors::Error> for DmError {
    fn from(err: errors::Error) -> DmError {
        DmError::Core(err)
    }
}

impl fmt::Display for DmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DmError::Core(ref err) => write!(f, "DM Core error: {err}"),
            DmError::Dm(ref err, ref msg) => write!(f, "DM error: {err}: {msg}"),
        }
    }
}

impl Error for DmError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DmError::Core(err) => Some(err),
            DmError::Dm(_, _) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Low-level errors are sorted into the outer categories.
    fn test_kind() {
        assert_eq!(
            DmError::Core(errors::Error::ContextInit("no control file".into())).kind(),
            ErrorEnum::ResourceUnavailable
        );
        assert_eq!(
            DmError::Core(errors::Error::Ioctl(
                7,
                None,
                Box::new(nix::errno::Errno::ENXIO)
            ))
            .kind(),
            ErrorEnum::NotFound
        );
        assert_eq!(
            DmError::Core(errors::Error::IoctlResultTooLarge).kind(),
            ErrorEnum::Error
        );
        assert_eq!(
            DmError::Dm(ErrorEnum::NoCandidates, "no raid disks".into()).kind(),
            ErrorEnum::NoCandidates
        );
    }

    #[test]
    fn test_display() {
        let err = DmError::Dm(ErrorEnum::PermissionDenied, "not root".into());
        assert_eq!(err.to_string(), "DM error: PermissionDenied: not root");
    }
}
