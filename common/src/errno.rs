//! Port error taxonomy.
//!
//! Every fallible serial operation reports one of four failure
//! categories. Across the C boundary they become negative errno values,
//! using the numbering shared by newlib and Linux.

use core::fmt;

/// Invalid argument.
pub const EINVAL: i32 = 22;
/// I/O error.
pub const EIO: i32 = 5;
/// No space left (transmit path full).
pub const ENOSPC: i32 = 28;
/// No data available.
pub const ENODATA: i32 = 61;

/// Failure category of a port operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PortError {
    /// Missing handle or buffer, or a handle in the wrong state.
    InvalidArgument,
    /// The underlying driver failed to install, configure or release.
    Io,
    /// The transmit path had no room for a single byte.
    NoSpace,
    /// Nothing arrived on the receive path within the bounded wait.
    NoData,
}

impl PortError {
    /// Negative errno encoding used by the C ABI.
    pub const fn errno(self) -> i32 {
        match self {
            PortError::InvalidArgument => -EINVAL,
            PortError::Io => -EIO,
            PortError::NoSpace => -ENOSPC,
            PortError::NoData => -ENODATA,
        }
    }

    /// Decode a negative errno back into a category.
    ///
    /// Returns `None` for non-negative values and unknown codes.
    pub const fn from_errno(code: i32) -> Option<Self> {
        match code {
            c if c == -EINVAL => Some(PortError::InvalidArgument),
            c if c == -EIO => Some(PortError::Io),
            c if c == -ENOSPC => Some(PortError::NoSpace),
            c if c == -ENODATA => Some(PortError::NoData),
            _ => None,
        }
    }
}

impl fmt::Display for PortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PortError::InvalidArgument => "invalid argument",
            PortError::Io => "i/o error",
            PortError::NoSpace => "transmit buffer full",
            PortError::NoData => "no data available",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for PortError {}

/// Result of a port operation.
pub type PortResult<T> = Result<T, PortError>;

/// Collapse a result into the C convention: non-negative on success,
/// negative errno on failure.
pub fn to_status(result: PortResult<usize>) -> i32 {
    match result {
        Ok(n) => i32::try_from(n).unwrap_or(i32::MAX),
        Err(e) => e.errno(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_values_are_negative() {
        for err in [
            PortError::InvalidArgument,
            PortError::Io,
            PortError::NoSpace,
            PortError::NoData,
        ] {
            assert!(err.errno() < 0);
            assert_eq!(PortError::from_errno(err.errno()), Some(err));
        }
    }

    #[test]
    fn from_errno_rejects_success_and_unknown_codes() {
        assert_eq!(PortError::from_errno(0), None);
        assert_eq!(PortError::from_errno(3), None);
        assert_eq!(PortError::from_errno(-1), None);
    }

    #[test]
    fn to_status_keeps_counts_and_encodes_errors() {
        assert_eq!(to_status(Ok(3)), 3);
        assert_eq!(to_status(Ok(usize::MAX)), i32::MAX);
        assert_eq!(to_status(Err(PortError::NoData)), -61);
        assert_eq!(to_status(Err(PortError::InvalidArgument)), -22);
    }
}
