//! Error types for ciecms

use thiserror::Error;

use crate::icc::IccError;

/// Result type for ciecms operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building profiles or transforming pixels
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Malformed or out-of-range descriptor, option or numeric value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Descriptor family or profile layout not handled by the operation
    #[error("Unsupported color space: {0}")]
    UnsupportedColorSpace(String),

    /// Channel counts of a chain and a pixel format (or two stages) disagree
    #[error("Channel count mismatch: expected {expected}, got {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },

    /// Caller buffer cannot hold the requested pixels
    #[error("Buffer too small: need {required} bytes, got {actual}")]
    BufferTooSmall { required: usize, actual: usize },

    /// Memory for a table could not be reserved
    #[error("Allocation of {bytes} bytes failed")]
    AllocationFailure { bytes: usize },

    /// Profile bytes could not be parsed
    #[error("Profile error: {0}")]
    Profile(#[from] IccError),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedColorSpace(msg.into())
    }
}

/// Reserve a zero-filled vector of `len` elements, surfacing allocation failure
pub(crate) fn try_zeroed<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| Error::AllocationFailure {
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    v.resize(len, T::default());
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::BufferTooSmall {
            required: 12,
            actual: 9,
        };
        assert_eq!(err.to_string(), "Buffer too small: need 12 bytes, got 9");

        let err = Error::ChannelCountMismatch {
            expected: 3,
            actual: 4,
        };
        assert!(err.to_string().contains("expected 3"));
    }

    #[test]
    fn test_icc_error_converts() {
        let err: Error = IccError::BadSignature(0).into();
        assert!(matches!(err, Error::Profile(_)));
    }

    #[test]
    fn test_try_zeroed() {
        let v: Vec<u16> = try_zeroed(17).unwrap();
        assert_eq!(v.len(), 17);
        assert!(v.iter().all(|&x| x == 0));

        let huge = try_zeroed::<u64>(usize::MAX / 4);
        assert!(matches!(huge, Err(Error::AllocationFailure { .. })));
    }
}
