//! Errors raised while reading profile bytes

use std::fmt;

/// Why a byte buffer is not a readable v4 profile
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IccError {
    /// Fewer bytes than the structure being read
    Truncated { needed: usize, available: usize },
    /// No 'acsp' at offset 36
    BadSignature(u32),
    /// Header size field disagrees with the buffer
    SizeMismatch { declared: u32, available: usize },
    /// Tag directory entry points past the end of the profile
    TagOutOfBounds {
        tag: u32,
        offset: u32,
        size: u32,
        profile_size: usize,
    },
    UnknownColorSpace(u32),
    UnknownProfileClass(u32),
    UnknownRenderingIntent(u32),
    /// Tag payload that does not follow its type's layout
    Malformed(String),
}

impl fmt::Display for IccError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { needed, available } => {
                write!(f, "truncated profile: need {needed} bytes, have {available}")
            }
            Self::BadSignature(sig) => {
                write!(f, "bad profile signature '{}'", fourcc(*sig))
            }
            Self::SizeMismatch {
                declared,
                available,
            } => write!(
                f,
                "header declares {declared} bytes but {available} are available"
            ),
            Self::TagOutOfBounds {
                tag,
                offset,
                size,
                profile_size,
            } => write!(
                f,
                "tag '{}' at {offset}+{size} runs past the {profile_size}-byte profile",
                fourcc(*tag)
            ),
            Self::UnknownColorSpace(sig) => write!(f, "unknown color space '{}'", fourcc(*sig)),
            Self::UnknownProfileClass(sig) => {
                write!(f, "unknown profile class '{}'", fourcc(*sig))
            }
            Self::UnknownRenderingIntent(v) => write!(f, "unknown rendering intent {v}"),
            Self::Malformed(msg) => write!(f, "malformed tag data: {msg}"),
        }
    }
}

impl std::error::Error for IccError {}

/// Render a signature as its four ASCII characters
pub(crate) fn fourcc(sig: u32) -> String {
    sig.to_be_bytes()
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect()
}
