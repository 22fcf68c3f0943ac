//! ICC profile model
//!
//! Header, tag payloads and the profile container, with serialization to
//! and parsing from ICC.1:2022 (v4) bytes.
//!
//! # Structure
//!
//! An ICC profile consists of:
//! 1. A 128-byte header
//! 2. A tag table listing all tags
//! 3. Tag data, each payload aligned to 4 bytes
//!
//! # Example
//!
//! ```ignore
//! use ciecms_core::icc::Profile;
//!
//! let profile = Profile::from_bytes(&bytes)?;
//! if let Some(lut) = profile.a2b0() {
//!     // device to PCS
//! }
//! ```

pub mod header;
pub mod tags;

mod error;
mod profile;
mod types;

pub use error::IccError;
pub use header::{ColorSpace, ProfileClass, ProfileHeader, ProfileVersion, RenderingIntent};
pub use profile::Profile;
pub use tags::{
    ClutData, ClutPrecision, CurveData, LutData, LutKind, LutMatrix, TagData, TextData, XyzTagData,
};
pub use types::{
    DateTimeNumber, S15Fixed16, TagSignature, TypeSignature, U8Fixed8, XyzNumber, encode_u8,
    encode_u16,
};
