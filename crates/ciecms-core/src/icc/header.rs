//! ICC Profile Header
//!
//! The ICC profile header is exactly 128 bytes and contains basic profile information.
//! See ICC.1:2022 Section 7.2.

use super::error::IccError;
use super::types::{DateTimeNumber, XyzNumber};
use crate::color::D50;
use crate::error::Result;

/// Profile file signature - must be 'acsp' (0x61637370)
pub const PROFILE_SIGNATURE: u32 = 0x61637370;

/// Header size in bytes
pub const HEADER_SIZE: usize = 128;

/// Primary platform written into built profiles ('APPL')
pub const PLATFORM_APPLE: u32 = u32::from_be_bytes(*b"APPL");

/// ICC Profile Header (128 bytes)
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileHeader {
    /// Profile size in bytes
    pub size: u32,
    /// Preferred CMM type signature
    pub cmm_type: u32,
    pub version: ProfileVersion,
    pub device_class: ProfileClass,
    /// Color space of data (RGB, CMYK, etc.)
    pub color_space: ColorSpace,
    /// Profile connection space (XYZ or Lab)
    pub pcs: ColorSpace,
    pub creation_date: DateTimeNumber,
    pub platform: u32,
    pub flags: u32,
    pub manufacturer: u32,
    pub model: u32,
    pub attributes: u64,
    pub rendering_intent: RenderingIntent,
    /// PCS illuminant (D50 for every profile we write)
    pub illuminant: XyzNumber,
    pub creator: u32,
    /// Profile ID (MD5 hash, or zero)
    pub profile_id: [u8; 16],
}

impl ProfileHeader {
    /// Header for a new profile; `size` is filled in at serialization
    pub fn new(
        device_class: ProfileClass,
        color_space: ColorSpace,
        pcs: ColorSpace,
    ) -> Result<Self> {
        Ok(Self {
            size: 0,
            cmm_type: 0,
            version: ProfileVersion::V4_2,
            device_class,
            color_space,
            pcs,
            creation_date: DateTimeNumber::default(),
            platform: PLATFORM_APPLE,
            flags: 0,
            manufacturer: 0,
            model: 0,
            attributes: 0,
            rendering_intent: RenderingIntent::Perceptual,
            illuminant: XyzNumber::from_xyz(D50)?,
            creator: 0,
            profile_id: [0; 16],
        })
    }

    /// Parse header from bytes
    pub fn parse(data: &[u8]) -> std::result::Result<Self, IccError> {
        if data.len() < HEADER_SIZE {
            return Err(IccError::Truncated {
                needed: HEADER_SIZE,
                available: data.len(),
            });
        }

        let word =
            |at: usize| u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);

        let signature = word(36);
        if signature != PROFILE_SIGNATURE {
            return Err(IccError::BadSignature(signature));
        }

        let size = word(0);
        if size as usize > data.len() || (size as usize) < HEADER_SIZE {
            return Err(IccError::SizeMismatch {
                declared: size,
                available: data.len(),
            });
        }

        let mut profile_id = [0u8; 16];
        profile_id.copy_from_slice(&data[84..100]);

        Ok(Self {
            size,
            cmm_type: word(4),
            version: ProfileVersion {
                major: data[8],
                minor: data[9] >> 4,
                patch: data[9] & 0x0F,
            },
            device_class: ProfileClass::from_u32(word(12))?,
            color_space: ColorSpace::from_u32(word(16))?,
            pcs: ColorSpace::from_u32(word(20))?,
            creation_date: DateTimeNumber::from_bytes(&data[24..36]).unwrap_or_default(),
            platform: word(40),
            flags: word(44),
            manufacturer: word(48),
            model: word(52),
            attributes: (word(56) as u64) << 32 | word(60) as u64,
            rendering_intent: RenderingIntent::from_u32(word(64))?,
            illuminant: XyzNumber::from_bytes(&data[68..80]).unwrap_or_default(),
            creator: word(80),
            profile_id,
        })
    }

    /// Serialize into 128 bytes with the given total profile size
    pub fn to_bytes(&self, size: u32) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        let mut put = |at: usize, v: u32| out[at..at + 4].copy_from_slice(&v.to_be_bytes());

        put(0, size);
        put(4, self.cmm_type);
        put(8, self.version.to_u32());
        put(12, self.device_class.to_u32());
        put(16, self.color_space.to_u32());
        put(20, self.pcs.to_u32());
        put(36, PROFILE_SIGNATURE);
        put(40, self.platform);
        put(44, self.flags);
        put(48, self.manufacturer);
        put(52, self.model);
        put(56, (self.attributes >> 32) as u32);
        put(60, self.attributes as u32);
        put(64, self.rendering_intent.to_u32());
        put(80, self.creator);

        out[24..36].copy_from_slice(&self.creation_date.to_bytes());
        out[68..80].copy_from_slice(&self.illuminant.to_bytes());
        out[84..100].copy_from_slice(&self.profile_id);
        // 100..128 reserved, zero
        out
    }
}

/// ICC Profile Version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl ProfileVersion {
    /// Version written by the profile builder (0x04200000)
    pub const V4_2: Self = Self {
        major: 4,
        minor: 2,
        patch: 0,
    };

    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes([self.major, (self.minor << 4) | (self.patch & 0x0F), 0, 0])
    }
}

/// ICC Profile Class (Device Class)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileClass {
    /// Input device (scanner, camera); CIE-based sources land here
    Input,
    Display,
    /// Output device; rendering dictionaries land here
    Output,
    DeviceLink,
    /// Color space conversion (Lab sources)
    ColorSpace,
    Abstract,
    NamedColor,
}

const PROFILE_CLASSES: [(ProfileClass, [u8; 4]); 7] = [
    (ProfileClass::Input, *b"scnr"),
    (ProfileClass::Display, *b"mntr"),
    (ProfileClass::Output, *b"prtr"),
    (ProfileClass::DeviceLink, *b"link"),
    (ProfileClass::ColorSpace, *b"spac"),
    (ProfileClass::Abstract, *b"abst"),
    (ProfileClass::NamedColor, *b"nmcl"),
];

impl ProfileClass {
    pub fn from_u32(val: u32) -> std::result::Result<Self, IccError> {
        PROFILE_CLASSES
            .iter()
            .find(|(_, sig)| u32::from_be_bytes(*sig) == val)
            .map(|(class, _)| *class)
            .ok_or(IccError::UnknownProfileClass(val))
    }

    pub fn to_u32(&self) -> u32 {
        PROFILE_CLASSES
            .iter()
            .find(|(class, _)| class == self)
            .map(|(_, sig)| u32::from_be_bytes(*sig))
            .unwrap_or(0)
    }
}

/// ICC Color Space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Xyz,
    Lab,
    Luv,
    YCbCr,
    Yxy,
    Rgb,
    Gray,
    Hsv,
    Hls,
    Cmyk,
    Cmy,
    /// Generic n-color space, 2..=15 channels ('2CLR'..'FCLR')
    Color(u8),
}

const NAMED_SPACES: [(ColorSpace, [u8; 4], usize); 11] = [
    (ColorSpace::Xyz, *b"XYZ ", 3),
    (ColorSpace::Lab, *b"Lab ", 3),
    (ColorSpace::Luv, *b"Luv ", 3),
    (ColorSpace::YCbCr, *b"YCbr", 3),
    (ColorSpace::Yxy, *b"Yxy ", 3),
    (ColorSpace::Rgb, *b"RGB ", 3),
    (ColorSpace::Gray, *b"GRAY", 1),
    (ColorSpace::Hsv, *b"HSV ", 3),
    (ColorSpace::Hls, *b"HLS ", 3),
    (ColorSpace::Cmyk, *b"CMYK", 4),
    (ColorSpace::Cmy, *b"CMY ", 3),
];

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

impl ColorSpace {
    pub fn from_u32(val: u32) -> std::result::Result<Self, IccError> {
        if let Some((space, _, _)) = NAMED_SPACES
            .iter()
            .find(|(_, sig, _)| u32::from_be_bytes(*sig) == val)
        {
            return Ok(*space);
        }
        let b = val.to_be_bytes();
        if &b[1..] == b"CLR" {
            if let Some(n) = HEX_DIGITS.iter().position(|&d| d == b[0]) {
                if (2..=15).contains(&n) {
                    return Ok(Self::Color(n as u8));
                }
            }
        }
        Err(IccError::UnknownColorSpace(val))
    }

    pub fn to_u32(&self) -> u32 {
        match self {
            Self::Color(n) => {
                let digit = HEX_DIGITS[(*n as usize).min(15)];
                u32::from_be_bytes([digit, b'C', b'L', b'R'])
            }
            other => NAMED_SPACES
                .iter()
                .find(|(space, _, _)| space == other)
                .map(|(_, sig, _)| u32::from_be_bytes(*sig))
                .unwrap_or(0),
        }
    }

    /// Get number of channels for this color space
    pub fn channels(&self) -> usize {
        match self {
            Self::Color(n) => *n as usize,
            other => NAMED_SPACES
                .iter()
                .find(|(space, _, _)| space == other)
                .map(|(_, _, n)| *n)
                .unwrap_or(0),
        }
    }

    /// Device space for a channel count: Gray, RGB, CMYK or nCLR
    pub fn for_device_channels(n: usize) -> Option<Self> {
        match n {
            1 => Some(Self::Gray),
            3 => Some(Self::Rgb),
            4 => Some(Self::Cmyk),
            2 | 5..=15 => Some(Self::Color(n as u8)),
            _ => None,
        }
    }
}

/// ICC Rendering Intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderingIntent {
    #[default]
    Perceptual,
    RelativeColorimetric,
    Saturation,
    AbsoluteColorimetric,
}

impl RenderingIntent {
    pub fn from_u32(val: u32) -> std::result::Result<Self, IccError> {
        match val {
            0 => Ok(Self::Perceptual),
            1 => Ok(Self::RelativeColorimetric),
            2 => Ok(Self::Saturation),
            3 => Ok(Self::AbsoluteColorimetric),
            _ => Err(IccError::UnknownRenderingIntent(val)),
        }
    }

    pub fn to_u32(&self) -> u32 {
        *self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_space_channels() {
        assert_eq!(ColorSpace::Gray.channels(), 1);
        assert_eq!(ColorSpace::Rgb.channels(), 3);
        assert_eq!(ColorSpace::Cmyk.channels(), 4);
        assert_eq!(ColorSpace::Color(7).channels(), 7);
    }

    #[test]
    fn test_n_color_signatures() {
        assert_eq!(ColorSpace::Color(10).to_u32(), u32::from_be_bytes(*b"ACLR"));
        assert_eq!(
            ColorSpace::from_u32(u32::from_be_bytes(*b"FCLR")).unwrap(),
            ColorSpace::Color(15)
        );
        assert!(ColorSpace::from_u32(u32::from_be_bytes(*b"1CLR")).is_err());
        assert_eq!(ColorSpace::for_device_channels(6), Some(ColorSpace::Color(6)));
        assert_eq!(ColorSpace::for_device_channels(16), None);
    }

    #[test]
    fn test_profile_class_signatures() {
        assert_eq!(ProfileClass::Input.to_u32(), u32::from_be_bytes(*b"scnr"));
        assert_eq!(
            ProfileClass::from_u32(u32::from_be_bytes(*b"prtr")).unwrap(),
            ProfileClass::Output
        );
        assert!(ProfileClass::from_u32(0).is_err());
    }

    #[test]
    fn test_rendering_intent() {
        assert_eq!(RenderingIntent::AbsoluteColorimetric.to_u32(), 3);
        assert!(RenderingIntent::from_u32(4).is_err());
    }

    #[test]
    fn test_version_packing() {
        assert_eq!(ProfileVersion::V4_2.to_u32(), 0x0420_0000);
    }

    #[test]
    fn test_header_write_then_parse() {
        let header =
            ProfileHeader::new(ProfileClass::Input, ColorSpace::Rgb, ColorSpace::Xyz).unwrap();
        let bytes = header.to_bytes(128);
        assert_eq!(&bytes[36..40], b"acsp");
        assert_eq!(&bytes[40..44], b"APPL");
        assert!(bytes[100..].iter().all(|&b| b == 0));

        let parsed = ProfileHeader::parse(&bytes).unwrap();
        assert_eq!(parsed.size, 128);
        assert_eq!(parsed.version, ProfileVersion::V4_2);
        assert_eq!(parsed.color_space, ColorSpace::Rgb);
        assert_eq!(parsed.illuminant, header.illuminant);
    }

    #[test]
    fn test_parse_rejects_bad_signature() {
        let header =
            ProfileHeader::new(ProfileClass::Input, ColorSpace::Gray, ColorSpace::Xyz).unwrap();
        let mut bytes = header.to_bytes(128);
        bytes[36] = b'x';
        assert!(matches!(
            ProfileHeader::parse(&bytes),
            Err(IccError::BadSignature(_))
        ));
    }
}
