//! ICC Profile container
//!
//! A header plus an ordered tag list with unique signatures. Serialization
//! lays out the header, the tag count, one 12-byte directory entry per tag
//! and the payloads in tag order, each padded to a 4-byte boundary.

use super::error::IccError;
use super::header::{ColorSpace, HEADER_SIZE, ProfileClass, ProfileHeader};
use super::tags::{CurveData, LutData, TagData};
use super::types::{TagSignature, pad_to_word, read_u32};
use crate::error::{Error, Result};

/// Tag directory entry size
const TAG_ENTRY_SIZE: usize = 12;

/// An ICC profile built in memory or parsed from bytes
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub header: ProfileHeader,
    tags: Vec<(TagSignature, TagData)>,
}

impl Profile {
    pub fn new(header: ProfileHeader) -> Self {
        Self {
            header,
            tags: Vec::new(),
        }
    }

    /// Append a tag; a signature may appear only once
    pub fn add_tag(&mut self, sig: TagSignature, data: TagData) -> Result<()> {
        if self.tag(sig).is_some() {
            return Err(Error::invalid(format!(
                "duplicate tag '{}'",
                sig.to_string()
            )));
        }
        self.tags.push((sig, data));
        Ok(())
    }

    pub fn tag(&self, sig: TagSignature) -> Option<&TagData> {
        self.tags.iter().find(|(s, _)| *s == sig).map(|(_, d)| d)
    }

    /// Tags in serialization order
    pub fn tags(&self) -> impl Iterator<Item = (TagSignature, &TagData)> + '_ {
        self.tags.iter().map(|(s, d)| (*s, d))
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    pub fn device_class(&self) -> ProfileClass {
        self.header.device_class
    }

    pub fn color_space(&self) -> ColorSpace {
        self.header.color_space
    }

    pub fn pcs(&self) -> ColorSpace {
        self.header.pcs
    }

    pub fn description(&self) -> Option<&str> {
        self.tag(TagSignature::DESC)
            .and_then(TagData::as_text)
            .map(|t| t.text.as_str())
    }

    pub fn media_white_point(&self) -> Option<[f64; 3]> {
        self.xyz(TagSignature::MEDIA_WHITE)
    }

    pub fn media_black_point(&self) -> Option<[f64; 3]> {
        self.xyz(TagSignature::MEDIA_BLACK)
    }

    pub(crate) fn xyz(&self, sig: TagSignature) -> Option<[f64; 3]> {
        self.tag(sig)
            .and_then(TagData::as_xyz)
            .and_then(|x| x.to_array())
    }

    pub(crate) fn curve(&self, sig: TagSignature) -> Option<&CurveData> {
        self.tag(sig).and_then(TagData::as_curve)
    }

    pub fn a2b0(&self) -> Option<&LutData> {
        self.tag(TagSignature::A2B0).and_then(TagData::as_lut)
    }

    pub fn b2a0(&self) -> Option<&LutData> {
        self.tag(TagSignature::B2A0).and_then(TagData::as_lut)
    }

    /// Serialize; the header size field is set to the returned length
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let table_size = 4 + self.tags.len() * TAG_ENTRY_SIZE;
        let mut payload = Vec::new();
        let mut entries = Vec::with_capacity(self.tags.len());
        let data_start = HEADER_SIZE + table_size;

        for (sig, data) in &self.tags {
            let start = payload.len();
            data.write(&mut payload)?;
            let size = payload.len() - start;
            pad_to_word(&mut payload);
            tracing::trace!(tag = %sig.to_string(), size, "tag written");
            entries.push((*sig, data_start + start, size));
        }

        let total = data_start + payload.len();
        let total_u32 = u32::try_from(total)
            .map_err(|_| Error::invalid(format!("profile of {total} bytes exceeds 4 GiB")))?;

        let mut out = Vec::new();
        out.try_reserve_exact(total)
            .map_err(|_| Error::AllocationFailure { bytes: total })?;
        out.extend_from_slice(&self.header.to_bytes(total_u32));
        out.extend_from_slice(&(self.tags.len() as u32).to_be_bytes());
        for (sig, offset, size) in entries {
            out.extend_from_slice(&sig.0.to_be_bytes());
            out.extend_from_slice(&(offset as u32).to_be_bytes());
            out.extend_from_slice(&(size as u32).to_be_bytes());
        }
        out.extend_from_slice(&payload);
        Ok(out)
    }

    /// Parse profile bytes; trailing bytes past the header size are ignored
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = ProfileHeader::parse(data)?;
        let data = &data[..header.size as usize];

        let count = read_u32(data, HEADER_SIZE)? as usize;
        let table_end = count
            .checked_mul(TAG_ENTRY_SIZE)
            .and_then(|n| n.checked_add(HEADER_SIZE + 4))
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                IccError::Malformed(format!("tag table of {count} entries truncated"))
            })?;

        let mut profile = Profile::new(header);
        for entry in (HEADER_SIZE + 4..table_end).step_by(TAG_ENTRY_SIZE) {
            let sig = read_u32(data, entry)?;
            let offset = read_u32(data, entry + 4)?;
            let size = read_u32(data, entry + 8)?;

            let end = offset as usize + size as usize;
            if end > data.len() || (offset as usize) < table_end {
                return Err(IccError::TagOutOfBounds {
                    tag: sig,
                    offset,
                    size,
                    profile_size: data.len(),
                }
                .into());
            }

            let parsed = TagData::parse(&data[offset as usize..end])?;
            profile.add_tag(TagSignature(sig), parsed).map_err(|_| {
                IccError::Malformed(format!(
                    "tag '{}' appears twice",
                    TagSignature(sig).to_string()
                ))
            })?;
        }

        Ok(profile)
    }
}
