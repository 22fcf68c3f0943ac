//! Pixel formats and pack/unpack strategies
//!
//! Unpacking widens every sample to 16 bits by replicating its bit
//! pattern (8-bit `v * 257`, 4-bit `v * 0x1111`, ...). Packing narrows
//! with `(v * max + 32767) / 65535`. Samples narrower than a byte are
//! stored most significant bit first; 16-bit samples are in native byte
//! order unless `swap_endian` is set.

use std::fmt;

use crate::error::{Error, Result};
use crate::icc::encode_u16;
use crate::pipeline::MAX_CHANNELS;

/// Palette for formats whose raw samples are indices
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "IndexTableFields"))]
pub struct IndexTable {
    channels: usize,
    /// `len * channels` 16-bit components
    entries: Vec<u16>,
}

/// Deserialized form, checked by [`IndexTable::new`]
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct IndexTableFields {
    channels: usize,
    entries: Vec<u16>,
}

#[cfg(feature = "serde")]
impl TryFrom<IndexTableFields> for IndexTable {
    type Error = Error;

    fn try_from(fields: IndexTableFields) -> Result<Self> {
        Self::new(fields.channels, fields.entries)
    }
}

impl IndexTable {
    pub fn new(channels: usize, entries: Vec<u16>) -> Result<Self> {
        if !(1..=MAX_CHANNELS).contains(&channels) {
            return Err(Error::invalid(format!("index table with {channels} channels")));
        }
        if entries.is_empty() || entries.len() % channels != 0 {
            return Err(Error::invalid(format!(
                "{} index table components for {channels} channels",
                entries.len()
            )));
        }
        Ok(Self { channels, entries })
    }

    /// Palette from normalized components in [0, 1]
    pub fn from_f64(channels: usize, values: &[f64]) -> Result<Self> {
        let entries = values
            .iter()
            .map(|&v| encode_u16(v))
            .collect::<Result<Vec<u16>>>()?;
        Self::new(channels, entries)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of palette entries
    pub fn len(&self) -> usize {
        self.entries.len() / self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Components of entry `index`; indices past the end read the last entry
    #[inline]
    pub fn entry(&self, index: usize) -> &[u16] {
        let i = index.min(self.len() - 1) * self.channels;
        &self.entries[i..i + self.channels]
    }

    /// Index of the entry closest to `values` (squared distance, first wins)
    fn nearest(&self, values: &[u16]) -> usize {
        let distance = |entry: &[u16]| -> u64 {
            entry
                .iter()
                .zip(values)
                .map(|(&a, &b)| {
                    let d = a as i64 - b as i64;
                    (d * d) as u64
                })
                .sum()
        };
        self.entries
            .chunks_exact(self.channels)
            .enumerate()
            .min_by_key(|(_, e)| distance(e))
            .map_or(0, |(i, _)| i)
    }
}

/// Layout of an external pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixelFormat {
    /// Components seen by the chain (the palette width when remapped)
    pub channels: usize,
    /// 1, 2, 4, 8 or 16
    pub bits: u8,
    /// One plane per channel instead of interleaved samples
    pub planar: bool,
    /// 16-bit samples in the opposite of native byte order
    pub swap_endian: bool,
    /// Raw samples are palette indices
    pub remap: Option<IndexTable>,
}

impl PixelFormat {
    pub fn new(channels: usize, bits: u8) -> Self {
        Self {
            channels,
            bits,
            planar: false,
            swap_endian: false,
            remap: None,
        }
    }

    pub fn gray8() -> Self {
        Self::new(1, 8)
    }

    pub fn rgb8() -> Self {
        Self::new(3, 8)
    }

    pub fn rgb16() -> Self {
        Self::new(3, 16)
    }

    pub fn cmyk8() -> Self {
        Self::new(4, 8)
    }

    pub fn with_planar(mut self, planar: bool) -> Self {
        self.planar = planar;
        self
    }

    pub fn with_swap_endian(mut self, swap: bool) -> Self {
        self.swap_endian = swap;
        self
    }

    /// Raw samples become indices into `table`; `channels` follows the table
    pub fn with_remap(mut self, table: IndexTable) -> Self {
        self.channels = table.channels();
        self.remap = Some(table);
        self
    }

    /// Raw samples stored per pixel
    pub fn samples_per_pixel(&self) -> usize {
        if self.remap.is_some() { 1 } else { self.channels }
    }

    /// Bytes of one channel plane holding `pixels` samples
    pub fn plane_len(&self, pixels: usize) -> Result<usize> {
        pixels
            .checked_mul(self.bits as usize)
            .map(|bits| bits.div_ceil(8))
            .ok_or_else(|| Error::invalid(format!("{pixels} pixels overflow the buffer size")))
    }

    /// Bytes needed for `pixels` pixels
    pub fn buffer_len(&self, pixels: usize) -> Result<usize> {
        let samples = self.samples_per_pixel();
        let len = if self.planar {
            self.plane_len(pixels)?.checked_mul(samples)
        } else {
            pixels
                .checked_mul(samples)
                .and_then(|s| s.checked_mul(self.bits as usize))
                .map(|bits| bits.div_ceil(8))
        };
        len.ok_or_else(|| Error::invalid(format!("{pixels} pixels overflow the buffer size")))
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CHANNELS).contains(&self.channels) {
            return Err(Error::invalid(format!(
                "pixel format with {} channels",
                self.channels
            )));
        }
        if !matches!(self.bits, 1 | 2 | 4 | 8 | 16) {
            return Err(Error::invalid(format!("{} bits per sample", self.bits)));
        }
        if self.swap_endian && self.bits != 16 {
            return Err(Error::invalid("byte swapping needs 16-bit samples"));
        }
        if let Some(table) = &self.remap {
            if table.channels() != self.channels {
                return Err(Error::ChannelCountMismatch {
                    expected: self.channels,
                    actual: table.channels(),
                });
            }
        }
        Ok(())
    }
}

/// Moves one pixel between an external buffer and 16-bit components
///
/// `index` is the pixel number; `plane_len` is the byte length of one
/// channel plane and only matters to planar layouts. Callers check buffer
/// sizes beforehand.
pub trait PixelCodec: Send + Sync + fmt::Debug {
    fn unpack(&self, src: &[u8], index: usize, plane_len: usize, out: &mut [u16]);
    fn pack(&self, dst: &mut [u8], index: usize, plane_len: usize, values: &[u16]);
}

/// Strategy for `format`, which must already be validated
pub fn codec_for(format: &PixelFormat) -> Box<dyn PixelCodec> {
    if let Some(table) = &format.remap {
        return Box::new(Indexed {
            table: table.clone(),
            bits: format.bits,
            swap: format.swap_endian,
        });
    }
    if format.planar {
        return Box::new(Planar {
            channels: format.channels,
            inner: interleaved(1, format.bits, format.swap_endian),
        });
    }
    interleaved(format.channels, format.bits, format.swap_endian)
}

fn interleaved(channels: usize, bits: u8, swap: bool) -> Box<dyn PixelCodec> {
    match bits {
        8 => Box::new(Interleaved8 { channels }),
        16 => Box::new(Interleaved16 { channels, swap }),
        _ => Box::new(PackedBits { channels, bits }),
    }
}

#[inline]
fn max_value(bits: u8) -> u32 {
    (1u32 << bits) - 1
}

/// Widen a raw sample to 16 bits by bit replication
#[inline]
pub fn expand_sample(raw: u32, bits: u8) -> u16 {
    (raw * (65535 / max_value(bits))) as u16
}

/// Narrow a 16-bit component to `bits`, rounding to nearest
#[inline]
pub fn reduce_sample(v: u16, bits: u8) -> u32 {
    (v as u32 * max_value(bits) + 32767) / 65535
}

#[inline]
fn read_raw(buf: &[u8], sample: usize, bits: u8, swap: bool) -> u32 {
    match bits {
        8 => buf[sample] as u32,
        16 => {
            let v = u16::from_ne_bytes([buf[2 * sample], buf[2 * sample + 1]]);
            (if swap { v.swap_bytes() } else { v }) as u32
        }
        _ => {
            let bit = sample * bits as usize;
            let shift = 8 - bits as usize - bit % 8;
            (buf[bit / 8] >> shift) as u32 & max_value(bits)
        }
    }
}

#[inline]
fn write_raw(buf: &mut [u8], sample: usize, bits: u8, swap: bool, raw: u32) {
    match bits {
        8 => buf[sample] = raw as u8,
        16 => {
            let v = if swap { (raw as u16).swap_bytes() } else { raw as u16 };
            buf[2 * sample..2 * sample + 2].copy_from_slice(&v.to_ne_bytes());
        }
        _ => {
            let bit = sample * bits as usize;
            let shift = 8 - bits as usize - bit % 8;
            let mask = (max_value(bits) as u8) << shift;
            let byte = &mut buf[bit / 8];
            *byte = (*byte & !mask) | (((raw as u8) << shift) & mask);
        }
    }
}

#[derive(Debug)]
pub struct Interleaved8 {
    pub channels: usize,
}

impl PixelCodec for Interleaved8 {
    #[inline]
    fn unpack(&self, src: &[u8], index: usize, _plane_len: usize, out: &mut [u16]) {
        let px = &src[index * self.channels..(index + 1) * self.channels];
        for (o, &v) in out.iter_mut().zip(px) {
            *o = v as u16 * 257;
        }
    }

    #[inline]
    fn pack(&self, dst: &mut [u8], index: usize, _plane_len: usize, values: &[u16]) {
        let px = &mut dst[index * self.channels..(index + 1) * self.channels];
        for (d, &v) in px.iter_mut().zip(values) {
            *d = reduce_sample(v, 8) as u8;
        }
    }
}

#[derive(Debug)]
pub struct Interleaved16 {
    pub channels: usize,
    pub swap: bool,
}

impl PixelCodec for Interleaved16 {
    #[inline]
    fn unpack(&self, src: &[u8], index: usize, _plane_len: usize, out: &mut [u16]) {
        let first = index * self.channels;
        for (c, o) in out.iter_mut().take(self.channels).enumerate() {
            *o = read_raw(src, first + c, 16, self.swap) as u16;
        }
    }

    #[inline]
    fn pack(&self, dst: &mut [u8], index: usize, _plane_len: usize, values: &[u16]) {
        let first = index * self.channels;
        for (c, &v) in values.iter().take(self.channels).enumerate() {
            write_raw(dst, first + c, 16, self.swap, v as u32);
        }
    }
}

/// 1, 2 or 4 bits per sample, packed MSB first across pixels
#[derive(Debug)]
pub struct PackedBits {
    pub channels: usize,
    pub bits: u8,
}

impl PixelCodec for PackedBits {
    fn unpack(&self, src: &[u8], index: usize, _plane_len: usize, out: &mut [u16]) {
        let first = index * self.channels;
        for (c, o) in out.iter_mut().take(self.channels).enumerate() {
            *o = expand_sample(read_raw(src, first + c, self.bits, false), self.bits);
        }
    }

    fn pack(&self, dst: &mut [u8], index: usize, _plane_len: usize, values: &[u16]) {
        let first = index * self.channels;
        for (c, &v) in values.iter().take(self.channels).enumerate() {
            write_raw(dst, first + c, self.bits, false, reduce_sample(v, self.bits));
        }
    }
}

/// Channel planes back to back, each `plane_len` bytes
#[derive(Debug)]
pub struct Planar {
    pub channels: usize,
    /// Single-channel codec applied inside each plane
    pub inner: Box<dyn PixelCodec>,
}

impl PixelCodec for Planar {
    fn unpack(&self, src: &[u8], index: usize, plane_len: usize, out: &mut [u16]) {
        for (c, o) in out.iter_mut().take(self.channels).enumerate() {
            let plane = &src[c * plane_len..(c + 1) * plane_len];
            self.inner.unpack(plane, index, plane_len, std::slice::from_mut(o));
        }
    }

    fn pack(&self, dst: &mut [u8], index: usize, plane_len: usize, values: &[u16]) {
        for (c, v) in values.iter().take(self.channels).enumerate() {
            let plane = &mut dst[c * plane_len..(c + 1) * plane_len];
            self.inner.pack(plane, index, plane_len, std::slice::from_ref(v));
        }
    }
}

/// Palette indices; packing writes the nearest entry
#[derive(Debug)]
pub struct Indexed {
    pub table: IndexTable,
    pub bits: u8,
    pub swap: bool,
}

impl PixelCodec for Indexed {
    fn unpack(&self, src: &[u8], index: usize, _plane_len: usize, out: &mut [u16]) {
        let raw = read_raw(src, index, self.bits, self.swap);
        let entry = self.table.entry(raw as usize);
        out[..entry.len()].copy_from_slice(entry);
    }

    fn pack(&self, dst: &mut [u8], index: usize, _plane_len: usize, values: &[u16]) {
        let nearest = self.table.nearest(values).min(max_value(self.bits) as usize);
        write_raw(dst, index, self.bits, self.swap, nearest as u32);
    }
}
