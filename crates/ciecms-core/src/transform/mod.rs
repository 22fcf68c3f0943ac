//! Pixel transforms
//!
//! [`TransformEvaluator`] runs a [`LutChain`] over raw pixel buffers:
//! unpack → (gamut check) → chain → pack, with a single-entry cache of the
//! last pixel.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ciecms_core::transform::{EvaluatorOptions, PixelFormat, TransformCache, TransformEvaluator};
//!
//! let eval = TransformEvaluator::new(
//!     Arc::new(chain),
//!     PixelFormat::rgb8(),
//!     PixelFormat::cmyk8(),
//!     EvaluatorOptions::default(),
//! )?;
//! let mut cache = TransformCache::new();
//! let stats = eval.run(&src, &mut dst, pixels, &mut cache)?;
//! ```

mod cache;
mod codec;

pub use cache::{Channels, NoCache, PixelCache, SharedCache, TransformCache};
pub use codec::{
    IndexTable, Indexed, Interleaved8, Interleaved16, PackedBits, PixelCodec, PixelFormat, Planar,
    codec_for, expand_sample, reduce_sample,
};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::math::{Interpolation, MAX_GRID_INPUTS};
use crate::pipeline::{GamutChecker, LutChain};

/// Configuration generations; 0 is never handed out, so a fresh cache
/// never matches an evaluator
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Evaluator settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EvaluatorOptions {
    /// Reuse the previous pixel's result when the input repeats
    pub cache: bool,
    /// CLUT interpolation applied to the chain
    pub interpolation: Interpolation,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            cache: true,
            interpolation: Interpolation::Multilinear,
        }
    }
}

impl EvaluatorOptions {
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }
}

/// Counters of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub pixels: usize,
    /// Pixels served from the cache
    pub cache_hits: usize,
    /// Evaluated pixels replaced by the alarm color
    pub out_of_gamut: usize,
}

/// Chain plus source and destination formats
///
/// Immutable during runs; `run` takes `&self` and a caller-owned cache, so
/// one evaluator can serve many threads.
#[derive(Debug)]
pub struct TransformEvaluator {
    chain: Arc<LutChain>,
    src_format: PixelFormat,
    dst_format: PixelFormat,
    unpacker: Box<dyn PixelCodec>,
    packer: Box<dyn PixelCodec>,
    gamut: Option<GamutChecker>,
    alarm: Channels,
    options: EvaluatorOptions,
    generation: u64,
}

impl TransformEvaluator {
    pub fn new(
        chain: Arc<LutChain>,
        src_format: PixelFormat,
        dst_format: PixelFormat,
        options: EvaluatorOptions,
    ) -> Result<Self> {
        src_format.validate()?;
        dst_format.validate()?;
        let chain = Self::prepare_chain(chain, &src_format, &dst_format, options)?;

        let unpacker = codec_for(&src_format);
        let packer = codec_for(&dst_format);
        tracing::debug!(
            src_channels = src_format.channels,
            src_bits = src_format.bits,
            dst_channels = dst_format.channels,
            dst_bits = dst_format.bits,
            fast_path = chain.is_single_clut(),
            cache = options.cache,
            "created transform evaluator"
        );

        Ok(Self {
            chain,
            src_format,
            dst_format,
            unpacker,
            packer,
            gamut: None,
            alarm: Channels::zeroed(),
            options,
            generation: next_generation(),
        })
    }

    fn prepare_chain(
        chain: Arc<LutChain>,
        src: &PixelFormat,
        dst: &PixelFormat,
        options: EvaluatorOptions,
    ) -> Result<Arc<LutChain>> {
        if chain.input_channels() != src.channels {
            return Err(Error::ChannelCountMismatch {
                expected: chain.input_channels(),
                actual: src.channels,
            });
        }
        if chain.output_channels() != dst.channels {
            return Err(Error::ChannelCountMismatch {
                expected: chain.output_channels(),
                actual: dst.channels,
            });
        }
        if chain.interpolation() == options.interpolation {
            Ok(chain)
        } else {
            Ok(Arc::new(
                chain.as_ref().clone().with_interpolation(options.interpolation),
            ))
        }
    }

    pub fn chain(&self) -> &Arc<LutChain> {
        &self.chain
    }

    pub fn src_format(&self) -> &PixelFormat {
        &self.src_format
    }

    pub fn dst_format(&self) -> &PixelFormat {
        &self.dst_format
    }

    pub fn options(&self) -> EvaluatorOptions {
        self.options
    }

    /// Configuration generation; changes on every reconfiguration
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the chain; channel counts must still match the formats
    pub fn set_chain(&mut self, chain: Arc<LutChain>) -> Result<()> {
        self.chain = Self::prepare_chain(chain, &self.src_format, &self.dst_format, self.options)?;
        self.generation = next_generation();
        Ok(())
    }

    /// Flag pixels with `checker` and write its alarm color for them
    pub fn set_gamut_check(&mut self, checker: GamutChecker) -> Result<()> {
        if checker.input_channels() != self.src_format.channels {
            return Err(Error::ChannelCountMismatch {
                expected: self.src_format.channels,
                actual: checker.input_channels(),
            });
        }
        if checker.alarm().len() != self.dst_format.channels {
            return Err(Error::ChannelCountMismatch {
                expected: self.dst_format.channels,
                actual: checker.alarm().len(),
            });
        }
        let mut alarm = Channels::zeroed();
        alarm.0[..checker.alarm().len()].copy_from_slice(checker.alarm());
        self.alarm = alarm;
        self.gamut = Some(checker);
        self.generation = next_generation();
        Ok(())
    }

    pub fn clear_gamut_check(&mut self) {
        self.gamut = None;
        self.alarm = Channels::zeroed();
        self.generation = next_generation();
    }

    /// Transform `pixel_count` pixels from `src` into `dst`
    ///
    /// Both buffers are checked before anything is written. `cache` belongs
    /// to the calling context; an entry left by another configuration is
    /// dropped first.
    pub fn run(
        &self,
        src: &[u8],
        dst: &mut [u8],
        pixel_count: usize,
        cache: &mut TransformCache,
    ) -> Result<RunStats> {
        if self.options.cache {
            cache.sync(self.generation);
            self.run_with(src, dst, pixel_count, cache)
        } else {
            self.run_with(src, dst, pixel_count, &mut NoCache)
        }
    }

    /// [`run`](Self::run) against a cache shared between contexts
    pub fn run_shared(
        &self,
        src: &[u8],
        dst: &mut [u8],
        pixel_count: usize,
        shared: &SharedCache,
    ) -> Result<RunStats> {
        let mut cache = shared.snapshot();
        let stats = self.run(src, dst, pixel_count, &mut cache)?;
        shared.commit(cache);
        Ok(stats)
    }

    fn run_with<C: PixelCache>(
        &self,
        src: &[u8],
        dst: &mut [u8],
        pixel_count: usize,
        cache: &mut C,
    ) -> Result<RunStats> {
        let src_len = self.src_format.buffer_len(pixel_count)?;
        if src.len() < src_len {
            return Err(Error::BufferTooSmall {
                required: src_len,
                actual: src.len(),
            });
        }
        let dst_len = self.dst_format.buffer_len(pixel_count)?;
        if dst.len() < dst_len {
            return Err(Error::BufferTooSmall {
                required: dst_len,
                actual: dst.len(),
            });
        }
        let src_plane = self.src_format.plane_len(pixel_count)?;
        let dst_plane = self.dst_format.plane_len(pixel_count)?;

        let in_ch = self.src_format.channels;
        let out_ch = self.dst_format.channels;
        let mut stats = RunStats {
            pixels: pixel_count,
            ..RunStats::default()
        };

        for i in 0..pixel_count {
            let mut input = Channels::zeroed();
            self.unpacker.unpack(src, i, src_plane, &mut input.0[..in_ch]);

            let output = match cache.lookup(&input) {
                Some(hit) => {
                    stats.cache_hits += 1;
                    hit
                }
                None => {
                    let output = match &self.gamut {
                        Some(checker) if checker.check(&input.0[..in_ch]) => {
                            stats.out_of_gamut += 1;
                            self.alarm
                        }
                        _ => self.eval_pixel(&input),
                    };
                    cache.store(&input, &output);
                    output
                }
            };
            self.packer.pack(dst, i, dst_plane, &output.0[..out_ch]);
        }

        tracing::trace!(
            pixels = stats.pixels,
            cache_hits = stats.cache_hits,
            out_of_gamut = stats.out_of_gamut,
            "transform run"
        );
        Ok(stats)
    }

    /// One pixel through the chain, or straight through its only CLUT
    #[inline]
    fn eval_pixel(&self, input: &Channels) -> Channels {
        let in_ch = self.chain.input_channels();
        let out_ch = self.chain.output_channels();
        let mut values = [0.0f64; MAX_GRID_INPUTS + 1];
        for (v, &raw) in values.iter_mut().zip(&input.0[..in_ch]) {
            *v = raw as f64 / 65535.0;
        }

        let mut result = [0.0f64; MAX_GRID_INPUTS + 1];
        match self.chain.single_clut() {
            Some(clut) => clut.eval(&values[..in_ch], &mut result, self.chain.interpolation()),
            None => self.chain.eval_into(&values, &mut result),
        }

        let mut output = Channels::zeroed();
        for (o, v) in output.0.iter_mut().zip(&result[..out_ch]) {
            *o = quantize(*v);
        }
        output
    }
}

#[inline]
fn quantize(v: f64) -> u16 {
    let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
    (v * 65535.0).round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Clut, Curve, Stage};

    fn identity_eval(format: PixelFormat) -> TransformEvaluator {
        let chain = Arc::new(LutChain::identity(format.channels).unwrap());
        TransformEvaluator::new(chain, format.clone(), format, EvaluatorOptions::default()).unwrap()
    }

    /// 3-input table flagging the outermost shell of an 11-node cube, so
    /// any channel above 0.9 reads as out of gamut
    fn edge_flag_chain() -> Arc<LutChain> {
        let n = 11usize;
        let mut data = Vec::with_capacity(n * n * n);
        for r in 0..n {
            for g in 0..n {
                for b in 0..n {
                    data.push(if [r, g, b].contains(&(n - 1)) { 1.0 } else { 0.0 });
                }
            }
        }
        Arc::new(LutChain::new(vec![Stage::Clut(Clut::new(vec![n; 3], 1, data).unwrap())]).unwrap())
    }

    #[test]
    fn test_identity_8bit() {
        let eval = identity_eval(PixelFormat::rgb8());
        let src: Vec<u8> = (0..=255).collect::<Vec<u8>>().repeat(3);
        let mut dst = vec![0u8; src.len()];
        let mut cache = TransformCache::new();
        let stats = eval.run(&src, &mut dst, 256, &mut cache).unwrap();
        assert_eq!(dst, src);
        assert_eq!(stats.pixels, 256);
    }

    #[test]
    fn test_cache_hits_on_repeats() {
        let eval = identity_eval(PixelFormat::rgb8());
        let src = [9u8, 8, 7].repeat(10);
        let mut dst = vec![0u8; 30];
        let mut cache = TransformCache::new();
        let stats = eval.run(&src, &mut dst, 10, &mut cache).unwrap();
        assert_eq!(stats.cache_hits, 9);
        assert_eq!(dst, src);

        // The entry survives into the next run of the same evaluator
        let stats = eval.run(&src[..3], &mut dst[..3], 1, &mut cache).unwrap();
        assert_eq!(stats.cache_hits, 1);
    }

    #[test]
    fn test_cache_disabled() {
        let chain = Arc::new(LutChain::identity(3).unwrap());
        let eval = TransformEvaluator::new(
            chain,
            PixelFormat::rgb8(),
            PixelFormat::rgb8(),
            EvaluatorOptions::default().with_cache(false),
        )
        .unwrap();
        let src = [1u8, 2, 3].repeat(4);
        let mut dst = vec![0u8; 12];
        let mut cache = TransformCache::new();
        let stats = eval.run(&src, &mut dst, 4, &mut cache).unwrap();
        assert_eq!(stats.cache_hits, 0);
        assert!(!cache.is_valid());
    }

    #[test]
    fn test_reconfiguration_invalidates_cache() {
        let mut eval = identity_eval(PixelFormat::rgb8());
        let src = [50u8, 100, 150];
        let mut dst = [0u8; 3];
        let mut cache = TransformCache::new();
        eval.run(&src, &mut dst, 1, &mut cache).unwrap();

        let gen_before = eval.generation();
        let invert = LutChain::new(vec![Stage::Curves(vec![
            Curve::Table(vec![1.0, 0.0]);
            3
        ])])
        .unwrap();
        eval.set_chain(Arc::new(invert)).unwrap();
        assert_ne!(eval.generation(), gen_before);

        let stats = eval.run(&src, &mut dst, 1, &mut cache).unwrap();
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(dst, [205, 155, 105]);
    }

    #[test]
    fn test_channel_mismatch() {
        let chain = Arc::new(LutChain::identity(3).unwrap());
        let err = TransformEvaluator::new(
            chain.clone(),
            PixelFormat::cmyk8(),
            PixelFormat::rgb8(),
            EvaluatorOptions::default(),
        );
        assert!(matches!(err, Err(Error::ChannelCountMismatch { .. })));

        let err = TransformEvaluator::new(
            chain,
            PixelFormat::rgb8(),
            PixelFormat::gray8(),
            EvaluatorOptions::default(),
        );
        assert!(matches!(err, Err(Error::ChannelCountMismatch { .. })));
    }

    #[test]
    fn test_destination_too_small_is_untouched() {
        let eval = identity_eval(PixelFormat::rgb8());
        let src = [10u8; 12];
        let mut dst = [0xAAu8; 9];
        let mut cache = TransformCache::new();
        let err = eval.run(&src, &mut dst, 4, &mut cache);
        assert!(matches!(
            err,
            Err(Error::BufferTooSmall {
                required: 12,
                actual: 9
            })
        ));
        assert_eq!(dst, [0xAA; 9]);

        assert!(matches!(
            eval.run(&src[..6], &mut [0u8; 12], 4, &mut cache),
            Err(Error::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_gamut_alarm() {
        let mut eval = identity_eval(PixelFormat::rgb8());
        let checker = GamutChecker::new(edge_flag_chain(), &[1.0, 0.0, 0.0]).unwrap();
        eval.set_gamut_check(checker).unwrap();

        // 242 / 255 = 0.949
        let src = [242u8, 26, 26, 26, 26, 26];
        let mut dst = [0u8; 6];
        let mut cache = TransformCache::new();
        let stats = eval.run(&src, &mut dst, 2, &mut cache).unwrap();
        assert_eq!(&dst[..3], &[255, 0, 0]);
        assert_eq!(&dst[3..], &[26, 26, 26]);
        assert_eq!(stats.out_of_gamut, 1);

        eval.clear_gamut_check();
        eval.run(&src, &mut dst, 2, &mut cache).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn test_gamut_alarm_on_normalized_inputs() {
        use crate::icc::encode_u16;

        // Flags any channel above 0.9, alarm (1, 0, 0)
        let mut eval = identity_eval(PixelFormat::rgb16());
        let checker = GamutChecker::new(edge_flag_chain(), &[1.0, 0.0, 0.0]).unwrap();
        eval.set_gamut_check(checker).unwrap();

        let pixels = [[0.95, 0.1, 0.1], [0.85, 0.1, 0.1]];
        let mut src = Vec::new();
        for v in pixels.iter().flatten() {
            src.extend_from_slice(&encode_u16(*v).unwrap().to_ne_bytes());
        }
        let mut dst = vec![0u8; src.len()];
        let stats = eval.run(&src, &mut dst, 2, &mut TransformCache::new()).unwrap();

        let out: Vec<u16> = dst
            .chunks_exact(2)
            .map(|b| u16::from_ne_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(&out[..3], &[65535, 0, 0]);
        assert_eq!(&src[6..], &dst[6..]);
        assert_eq!(stats.out_of_gamut, 1);
    }

    #[test]
    fn test_gamut_alarm_width() {
        let mut eval = identity_eval(PixelFormat::rgb8());
        let checker = GamutChecker::new(edge_flag_chain(), &[1.0]).unwrap();
        assert!(matches!(
            eval.set_gamut_check(checker),
            Err(Error::ChannelCountMismatch { .. })
        ));
    }

    #[test]
    fn test_single_clut_fast_path_matches_chain() {
        // Same CLUT alone and behind an identity curve stage
        let n = 5usize;
        let data: Vec<f64> = (0..n * n * n * 3)
            .map(|i| ((i * 37) % 101) as f64 / 100.0)
            .collect();
        let clut = Clut::new(vec![n; 3], 3, data).unwrap();
        let fast = Arc::new(LutChain::new(vec![Stage::Clut(clut.clone())]).unwrap());
        let stages = vec![Stage::Curves(vec![Curve::Identity; 3]), Stage::Clut(clut)];
        let slow = Arc::new(LutChain::new(stages).unwrap());
        assert!(fast.is_single_clut() && !slow.is_single_clut());

        let src: Vec<u8> = (0..300u32).map(|i| (i * 53 % 256) as u8).collect();
        let mut out_fast = vec![0u8; 300];
        let mut out_slow = vec![0u8; 300];
        let opts = EvaluatorOptions::default().with_cache(false);
        TransformEvaluator::new(fast, PixelFormat::rgb8(), PixelFormat::rgb8(), opts)
            .unwrap()
            .run(&src, &mut out_fast, 100, &mut TransformCache::new())
            .unwrap();
        TransformEvaluator::new(slow, PixelFormat::rgb8(), PixelFormat::rgb8(), opts)
            .unwrap()
            .run(&src, &mut out_slow, 100, &mut TransformCache::new())
            .unwrap();
        assert_eq!(out_fast, out_slow);
    }

    #[test]
    fn test_shared_cache_run() {
        let eval = identity_eval(PixelFormat::rgb8());
        let shared = SharedCache::new();
        let src = [3u8, 4, 5];
        let mut dst = [0u8; 3];
        eval.run_shared(&src, &mut dst, 1, &shared).unwrap();
        let stats = eval.run_shared(&src, &mut dst, 1, &shared).unwrap();
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(dst, src);
    }

    #[test]
    fn test_remapped_destination_writes_nearest_entry() {
        // black, red, blue
        let palette = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        let table = IndexTable::from_f64(3, &palette).unwrap();
        let dst_format = PixelFormat::new(1, 4).with_remap(table);
        let chain = Arc::new(LutChain::identity(3).unwrap());
        let mut eval = TransformEvaluator::new(
            chain,
            PixelFormat::rgb8(),
            dst_format,
            EvaluatorOptions::default(),
        )
        .unwrap();

        let src = [250u8, 5, 0, 0, 0, 200, 10, 10, 10];
        // Three 4-bit indices
        let mut dst = [0xFFu8; 2];
        eval.run(&src, &mut dst, 3, &mut TransformCache::new()).unwrap();
        assert_eq!(dst, [0x12, 0x0F]);

        // Alarm colors go through the palette as well
        let checker = GamutChecker::new(edge_flag_chain(), &[0.0, 0.0, 1.0]).unwrap();
        eval.set_gamut_check(checker).unwrap();
        let src = [255u8, 0, 0, 20, 20, 20];
        let mut dst = [0u8; 1];
        eval.run(&src, &mut dst, 2, &mut TransformCache::new()).unwrap();
        assert_eq!(dst, [0x20]);
    }
}
