//! Profile builder
//!
//! Converts [`ColorSpaceDescriptor`]s and [`RenderingDictionary`]s into
//! v4 ICC profiles:
//!
//! | Source | Class | Layout |
//! |---|---|---|
//! | CalGray, CalRGB | `scnr` | matrix/TRC (`kTRC` or `rXYZ`..`bTRC`) |
//! | CIEBasedA | `scnr`, Gray | `A2B0` A-CLUT(1→3)-M-Matrix-B |
//! | CIEBasedABC | `scnr`, RGB | `A2B0` A-CLUT-M-Matrix-B or M-Matrix-B |
//! | CIEBasedDEF(G) | `scnr`, RGB/CMYK | `A2B0` A-CLUT-(M-Matrix)-B |
//! | Lab | `spac`, Lab | `A2B0` M-Matrix-B |
//! | Rendering dictionary | `prtr` | `B2A0` B-Matrix-M-CLUT-A |
//!
//! Every stored coefficient is quantized while the profile is assembled,
//! so the in-memory [`Profile`] is exactly what its bytes decode to.

mod cal;
mod cie;
mod crd;
pub mod descriptor;
mod lab;

pub use descriptor::{
    CieBasedA, CieBasedAbc, CieBasedDef, CieBasedDefg, CieLmn, ColorSpaceDescriptor,
    ComponentRange, RenderTable, RenderingDictionary, SampledCurve, SampledTable, UNIT_RANGE,
};

use crate::color::D50;
use crate::error::{Error, Result, try_zeroed};
use crate::icc::{
    ClutData, ClutPrecision, ColorSpace, CurveData, DateTimeNumber, LutMatrix, Profile,
    ProfileClass, ProfileHeader, ProfileVersion, RenderingIntent, S15Fixed16, TagData,
    TagSignature, TextData, XyzTagData, encode_u8, encode_u16,
};
use crate::math::{Matrix3x3, adapt_xyz, lut1d_interp};

/// Largest `curv` table the builder writes
pub const MAX_CURVE_SAMPLES: usize = 65535;

/// Options shared by every build
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BuilderOptions {
    /// Header version; only 4.x layouts are produced
    pub version: ProfileVersion,
    /// Minimum entries per resampled curve
    pub curve_samples: usize,
    /// Nodes per axis for CLUTs the builder samples itself
    pub grid_points: usize,
    pub clut_precision: ClutPrecision,
    pub rendering_intent: RenderingIntent,
    /// `desc` text; defaults to the source family name
    pub description: Option<String>,
    pub copyright: String,
    /// Header timestamp; zero when unknown
    pub creation_time: DateTimeNumber,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            version: ProfileVersion::V4_2,
            curve_samples: 512,
            grid_points: 9,
            clut_precision: ClutPrecision::U16,
            rendering_intent: RenderingIntent::Perceptual,
            description: None,
            copyright: "No copyright, use freely".to_string(),
            creation_time: DateTimeNumber::default(),
        }
    }
}

impl BuilderOptions {
    pub fn with_curve_samples(mut self, n: usize) -> Self {
        self.curve_samples = n;
        self
    }

    pub fn with_grid_points(mut self, n: usize) -> Self {
        self.grid_points = n;
        self
    }

    pub fn with_clut_precision(mut self, precision: ClutPrecision) -> Self {
        self.clut_precision = precision;
        self
    }

    pub fn with_rendering_intent(mut self, intent: RenderingIntent) -> Self {
        self.rendering_intent = intent;
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn with_copyright(mut self, text: impl Into<String>) -> Self {
        self.copyright = text.into();
        self
    }

    pub fn with_creation_time(mut self, time: DateTimeNumber) -> Self {
        self.creation_time = time;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.version.major != 4 {
            return Err(Error::invalid(format!(
                "profile version {}.{} is not supported, only 4.x",
                self.version.major, self.version.minor
            )));
        }
        if !(2..=MAX_CURVE_SAMPLES).contains(&self.curve_samples) {
            return Err(Error::invalid(format!(
                "curve_samples {} outside 2..={MAX_CURVE_SAMPLES}",
                self.curve_samples
            )));
        }
        if !(2..=255).contains(&self.grid_points) {
            return Err(Error::invalid(format!(
                "grid_points {} outside 2..=255",
                self.grid_points
            )));
        }
        self.creation_time.validate()
    }
}

/// Builds ICC profiles from color-space descriptors
///
/// Owns the options and the uniform sample positions used when resampling
/// curves at the default resolution. A builder is immutable and can be
/// shared between threads.
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    options: BuilderOptions,
    ramp: Vec<f64>,
}

impl ProfileBuilder {
    pub fn new(options: BuilderOptions) -> Result<Self> {
        options.validate()?;
        let n = options.curve_samples;
        let mut ramp = try_zeroed::<f64>(n)?;
        for (i, x) in ramp.iter_mut().enumerate() {
            *x = i as f64 / (n - 1) as f64;
        }
        Ok(Self { options, ramp })
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Build a profile for any descriptor family
    pub fn build(&self, descriptor: &ColorSpaceDescriptor) -> Result<Profile> {
        match descriptor {
            ColorSpaceDescriptor::CalGray { .. } => self.build_from_cal_gray(descriptor),
            ColorSpaceDescriptor::CalRgb { .. } => self.build_from_cal_rgb(descriptor),
            ColorSpaceDescriptor::Lab { .. } => self.build_from_lab(descriptor),
            ColorSpaceDescriptor::CieBasedA(_) => self.build_from_a(descriptor),
            ColorSpaceDescriptor::CieBasedAbc(_) => self.build_from_abc(descriptor),
            ColorSpaceDescriptor::CieBasedDef(_) => self.build_from_def(descriptor),
            ColorSpaceDescriptor::CieBasedDefg(_) => self.build_from_defg(descriptor),
        }
    }

    /// Entries for a resampled curve of `source_len` samples: the smallest
    /// count >= `curve_samples` on which every source sample is a node
    pub fn curve_resolution(&self, source_len: usize) -> Result<usize> {
        if source_len < 2 {
            return Err(Error::invalid(format!(
                "curve of {source_len} samples cannot be resampled"
            )));
        }
        let step = source_len - 1;
        let n = (self.options.curve_samples - 1).div_ceil(step) * step + 1;
        if n <= MAX_CURVE_SAMPLES {
            Ok(n)
        } else if source_len <= MAX_CURVE_SAMPLES {
            Ok(source_len)
        } else {
            Err(Error::invalid(format!(
                "curve of {source_len} samples exceeds {MAX_CURVE_SAMPLES} entries"
            )))
        }
    }

    /// Resample and quantize a source curve into a `curv` table
    pub(crate) fn resample(&self, curve: &SampledCurve) -> Result<CurveData> {
        let n = self.curve_resolution(curve.len())?;
        let mut table = try_zeroed::<u16>(n)?;
        for (i, dst) in table.iter_mut().enumerate() {
            let x = if n == self.ramp.len() {
                self.ramp[i]
            } else {
                i as f64 / (n - 1) as f64
            };
            *dst = encode_u16(lut1d_interp(&curve.samples, x))?;
        }
        Ok(CurveData::Table(table))
    }

    /// One curve per channel; `None` yields identities
    pub(crate) fn curve_set(
        &self,
        curves: Option<&[SampledCurve]>,
        count: usize,
    ) -> Result<Vec<CurveData>> {
        match curves {
            Some(curves) => curves.iter().map(|c| self.resample(c)).collect(),
            None => Ok(vec![CurveData::Identity; count]),
        }
    }

    /// CLUT element with values quantized to the configured precision
    pub(crate) fn clut(&self, grid: &[usize], mut data: Vec<f64>) -> Result<ClutData> {
        let precision = self.options.clut_precision;
        for v in data.iter_mut() {
            *v = match precision {
                ClutPrecision::U8 => encode_u8(*v)? as f64 / 255.0,
                ClutPrecision::U16 => encode_u16(*v)? as f64 / 65535.0,
            };
        }
        let grid = grid
            .iter()
            .map(|&g| {
                u8::try_from(g).map_err(|_| Error::invalid(format!("grid axis of {g} points")))
            })
            .collect::<Result<Vec<u8>>>()?;
        Ok(ClutData {
            grid,
            precision,
            data,
        })
    }

    /// Sample `f` on `grid`, writing `outputs` values per node
    pub(crate) fn sample_grid(
        &self,
        grid: &[usize],
        outputs: usize,
        mut f: impl FnMut(&[f64], &mut [f64]),
    ) -> Result<ClutData> {
        if outputs == 0 || grid.is_empty() || grid.iter().any(|&g| g < 2) {
            return Err(Error::invalid(format!(
                "cannot sample a {grid:?} grid with {outputs} outputs"
            )));
        }
        let nodes = grid
            .iter()
            .try_fold(outputs, |acc, &g| acc.checked_mul(g))
            .ok_or_else(|| Error::invalid("CLUT grid size overflows"))?;
        let mut data = try_zeroed::<f64>(nodes)?;
        let mut coords = [0.0; crate::math::MAX_GRID_INPUTS];
        let k = grid.len();
        for (node, out) in data.chunks_exact_mut(outputs).enumerate() {
            let mut rest = node;
            for axis in (0..k).rev() {
                coords[axis] = (rest % grid[axis]) as f64 / (grid[axis] - 1) as f64;
                rest /= grid[axis];
            }
            f(&coords[..k], out);
        }
        self.clut(grid, data)
    }

    /// Header plus the tags every built profile carries
    pub(crate) fn start(
        &self,
        family: &str,
        class: ProfileClass,
        color_space: ColorSpace,
        pcs: ColorSpace,
        white_point: [f64; 3],
        black_point: [f64; 3],
    ) -> Result<Profile> {
        let mut header = ProfileHeader::new(class, color_space, pcs)?;
        header.version = self.options.version;
        header.rendering_intent = self.options.rendering_intent;
        header.creation_date = self.options.creation_time;

        let description = self.options.description.clone().unwrap_or_else(|| family.to_string());
        let black = adapted_black_point(black_point, white_point);

        let mut profile = Profile::new(header);
        profile.add_tag(TagSignature::DESC, TagData::Text(TextData::new(description)))?;
        profile.add_tag(
            TagSignature::COPYRIGHT,
            TagData::Text(TextData::new(self.options.copyright.clone())),
        )?;
        profile.add_tag(TagSignature::MEDIA_WHITE, TagData::Xyz(XyzTagData::from_xyz(D50)?))?;
        profile.add_tag(TagSignature::MEDIA_BLACK, TagData::Xyz(XyzTagData::from_xyz(black)?))?;
        Ok(profile)
    }

    /// Serialize once so that fixed-point overflow anywhere fails the build,
    /// and record the final size in the header
    pub(crate) fn finish(&self, mut profile: Profile, family: &str) -> Result<Profile> {
        let bytes = profile.to_bytes()?;
        profile.header.size = bytes.len() as u32;
        tracing::debug!(
            family,
            size = bytes.len(),
            tags = profile.tag_count(),
            "built profile"
        );
        Ok(profile)
    }
}

/// Matrix element quantized to s15Fixed16
pub(crate) fn lut_matrix(matrix: Matrix3x3, offset: [f64; 3]) -> Result<LutMatrix> {
    let q = |v: f64| S15Fixed16::from_f64(v).map(S15Fixed16::to_f64);
    let mut m = [[0.0; 3]; 3];
    for (dst, src) in m.iter_mut().flatten().zip(matrix.m.iter().flatten()) {
        *dst = q(*src)?;
    }
    Ok(LutMatrix {
        matrix: Matrix3x3::new(m),
        offset: [q(offset[0])?, q(offset[1])?, q(offset[2])?],
    })
}

/// Black point adapted to D50; components pushed negative by the
/// adaptation are clipped to zero
pub(crate) fn adapted_black_point(black: [f64; 3], white: [f64; 3]) -> [f64; 3] {
    let adapted = adapt_xyz(black, white, D50);
    if adapted.iter().any(|&v| v < 0.0) {
        tracing::warn!(?adapted, "negative adapted black point clipped to zero");
    }
    adapted.map(|v| v.max(0.0))
}

pub(crate) fn unsupported(builder: &str, descriptor: &ColorSpaceDescriptor) -> Error {
    Error::unsupported(format!(
        "{builder} cannot build a {} color space",
        descriptor.family()
    ))
}
