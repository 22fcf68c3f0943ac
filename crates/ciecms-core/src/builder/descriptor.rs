//! Color-space descriptors consumed by the profile builder
//!
//! Matrices follow the page-description convention: row `i` holds the
//! contribution of input component `i`, so a vector is transformed as
//! `out = v * M`. The builder transposes them into the column convention
//! used by [`Matrix3x3::multiply_vec`].

use crate::color::{D50, white_point_is_valid};
use crate::error::{Error, Result};
use crate::math::{MAX_GRID_INPUTS, Matrix3x3, interpolate_multilinear, lut1d_interp};

/// 1-D curve sampled uniformly over the domain [0, 1]
///
/// Decode curves of CIE-based spaces span the component range: sample 0
/// is the value at the range minimum, the last sample at its maximum.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SampledCurve {
    pub samples: Vec<f64>,
}

impl SampledCurve {
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples }
    }

    /// Two-point identity
    pub fn identity() -> Self {
        Self::new(vec![0.0, 1.0])
    }

    /// Sample `f` at `n` uniformly spaced positions
    pub fn from_fn(n: usize, f: impl Fn(f64) -> f64) -> Self {
        let last = n.saturating_sub(1).max(1) as f64;
        Self::new((0..n).map(|i| f(i as f64 / last)).collect())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn eval(&self, x: f64) -> f64 {
        lut1d_interp(&self.samples, x)
    }

    /// At least two finite samples, non-decreasing or non-increasing
    pub fn validate(&self, name: &str) -> Result<()> {
        if self.samples.len() < 2 {
            return Err(Error::invalid(format!(
                "{name} has {} samples, need at least 2",
                self.samples.len()
            )));
        }
        if let Some(bad) = self.samples.iter().find(|v| !v.is_finite()) {
            return Err(Error::invalid(format!("{name} holds non-finite sample {bad}")));
        }
        let rising = self.samples.windows(2).all(|w| w[0] <= w[1]);
        let falling = self.samples.windows(2).all(|w| w[0] >= w[1]);
        if !rising && !falling {
            return Err(Error::invalid(format!("{name} is not monotonic")));
        }
        Ok(())
    }
}

/// Regular grid of samples; first axis varies slowest, node outputs contiguous
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampledTable {
    pub grid: Vec<usize>,
    pub outputs: usize,
    /// Normalized to [0, 1]
    pub data: Vec<f64>,
}

impl SampledTable {
    pub fn new(grid: Vec<usize>, outputs: usize, data: Vec<f64>) -> Self {
        Self {
            grid,
            outputs,
            data,
        }
    }

    /// Tabulate `f` over a grid; `f` writes `outputs` values per node
    pub fn from_fn(
        grid: Vec<usize>,
        outputs: usize,
        mut f: impl FnMut(&[f64], &mut [f64]),
    ) -> Self {
        let nodes: usize = grid.iter().product();
        let mut data = vec![0.0; nodes * outputs];
        let mut coords = vec![0.0; grid.len()];
        for (node, out) in data.chunks_exact_mut(outputs.max(1)).enumerate() {
            let mut rest = node;
            for axis in (0..grid.len()).rev() {
                let n = grid[axis];
                coords[axis] = (rest % n) as f64 / (n - 1).max(1) as f64;
                rest /= n;
            }
            f(&coords, out);
        }
        Self::new(grid, outputs, data)
    }

    pub fn inputs(&self) -> usize {
        self.grid.len()
    }

    /// Multilinear lookup; `out` receives `outputs` values
    pub fn eval(&self, input: &[f64], out: &mut [f64]) {
        interpolate_multilinear(&self.grid, &self.data, self.outputs, input, out);
    }

    pub fn validate(
        &self,
        name: &str,
        inputs: Option<usize>,
        outputs: Option<usize>,
    ) -> Result<()> {
        if self.grid.is_empty() || self.grid.len() > MAX_GRID_INPUTS {
            return Err(Error::invalid(format!(
                "{name} has {} input axes",
                self.grid.len()
            )));
        }
        if let Some(expected) = inputs {
            if self.grid.len() != expected {
                return Err(Error::invalid(format!(
                    "{name} has {} input axes, expected {expected}",
                    self.grid.len()
                )));
            }
        }
        if let Some(&g) = self.grid.iter().find(|&&g| !(2..=255).contains(&g)) {
            return Err(Error::invalid(format!(
                "{name} axis of {g} points, need 2..=255"
            )));
        }
        if self.outputs == 0 || self.outputs > MAX_GRID_INPUTS {
            return Err(Error::invalid(format!(
                "{name} has {} outputs",
                self.outputs
            )));
        }
        if let Some(expected) = outputs {
            if self.outputs != expected {
                return Err(Error::invalid(format!(
                    "{name} has {} outputs, expected {expected}",
                    self.outputs
                )));
            }
        }
        let nodes = self
            .grid
            .iter()
            .try_fold(self.outputs, |acc, &g| acc.checked_mul(g))
            .ok_or_else(|| Error::invalid(format!("{name} grid size overflows")))?;
        if self.data.len() != nodes {
            return Err(Error::invalid(format!(
                "{name} holds {} values, grid needs {nodes}",
                self.data.len()
            )));
        }
        if let Some(bad) = self.data.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(Error::invalid(format!("{name} value {bad} outside [0, 1]")));
        }
        Ok(())
    }
}

/// `[min, max]` of one component
pub type ComponentRange = [f64; 2];

/// Default range of every component
pub const UNIT_RANGE: ComponentRange = [0.0, 1.0];

#[cfg(feature = "serde")]
fn unit_range() -> ComponentRange {
    UNIT_RANGE
}

fn unit_ranges<const N: usize>() -> [ComponentRange; N] {
    [UNIT_RANGE; N]
}

/// White point, black point and the LMN stage shared by CIE-based spaces
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CieLmn {
    pub white_point: [f64; 3],
    pub black_point: [f64; 3],
    /// Bounds of L, M and N before DecodeLMN
    #[cfg_attr(feature = "serde", serde(default = "unit_ranges::<3>"))]
    pub range_lmn: [ComponentRange; 3],
    pub decode_lmn: Option<[SampledCurve; 3]>,
    pub matrix_lmn: Matrix3x3,
}

impl Default for CieLmn {
    fn default() -> Self {
        Self {
            white_point: D50,
            black_point: [0.0; 3],
            range_lmn: unit_ranges(),
            decode_lmn: None,
            matrix_lmn: Matrix3x3::identity(),
        }
    }
}

impl CieLmn {
    pub fn with_white_point(white_point: [f64; 3]) -> Self {
        Self {
            white_point,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        validate_points(&self.white_point, &self.black_point)?;
        validate_ranges("RangeLMN", &self.range_lmn)?;
        validate_matrix("MatrixLMN", &self.matrix_lmn)?;
        validate_curves("DecodeLMN", self.decode_lmn.as_ref().map(|c| &c[..]))
    }

    pub fn has_unit_range(&self) -> bool {
        ranges_are_unit(&self.range_lmn)
    }

    /// LMN to XYZ relative to the source white
    ///
    /// Values are clipped to RangeLMN. Without DecodeLMN the unit range
    /// leaves them untouched.
    pub(crate) fn apply(&self, mut lmn: [f64; 3]) -> [f64; 3] {
        match &self.decode_lmn {
            Some(curves) => {
                for ((v, c), r) in lmn.iter_mut().zip(curves).zip(&self.range_lmn) {
                    *v = c.eval(range_fraction(*r, *v));
                }
            }
            None if !self.has_unit_range() => {
                for (v, r) in lmn.iter_mut().zip(&self.range_lmn) {
                    *v = v.clamp(r[0], r[1]);
                }
            }
            None => {}
        }
        self.matrix_lmn.transpose().multiply_vec(lmn)
    }
}

/// CIEBasedA: A → DecodeA → MatrixA → LMN stage
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CieBasedA {
    #[cfg_attr(feature = "serde", serde(default = "unit_range"))]
    pub range_a: ComponentRange,
    pub decode_a: SampledCurve,
    pub matrix_a: [f64; 3],
    pub lmn: CieLmn,
}

impl CieBasedA {
    pub(crate) fn validate(&self) -> Result<()> {
        validate_ranges("RangeA", &[self.range_a])?;
        self.decode_a.validate("DecodeA")?;
        if self.matrix_a.iter().any(|v| !v.is_finite()) {
            return Err(Error::invalid("MatrixA is not finite"));
        }
        self.lmn.validate()
    }

    pub fn has_unit_ranges(&self) -> bool {
        self.range_a == UNIT_RANGE && self.lmn.has_unit_range()
    }

    /// Device value in [0, 1] spanning RangeA to XYZ relative to the source white
    pub(crate) fn to_xyz(&self, x: f64) -> [f64; 3] {
        let a = self.decode_a.eval(x);
        self.lmn.apply(self.matrix_a.map(|m| a * m))
    }
}

/// CIEBasedABC: ABC → DecodeABC → MatrixABC → LMN stage
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CieBasedAbc {
    #[cfg_attr(feature = "serde", serde(default = "unit_ranges::<3>"))]
    pub range_abc: [ComponentRange; 3],
    pub decode_abc: Option<[SampledCurve; 3]>,
    pub matrix_abc: Matrix3x3,
    pub lmn: CieLmn,
}

impl Default for CieBasedAbc {
    fn default() -> Self {
        Self {
            range_abc: unit_ranges(),
            decode_abc: None,
            matrix_abc: Matrix3x3::identity(),
            lmn: CieLmn::default(),
        }
    }
}

impl CieBasedAbc {
    pub(crate) fn validate(&self) -> Result<()> {
        validate_ranges("RangeABC", &self.range_abc)?;
        validate_curves("DecodeABC", self.decode_abc.as_ref().map(|c| &c[..]))?;
        validate_matrix("MatrixABC", &self.matrix_abc)?;
        self.lmn.validate()
    }

    pub fn has_unit_ranges(&self) -> bool {
        ranges_are_unit(&self.range_abc) && self.lmn.has_unit_range()
    }

    /// Decoded and mixed ABC, before the LMN stage; inputs are fractions
    /// of RangeABC
    pub(crate) fn to_lmn(&self, abc: [f64; 3]) -> [f64; 3] {
        let curves = self.decode_abc.as_ref();
        let decoded: [f64; 3] = std::array::from_fn(|i| {
            decode_component(curves.map(|c| &c[i]), self.range_abc[i], abc[i])
        });
        self.matrix_abc.transpose().multiply_vec(decoded)
    }

    /// ABC to XYZ relative to the source white
    pub(crate) fn to_xyz(&self, abc: [f64; 3]) -> [f64; 3] {
        self.lmn.apply(self.to_lmn(abc))
    }
}

/// CIEBasedDEF: DEF → DecodeDEF → Table → ABC stage
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CieBasedDef {
    #[cfg_attr(feature = "serde", serde(default = "unit_ranges::<3>"))]
    pub range_def: [ComponentRange; 3],
    /// Decoded values index the table over [0, 1]
    pub decode_def: Option<[SampledCurve; 3]>,
    pub table: SampledTable,
    pub abc: CieBasedAbc,
}

/// CIEBasedDEFG: DEFG → DecodeDEFG → Table → ABC stage
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CieBasedDefg {
    #[cfg_attr(feature = "serde", serde(default = "unit_ranges::<4>"))]
    pub range_defg: [ComponentRange; 4],
    pub decode_defg: Option<[SampledCurve; 4]>,
    pub table: SampledTable,
    pub abc: CieBasedAbc,
}

/// Device-independent color space definition
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorSpaceDescriptor {
    CalGray {
        white_point: [f64; 3],
        black_point: [f64; 3],
        gamma: f64,
    },
    CalRgb {
        white_point: [f64; 3],
        black_point: [f64; 3],
        gamma: [f64; 3],
        /// Rows are the XYZ of the A, B and C primaries
        matrix: Matrix3x3,
    },
    Lab {
        white_point: [f64; 3],
        black_point: [f64; 3],
        /// amin, amax, bmin, bmax
        range: [f64; 4],
    },
    CieBasedA(CieBasedA),
    CieBasedAbc(CieBasedAbc),
    CieBasedDef(CieBasedDef),
    CieBasedDefg(CieBasedDefg),
}

impl ColorSpaceDescriptor {
    /// Family name, used in descriptions and errors
    pub fn family(&self) -> &'static str {
        match self {
            Self::CalGray { .. } => "CalGray",
            Self::CalRgb { .. } => "CalRGB",
            Self::Lab { .. } => "Lab",
            Self::CieBasedA(_) => "CIEBasedA",
            Self::CieBasedAbc(_) => "CIEBasedABC",
            Self::CieBasedDef(_) => "CIEBasedDEF",
            Self::CieBasedDefg(_) => "CIEBasedDEFG",
        }
    }

    /// Number of source components
    pub fn channels(&self) -> usize {
        match self {
            Self::CalGray { .. } | Self::CieBasedA(_) => 1,
            Self::CieBasedDefg(_) => 4,
            _ => 3,
        }
    }
}

/// Optional render table of a rendering dictionary
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderTable {
    /// 3 inputs, 1..=15 device outputs
    pub table: SampledTable,
    /// Per-output transfer applied after the table
    pub output_curves: Option<Vec<SampledCurve>>,
}

/// Color rendering dictionary: XYZ → MatrixLMN → EncodeLMN → MatrixABC →
/// EncodeABC → render table → device
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderingDictionary {
    pub white_point: [f64; 3],
    pub black_point: [f64; 3],
    pub matrix_lmn: Matrix3x3,
    pub encode_lmn: Option<[SampledCurve; 3]>,
    pub matrix_abc: Matrix3x3,
    pub encode_abc: Option<[SampledCurve; 3]>,
    pub render_table: Option<RenderTable>,
}

impl Default for RenderingDictionary {
    fn default() -> Self {
        Self {
            white_point: D50,
            black_point: [0.0; 3],
            matrix_lmn: Matrix3x3::identity(),
            encode_lmn: None,
            matrix_abc: Matrix3x3::identity(),
            encode_abc: None,
            render_table: None,
        }
    }
}

impl RenderingDictionary {
    /// Number of device components produced
    pub fn outputs(&self) -> usize {
        self.render_table.as_ref().map_or(3, |rt| rt.table.outputs)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        validate_points(&self.white_point, &self.black_point)?;
        validate_matrix("MatrixLMN", &self.matrix_lmn)?;
        validate_matrix("MatrixABC", &self.matrix_abc)?;
        validate_curves("EncodeLMN", self.encode_lmn.as_ref().map(|c| &c[..]))?;
        validate_curves("EncodeABC", self.encode_abc.as_ref().map(|c| &c[..]))?;

        if let Some(rt) = &self.render_table {
            rt.table.validate("RenderTable", Some(3), None)?;
            if let Some(curves) = &rt.output_curves {
                if curves.len() != rt.table.outputs {
                    return Err(Error::invalid(format!(
                        "{} render table output curves for {} outputs",
                        curves.len(),
                        rt.table.outputs
                    )));
                }
                validate_curves("RenderTable output curve", Some(curves))?;
            }
        }
        Ok(())
    }

    /// Encoded LMN (after EncodeLMN) to the render table input
    pub(crate) fn encode_abc(&self, lmn: [f64; 3]) -> [f64; 3] {
        let mut abc = self.matrix_abc.transpose().multiply_vec(lmn);
        if let Some(curves) = &self.encode_abc {
            for (v, c) in abc.iter_mut().zip(curves) {
                *v = c.eval(*v);
            }
        }
        abc.map(|v| v.clamp(0.0, 1.0))
    }
}

pub(crate) fn validate_points(white: &[f64; 3], black: &[f64; 3]) -> Result<()> {
    if !white_point_is_valid(white) {
        return Err(Error::invalid(format!(
            "white point {white:?} must be finite and positive"
        )));
    }
    if black.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(Error::invalid(format!(
            "black point {black:?} must be finite and non-negative"
        )));
    }
    Ok(())
}

pub(crate) fn validate_matrix(name: &str, m: &Matrix3x3) -> Result<()> {
    if m.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid(format!("{name} is not finite")))
    }
}

/// Finite, strictly increasing bounds
pub(crate) fn validate_ranges(name: &str, ranges: &[ComponentRange]) -> Result<()> {
    for (i, [min, max]) in ranges.iter().enumerate() {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(Error::invalid(format!(
                "{name}[{i}] = [{min}, {max}] must be finite with min < max"
            )));
        }
    }
    Ok(())
}

pub(crate) fn ranges_are_unit(ranges: &[ComponentRange]) -> bool {
    ranges.iter().all(|r| *r == UNIT_RANGE)
}

/// Position of `v` within `range`, clipped to [0, 1]
pub(crate) fn range_fraction(range: ComponentRange, v: f64) -> f64 {
    ((v - range[0]) / (range[1] - range[0])).clamp(0.0, 1.0)
}

/// Component value at device fraction `x`: the decode curve, which spans
/// the range, or the range itself
pub(crate) fn decode_component(
    curve: Option<&SampledCurve>,
    range: ComponentRange,
    x: f64,
) -> f64 {
    match curve {
        Some(c) => c.eval(x),
        None => range[0] + x.clamp(0.0, 1.0) * (range[1] - range[0]),
    }
}

pub(crate) fn validate_curves(name: &str, curves: Option<&[SampledCurve]>) -> Result<()> {
    for (i, c) in curves.into_iter().flatten().enumerate() {
        c.validate(&format!("{name}[{i}]"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_validation() {
        assert!(SampledCurve::identity().validate("c").is_ok());
        assert!(SampledCurve::new(vec![1.0, 0.5, 0.0]).validate("c").is_ok());
        assert!(SampledCurve::new(vec![0.5]).validate("c").is_err());
        assert!(SampledCurve::new(vec![0.0, 0.6, 0.4]).validate("c").is_err());
        assert!(SampledCurve::new(vec![0.0, f64::NAN]).validate("c").is_err());
    }

    #[test]
    fn test_curve_from_fn() {
        let c = SampledCurve::from_fn(5, |x| x * x);
        assert_eq!(c.samples, vec![0.0, 0.0625, 0.25, 0.5625, 1.0]);
        assert_eq!(c.eval(0.5), 0.25);
    }

    #[test]
    fn test_table_from_fn_layout() {
        // First axis slowest
        let t = SampledTable::from_fn(vec![2, 3], 2, |c, out| {
            out[0] = c[0];
            out[1] = c[1];
        });
        assert_eq!(t.data.len(), 12);
        assert_eq!(&t.data[0..6], &[0.0, 0.0, 0.0, 0.5, 0.0, 1.0]);
        assert_eq!(&t.data[6..8], &[1.0, 0.0]);
        assert!(t.validate("t", Some(2), Some(2)).is_ok());
    }

    #[test]
    fn test_table_validation() {
        let ok = SampledTable::from_fn(vec![2, 2, 2], 3, |c, out| out.copy_from_slice(c));
        assert!(ok.validate("t", Some(3), Some(3)).is_ok());
        assert!(matches!(
            ok.validate("t", Some(4), Some(3)),
            Err(Error::InvalidParameter(_))
        ));

        let mut bad = ok.clone();
        bad.grid[1] = 1;
        assert!(bad.validate("t", None, None).is_err());

        let mut bad = ok.clone();
        bad.data.pop();
        assert!(bad.validate("t", None, None).is_err());

        let mut bad = ok;
        bad.data[4] = 1.25;
        assert!(bad.validate("t", None, None).is_err());
    }

    #[test]
    fn test_points() {
        assert!(validate_points(&D50, &[0.0; 3]).is_ok());
        assert!(validate_points(&[0.9, 0.0, 0.8], &[0.0; 3]).is_err());
        assert!(validate_points(&D50, &[-0.1, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_abc_stage_row_convention() {
        // Row 0 is the contribution of A
        let abc = CieBasedAbc {
            matrix_abc: Matrix3x3::new([[0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]),
            ..CieBasedAbc::default()
        };
        assert_eq!(abc.to_xyz([0.5, 0.25, 0.75]), [0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_range_validation() {
        assert!(validate_ranges("r", &[UNIT_RANGE, [-128.0, 127.0]]).is_ok());
        assert!(validate_ranges("r", &[[1.0, 1.0]]).is_err());
        assert!(validate_ranges("r", &[[0.5, 0.0]]).is_err());
        assert!(validate_ranges("r", &[[0.0, f64::INFINITY]]).is_err());
        assert!(validate_ranges("r", &[[f64::NAN, 1.0]]).is_err());

        let abc = CieBasedAbc {
            range_abc: [UNIT_RANGE, [2.0, 0.0], UNIT_RANGE],
            ..CieBasedAbc::default()
        };
        assert!(matches!(abc.validate(), Err(Error::InvalidParameter(_))));

        let mut lmn = CieLmn::default();
        lmn.range_lmn[2] = [0.0, f64::NAN];
        assert!(lmn.validate().is_err());
    }

    #[test]
    fn test_abc_range_scales_inputs() {
        // Without DecodeABC the device fraction spans the range
        let abc = CieBasedAbc {
            range_abc: [[0.0, 2.0], [-1.0, 1.0], UNIT_RANGE],
            lmn: CieLmn {
                range_lmn: [[-1.0, 2.0]; 3],
                ..CieLmn::default()
            },
            ..CieBasedAbc::default()
        };
        assert!(!abc.has_unit_ranges());
        assert_eq!(abc.to_lmn([0.25, 0.25, 1.0]), [0.5, -0.5, 1.0]);
        assert_eq!(abc.to_xyz([1.0, 0.0, 0.5]), [2.0, -1.0, 0.5]);

        // A decode curve already spans the range
        let decoded = CieBasedAbc {
            range_abc: [[0.0, 4.0]; 3],
            decode_abc: Some([
                SampledCurve::new(vec![0.0, 0.4]),
                SampledCurve::identity(),
                SampledCurve::identity(),
            ]),
            ..CieBasedAbc::default()
        };
        assert_eq!(decoded.to_lmn([0.5, 0.5, 0.5]), [0.2, 0.5, 0.5]);
    }

    #[test]
    fn test_lmn_range_clips() {
        let lmn = CieLmn {
            range_lmn: [[0.0, 0.5], UNIT_RANGE, UNIT_RANGE],
            ..CieLmn::default()
        };
        assert_eq!(lmn.apply([0.8, 0.3, 1.2]), [0.5, 0.3, 1.0]);

        // The unit range leaves undecoded values alone
        assert_eq!(CieLmn::default().apply([0.8, 0.3, 1.2]), [0.8, 0.3, 1.2]);

        // DecodeLMN spans the range
        let decoded = CieLmn {
            range_lmn: [[0.0, 2.0]; 3],
            decode_lmn: Some([
                SampledCurve::new(vec![0.0, 1.0]),
                SampledCurve::new(vec![0.0, 1.0]),
                SampledCurve::new(vec![0.0, 2.0]),
            ]),
            ..CieLmn::default()
        };
        assert_eq!(decoded.apply([1.0, 3.0, 1.0]), [0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_a_to_xyz() {
        let a = CieBasedA {
            range_a: [0.0, 2.0],
            decode_a: SampledCurve::new(vec![0.0, 2.0]),
            matrix_a: [0.5, 1.0, 0.25],
            lmn: CieLmn {
                range_lmn: [[0.0, 2.0]; 3],
                ..CieLmn::default()
            },
        };
        assert!(!a.has_unit_ranges());
        assert_eq!(a.to_xyz(0.5), [0.5, 1.0, 0.25]);
        assert_eq!(a.to_xyz(1.0), [1.0, 2.0, 0.5]);
    }
}
