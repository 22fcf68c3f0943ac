//! Pipeline Stages
//!
//! Individual components of a lut chain.

use crate::error::{Error, Result};
use crate::icc::{ClutData, CurveData, LutMatrix};
use crate::math::{
    Interpolation, MAX_GRID_INPUTS, Matrix3x3, interpolate_multilinear, interpolate_tetrahedral,
    lut1d_interp,
};

/// Entries of a sampled inverse curve (at least the source length)
const INVERSE_SAMPLES: usize = 4096;

/// A single transfer curve over [0, 1]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Curve {
    #[default]
    Identity,
    /// `x^g`
    Gamma(f64),
    /// Uniformly spaced samples, linearly interpolated
    Table(Vec<f64>),
}

impl Curve {
    /// Create from ICC curve data
    pub fn from_icc(curve: &CurveData) -> Self {
        match curve {
            CurveData::Identity => Curve::Identity,
            CurveData::Gamma(g) => Curve::Gamma(*g),
            CurveData::Table(table) => {
                Curve::Table(table.iter().map(|&v| v as f64 / 65535.0).collect())
            }
        }
    }

    /// Evaluate with the domain clamped to [0, 1]
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        match self {
            Curve::Identity => x,
            Curve::Gamma(g) => x.powf(*g),
            Curve::Table(table) => lut1d_interp(table, x),
        }
    }

    /// Inverse curve; tables are inverted by sampling
    ///
    /// Flat runs of a table map to their lowest input.
    pub fn inverse(&self) -> Self {
        match self {
            Curve::Identity => Curve::Identity,
            Curve::Gamma(g) => Curve::Gamma(1.0 / g),
            Curve::Table(table) if table.len() < 2 => Curve::Identity,
            Curve::Table(table) => {
                let n = table.len().max(INVERSE_SAMPLES);
                let inverted = (0..n)
                    .map(|i| invert_table(table, i as f64 / (n - 1) as f64))
                    .collect();
                Curve::Table(inverted)
            }
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Curve::Identity)
    }
}

/// Input `x` with `table(x) = y`, for monotonic tables in either direction
fn invert_table(table: &[f64], y: f64) -> f64 {
    let n = table.len();
    let descending = table[n - 1] < table[0];
    let at = |i: usize| if descending { table[n - 1 - i] } else { table[i] };

    let (lo_v, hi_v) = (at(0), at(n - 1));
    let x = if y <= lo_v {
        0.0
    } else if y >= hi_v {
        1.0
    } else {
        // First index whose value reaches y
        let mut lo = 0usize;
        let mut hi = n - 1;
        while lo < hi {
            let mid = (lo + hi) / 2;
            if at(mid) < y {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        let v0 = at(lo - 1);
        let v1 = at(lo);
        let t = if v1 > v0 { (y - v0) / (v1 - v0) } else { 0.0 };
        ((lo - 1) as f64 + t) / (n - 1) as f64
    };
    if descending { 1.0 - x } else { x }
}

/// Matrix stage: `out = M * v + offset`, not clamped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixStage {
    pub matrix: Matrix3x3,
    pub offset: [f64; 3],
}

impl MatrixStage {
    pub fn new(matrix: Matrix3x3) -> Self {
        Self {
            matrix,
            offset: [0.0; 3],
        }
    }

    pub fn from_icc(m: &LutMatrix) -> Self {
        Self {
            matrix: m.matrix,
            offset: m.offset,
        }
    }

    #[inline]
    pub fn apply(&self, v: [f64; 3]) -> [f64; 3] {
        let r = self.matrix.multiply_vec(v);
        [
            r[0] + self.offset[0],
            r[1] + self.offset[1],
            r[2] + self.offset[2],
        ]
    }

    /// Inverse stage, `None` for singular matrices
    pub fn inverse(&self) -> Option<Self> {
        let inv = self.matrix.inverse()?;
        let shifted = inv.multiply_vec(self.offset);
        Some(Self {
            matrix: inv,
            offset: shifted.map(|v| -v),
        })
    }
}

/// Color lookup table over k inputs with normalized node values
#[derive(Debug, Clone, PartialEq)]
pub struct Clut {
    /// Nodes per input axis, first axis varying slowest
    pub grid: Vec<usize>,
    pub outputs: usize,
    pub data: Vec<f64>,
}

impl Clut {
    /// Validated table: 1..=15 axes of at least 2 nodes, 1..=15 outputs
    pub fn new(grid: Vec<usize>, outputs: usize, data: Vec<f64>) -> Result<Self> {
        if grid.is_empty() || grid.len() > MAX_GRID_INPUTS {
            return Err(Error::invalid(format!("CLUT with {} inputs", grid.len())));
        }
        if grid.iter().any(|&g| g < 2) {
            return Err(Error::invalid(format!("CLUT grid {grid:?} has an axis below 2 nodes")));
        }
        if outputs == 0 || outputs > MAX_GRID_INPUTS {
            return Err(Error::invalid(format!("CLUT with {outputs} outputs")));
        }
        let expected = grid
            .iter()
            .try_fold(outputs, |acc, &g| acc.checked_mul(g))
            .ok_or_else(|| Error::invalid("CLUT size overflows"))?;
        if data.len() != expected {
            return Err(Error::invalid(format!(
                "CLUT {grid:?} x {outputs} needs {expected} values, got {}",
                data.len()
            )));
        }
        Ok(Self {
            grid,
            outputs,
            data,
        })
    }

    pub fn from_icc(clut: &ClutData, outputs: usize) -> Result<Self> {
        Self::new(clut.grid.iter().map(|&g| g as usize).collect(), outputs, clut.data.clone())
    }

    pub fn inputs(&self) -> usize {
        self.grid.len()
    }

    /// Interpolate `input` (clamped to [0, 1]) into `out[..outputs]`
    #[inline]
    pub fn eval(&self, input: &[f64], out: &mut [f64], interpolation: Interpolation) {
        match (interpolation, self.grid.as_slice()) {
            (Interpolation::Tetrahedral, &[r, g, b]) => interpolate_tetrahedral(
                [r, g, b],
                &self.data,
                self.outputs,
                [input[0], input[1], input[2]],
                out,
            ),
            _ => interpolate_multilinear(&self.grid, &self.data, self.outputs, input, out),
        }
    }
}

/// One step of a [`LutChain`](super::LutChain)
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// One curve per channel
    Curves(Vec<Curve>),
    /// 3 → 3
    Matrix(MatrixStage),
    Clut(Clut),
}

impl Stage {
    pub fn input_channels(&self) -> usize {
        match self {
            Stage::Curves(curves) => curves.len(),
            Stage::Matrix(_) => 3,
            Stage::Clut(clut) => clut.inputs(),
        }
    }

    pub fn output_channels(&self) -> usize {
        match self {
            Stage::Curves(curves) => curves.len(),
            Stage::Matrix(_) => 3,
            Stage::Clut(clut) => clut.outputs,
        }
    }

    /// Curves stage, or `None` when every curve is the identity
    pub(crate) fn curves(curves: &[CurveData]) -> Option<Self> {
        if curves.iter().all(CurveData::is_identity) {
            None
        } else {
            Some(Stage::Curves(curves.iter().map(Curve::from_icc).collect()))
        }
    }

    #[inline]
    pub(crate) fn apply(&self, input: &[f64], out: &mut [f64], interpolation: Interpolation) {
        match self {
            Stage::Curves(curves) => {
                for ((o, &x), c) in out.iter_mut().zip(input).zip(curves) {
                    *o = c.eval(x);
                }
            }
            Stage::Matrix(m) => {
                let r = m.apply([input[0], input[1], input[2]]);
                out[..3].copy_from_slice(&r);
            }
            Stage::Clut(clut) => clut.eval(input, out, interpolation),
        }
    }
}
