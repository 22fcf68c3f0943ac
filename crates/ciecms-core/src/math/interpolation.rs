//! Interpolation functions for curve and CLUT evaluation
//!
//! This module provides:
//! - Linear interpolation over uniformly sampled 1-D tables
//! - Multilinear interpolation over k-dimensional grids (k = 1..=15)
//! - Tetrahedral interpolation for 3-input grids
//!
//! Grids are stored with the first input axis varying slowest and the
//! output channels of one node contiguous. Inputs are clamped to [0, 1].
//! Every kernel combines corners as `sum(weight * node)` and skips
//! zero weights, so an input sitting on a node returns that node's
//! stored value bit for bit.

use multiversion::multiversion;

/// Maximum number of CLUT input axes (ICC limit)
pub const MAX_GRID_INPUTS: usize = 15;

/// Positions closer than this to a node (in grid units) snap onto it
const NODE_SNAP: f64 = 1e-9;

/// CLUT interpolation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interpolation {
    /// Weighted combination of the 2^k corners of the enclosing cell
    #[default]
    Multilinear,
    /// Four corners of the enclosing tetrahedron; 3-input grids only,
    /// other grids fall back to multilinear
    Tetrahedral,
}

/// Map `x` onto an axis of `points` nodes: (lower node index, fraction)
///
/// The lower index never exceeds `points - 2`, so `x = 1` yields the last
/// cell with fraction 1.
#[inline]
pub fn locate(x: f64, points: usize) -> (usize, f64) {
    if points < 2 {
        return (0, 0.0);
    }
    let max = (points - 1) as f64;
    let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
    let mut pos = x * max;
    let nearest = pos.round();
    if (pos - nearest).abs() < NODE_SNAP {
        pos = nearest;
    }
    let base = (pos.floor() as usize).min(points - 2);
    (base, pos - base as f64)
}

/// Lookup in a uniformly sampled 1-D table with linear interpolation
pub fn lut1d_interp(table: &[f64], x: f64) -> f64 {
    match table.len() {
        0 => x.clamp(0.0, 1.0),
        1 => table[0],
        n => {
            let (i, t) = locate(x, n);
            if t == 0.0 {
                table[i]
            } else if t == 1.0 {
                table[i + 1]
            } else {
                table[i] * (1.0 - t) + table[i + 1] * t
            }
        }
    }
}

/// Multilinear interpolation over a k-dimensional grid
///
/// `grid[i]` is the node count of input axis `i`; `data` holds
/// `prod(grid) * outputs` values. Writes `outputs` values into `out`.
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn interpolate_multilinear(
    grid: &[usize],
    data: &[f64],
    outputs: usize,
    input: &[f64],
    out: &mut [f64],
) {
    let k = grid.len().min(MAX_GRID_INPUTS);
    let mut base = [0usize; MAX_GRID_INPUTS];
    let mut frac = [0.0f64; MAX_GRID_INPUTS];
    let mut stride = [0usize; MAX_GRID_INPUTS];

    let mut s = outputs;
    for axis in (0..k).rev() {
        stride[axis] = s;
        s *= grid[axis];
    }
    for axis in 0..k {
        let x = input.get(axis).copied().unwrap_or(0.0);
        (base[axis], frac[axis]) = locate(x, grid[axis]);
    }

    out[..outputs].fill(0.0);

    for corner in 0..(1usize << k) {
        let mut weight = 1.0;
        let mut offset = 0;
        for axis in 0..k {
            let upper = (corner >> (k - 1 - axis)) & 1 == 1;
            let f = frac[axis];
            weight *= if upper { f } else { 1.0 - f };
            offset += (base[axis] + upper as usize) * stride[axis];
        }
        if weight == 0.0 {
            continue;
        }
        for (o, v) in out[..outputs].iter_mut().zip(&data[offset..offset + outputs]) {
            *o += weight * v;
        }
    }
}

/// Tetrahedral interpolation over a 3-input grid
///
/// The enclosing cube is split into six tetrahedra along the main
/// diagonal; results match [`interpolate_multilinear`] on cell corners and
/// edges of the diagonal but differ inside cells.
#[multiversion(targets("x86_64+avx2", "x86_64+sse4.1", "aarch64+neon",))]
pub fn interpolate_tetrahedral(
    grid: [usize; 3],
    data: &[f64],
    outputs: usize,
    input: [f64; 3],
    out: &mut [f64],
) {
    let (r0, fr) = locate(input[0], grid[0]);
    let (g0, fg) = locate(input[1], grid[1]);
    let (b0, fb) = locate(input[2], grid[2]);

    let sb = outputs;
    let sg = sb * grid[2];
    let sr = sg * grid[1];
    let origin = r0 * sr + g0 * sg + b0 * sb;

    // Corner offsets relative to origin: bit 2 = r, bit 1 = g, bit 0 = b
    let corner = |bits: usize| {
        origin
            + if bits & 4 != 0 { sr } else { 0 }
            + if bits & 2 != 0 { sg } else { 0 }
            + if bits & 1 != 0 { sb } else { 0 }
    };

    let (path, weights) = if fr >= fg && fg >= fb {
        ([0b000, 0b100, 0b110, 0b111], [1.0 - fr, fr - fg, fg - fb, fb])
    } else if fr >= fb && fb >= fg {
        ([0b000, 0b100, 0b101, 0b111], [1.0 - fr, fr - fb, fb - fg, fg])
    } else if fb >= fr && fr >= fg {
        ([0b000, 0b001, 0b101, 0b111], [1.0 - fb, fb - fr, fr - fg, fg])
    } else if fg >= fr && fr >= fb {
        ([0b000, 0b010, 0b110, 0b111], [1.0 - fg, fg - fr, fr - fb, fb])
    } else if fg >= fb && fb >= fr {
        ([0b000, 0b010, 0b011, 0b111], [1.0 - fg, fg - fb, fb - fr, fr])
    } else {
        ([0b000, 0b001, 0b011, 0b111], [1.0 - fb, fb - fg, fg - fr, fr])
    };

    out[..outputs].fill(0.0);
    for (bits, w) in path.into_iter().zip(weights) {
        if w == 0.0 {
            continue;
        }
        let at = corner(bits);
        for (o, v) in out[..outputs].iter_mut().zip(&data[at..at + outputs]) {
            *o += w * v;
        }
    }
}
