//! CIELAB (L*a*b*) Color Space
//!
//! - L*: Lightness (0 = black, 100 = white)
//! - a*: Green-red axis
//! - b*: Blue-yellow axis
//!
//! Used when two chains meet with different connection spaces and for the
//! Lab encoding of chain endpoints.

use super::D50;

/// CIELAB color coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    #[inline]
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }

    /// Convert from XYZ relative to the D50 PCS white
    pub fn from_xyz(xyz: [f64; 3]) -> Self {
        let fx = lab_f(xyz[0] / D50[0]);
        let fy = lab_f(xyz[1] / D50[1]);
        let fz = lab_f(xyz[2] / D50[2]);

        Self {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }

    /// Convert to XYZ relative to the D50 PCS white
    pub fn to_xyz(&self) -> [f64; 3] {
        let fy = (self.l + 16.0) / 116.0;
        let fx = self.a / 500.0 + fy;
        let fz = fy - self.b / 200.0;

        [
            lab_f_inv(fx) * D50[0],
            lab_f_inv(fy) * D50[1],
            lab_f_inv(fz) * D50[2],
        ]
    }
}

/// ICC v4 normalized Lab encoding used inside chains
#[inline]
pub fn encode_lab(lab: Lab) -> [f64; 3] {
    [lab.l / 100.0, (lab.a + 128.0) / 255.0, (lab.b + 128.0) / 255.0]
}

#[inline]
pub fn decode_lab(v: [f64; 3]) -> Lab {
    Lab::new(v[0] * 100.0, v[1] * 255.0 - 128.0, v[2] * 255.0 - 128.0)
}

/// Lab forward function: f(t) for XYZ → Lab conversion
#[inline]
fn lab_f(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;
    const DELTA_CUBED: f64 = DELTA * DELTA * DELTA;

    if t > DELTA_CUBED {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

/// Lab inverse function: f⁻¹(t) for Lab → XYZ conversion
#[inline]
fn lab_f_inv(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;

    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}
