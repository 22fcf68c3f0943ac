//! CIEBasedA, ABC, DEF and DEFG as `A2B0` input profiles
//!
//! Lut outputs are PCS XYZ divided by [`XYZ_ENCODING_SCALE`], so matrices
//! and CLUT nodes carry that factor.

use super::descriptor::{decode_component, ranges_are_unit, validate_curves, validate_ranges};
use super::{
    CieBasedAbc, ColorSpaceDescriptor, ComponentRange, ProfileBuilder, SampledCurve,
    SampledTable, lut_matrix, unsupported,
};
use crate::color::{D50, XYZ_ENCODING_SCALE};
use crate::error::Result;
use crate::icc::{
    ColorSpace, CurveData, LutData, LutKind, Profile, ProfileClass, TagData, TagSignature,
};
use crate::math::{Matrix3x3, cat02_matrix};

/// Largest CLUT axis
const MAX_GRID_POINTS: usize = 255;

impl ProfileBuilder {
    /// CIEBasedA → Gray profile; A curve = DecodeA, 2-node CLUT from black
    /// to the D50 white scaled by the Y contribution of MatrixA
    ///
    /// Ranges other than [0, 1] sample the whole conversion into the CLUT.
    pub fn build_from_a(&self, descriptor: &ColorSpaceDescriptor) -> Result<Profile> {
        let ColorSpaceDescriptor::CieBasedA(a) = descriptor else {
            return Err(unsupported("build_from_a", descriptor));
        };
        a.validate()?;
        let lmn = &a.lmn;

        let lut = if a.has_unit_ranges() {
            // Only the Y contribution is kept
            let y: f64 = (0..3).map(|i| a.matrix_a[i] * lmn.matrix_lmn.m[i][1]).sum();
            let white = D50.map(|w| w * y / XYZ_ENCODING_SCALE);
            let clut = self.clut(&[2], vec![0.0, 0.0, 0.0, white[0], white[1], white[2]])?;

            let (m_curves, matrix) = match &lmn.decode_lmn {
                Some(curves) => (
                    Some(self.curve_set(Some(curves), 3)?),
                    Some(lut_matrix(Matrix3x3::identity(), [0.0; 3])?),
                ),
                None => (None, None),
            };

            LutData {
                kind: LutKind::AToB,
                input_channels: 1,
                output_channels: 3,
                a_curves: Some(vec![self.resample(&a.decode_a)?]),
                clut: Some(clut),
                m_curves,
                matrix,
                b_curves: vec![CurveData::Identity; 3],
            }
        } else {
            // One axis, so the densest grid stays small. Gray stays on the
            // D50 neutral axis as in the two-node form.
            self.folded_lut(&[MAX_GRID_POINTS], None, Matrix3x3::identity(), |c| {
                let y = a.to_xyz(c[0])[1];
                D50.map(|w| w * y)
            })?
        };

        let family = descriptor.family();
        let mut profile = self.start(
            family,
            ProfileClass::Input,
            ColorSpace::Gray,
            ColorSpace::Xyz,
            lmn.white_point,
            lmn.black_point,
        )?;
        profile.add_tag(TagSignature::A2B0, TagData::Lut(lut))?;
        self.finish(profile, family)
    }

    /// CIEBasedABC → RGB profile
    ///
    /// With DecodeLMN: A = DecodeABC, 2x2x2 CLUT = MatrixABC,
    /// M = DecodeLMN, matrix = adaptation x MatrixLMN. Without: M =
    /// DecodeABC and the matrix folds MatrixABC as well. Ranges other than
    /// [0, 1] sample the whole conversion into the CLUT.
    pub fn build_from_abc(&self, descriptor: &ColorSpaceDescriptor) -> Result<Profile> {
        let ColorSpaceDescriptor::CieBasedAbc(abc) = descriptor else {
            return Err(unsupported("build_from_abc", descriptor));
        };
        abc.validate()?;

        let cat = cat02_matrix(abc.lmn.white_point, D50);
        let lmn_t = abc.lmn.matrix_lmn.transpose();
        let abc_t = abc.matrix_abc.transpose();
        let decode_abc = abc.decode_abc.as_ref().map(|c| &c[..]);

        let lut = match &abc.lmn.decode_lmn {
            _ if !abc.has_unit_ranges() => {
                let grid = [self.options.grid_points; 3];
                self.folded_lut(&grid, None, cat, |c| abc.to_xyz([c[0], c[1], c[2]]))?
            }
            Some(decode_lmn) => {
                // Linear in each input, so two nodes per axis are exact
                let clut = self.sample_grid(&[2, 2, 2], 3, |c, out| {
                    out.copy_from_slice(&abc_t.multiply_vec([c[0], c[1], c[2]]));
                })?;
                LutData {
                    kind: LutKind::AToB,
                    input_channels: 3,
                    output_channels: 3,
                    a_curves: Some(self.curve_set(decode_abc, 3)?),
                    clut: Some(clut),
                    m_curves: Some(self.curve_set(Some(decode_lmn), 3)?),
                    matrix: Some(pcs_matrix(cat * lmn_t)?),
                    b_curves: vec![CurveData::Identity; 3],
                }
            }
            None => LutData {
                kind: LutKind::AToB,
                input_channels: 3,
                output_channels: 3,
                a_curves: None,
                clut: None,
                m_curves: Some(self.curve_set(decode_abc, 3)?),
                matrix: Some(pcs_matrix(cat * lmn_t * abc_t)?),
                b_curves: vec![CurveData::Identity; 3],
            },
        };

        let family = descriptor.family();
        let mut profile = self.start(
            family,
            ProfileClass::Input,
            ColorSpace::Rgb,
            ColorSpace::Xyz,
            abc.lmn.white_point,
            abc.lmn.black_point,
        )?;
        profile.add_tag(TagSignature::A2B0, TagData::Lut(lut))?;
        self.finish(profile, family)
    }

    /// CIEBasedDEF → RGB profile with the table as CLUT
    pub fn build_from_def(&self, descriptor: &ColorSpaceDescriptor) -> Result<Profile> {
        let ColorSpaceDescriptor::CieBasedDef(def) = descriptor else {
            return Err(unsupported("build_from_def", descriptor));
        };
        let decode = def.decode_def.as_ref().map(|c| &c[..]);
        let table = TableStage {
            ranges: &def.range_def,
            decode,
            table: &def.table,
        };
        self.build_from_table(descriptor.family(), ColorSpace::Rgb, table, &def.abc)
    }

    /// CIEBasedDEFG → CMYK profile with the table as CLUT
    pub fn build_from_defg(&self, descriptor: &ColorSpaceDescriptor) -> Result<Profile> {
        let ColorSpaceDescriptor::CieBasedDefg(defg) = descriptor else {
            return Err(unsupported("build_from_defg", descriptor));
        };
        let decode = defg.decode_defg.as_ref().map(|c| &c[..]);
        let table = TableStage {
            ranges: &defg.range_defg,
            decode,
            table: &defg.table,
        };
        self.build_from_table(descriptor.family(), ColorSpace::Cmyk, table, &defg.abc)
    }

    fn build_from_table(
        &self,
        family: &str,
        color_space: ColorSpace,
        stage: TableStage<'_>,
        abc: &CieBasedAbc,
    ) -> Result<Profile> {
        let inputs = color_space.channels();
        let table = stage.table;
        table.validate("Table", Some(inputs), Some(3))?;
        validate_ranges("RangeDEF(G)", stage.ranges)?;
        validate_curves("Decode", stage.decode)?;
        abc.validate()?;

        let cat = cat02_matrix(abc.lmn.white_point, D50);
        let unit_input = ranges_are_unit(stage.ranges);

        let lut = match &abc.lmn.decode_lmn {
            None if unit_input && abc.has_unit_ranges() => LutData {
                kind: LutKind::AToB,
                input_channels: inputs as u8,
                output_channels: 3,
                a_curves: Some(self.curve_set(stage.decode, inputs)?),
                clut: Some(self.clut(&table.grid, table.data.clone())?),
                m_curves: Some(self.curve_set(abc.decode_abc.as_ref().map(|c| &c[..]), 3)?),
                matrix: Some(pcs_matrix(
                    cat * abc.lmn.matrix_lmn.transpose() * abc.matrix_abc.transpose(),
                )?),
                b_curves: vec![CurveData::Identity; 3],
            },
            _ => {
                // DecodeLMN and non-unit ranges are not expressible after a
                // matrix, so the whole ABC stage is folded into the nodes
                let grid: Vec<usize> = table
                    .grid
                    .iter()
                    .map(|&g| g.max(self.options.grid_points))
                    .collect();
                let mut abc_values = [0.0; 3];
                let mut position = [0.0; 4];
                if unit_input {
                    let a_curves = self.curve_set(stage.decode, inputs)?;
                    self.folded_lut(&grid, Some(a_curves), cat, |c| {
                        table.eval(c, &mut abc_values);
                        abc.to_xyz(abc_values)
                    })?
                } else {
                    // RangeDEF(G) and the decode are folded as well
                    self.folded_lut(&grid, None, cat, |c| {
                        for (i, p) in position[..inputs].iter_mut().enumerate() {
                            *p = stage.table_position(i, c[i]);
                        }
                        table.eval(&position[..inputs], &mut abc_values);
                        abc.to_xyz(abc_values)
                    })?
                }
            }
        };

        let mut profile = self.start(
            family,
            ProfileClass::Input,
            color_space,
            ColorSpace::Xyz,
            abc.lmn.white_point,
            abc.lmn.black_point,
        )?;
        profile.add_tag(TagSignature::A2B0, TagData::Lut(lut))?;
        self.finish(profile, family)
    }

    /// A-CLUT-B lut whose nodes hold `to_xyz` adapted to D50; `a_curves`
    /// defaults to identities
    fn folded_lut(
        &self,
        grid: &[usize],
        a_curves: Option<Vec<CurveData>>,
        cat: Matrix3x3,
        mut to_xyz: impl FnMut(&[f64]) -> [f64; 3],
    ) -> Result<LutData> {
        let inputs = grid.len();
        let clut = self.sample_grid(grid, 3, |c, out| {
            let xyz = cat.multiply_vec(to_xyz(c));
            for (o, v) in out.iter_mut().zip(xyz) {
                *o = (v / XYZ_ENCODING_SCALE).clamp(0.0, 1.0);
            }
        })?;
        tracing::debug!(?grid, "folded conversion into CLUT");
        Ok(LutData {
            kind: LutKind::AToB,
            input_channels: inputs as u8,
            output_channels: 3,
            a_curves: Some(a_curves.unwrap_or_else(|| vec![CurveData::Identity; inputs])),
            clut: Some(clut),
            m_curves: None,
            matrix: None,
            b_curves: vec![CurveData::Identity; 3],
        })
    }
}

/// Input half of a DEF or DEFG space
struct TableStage<'a> {
    ranges: &'a [ComponentRange],
    decode: Option<&'a [SampledCurve]>,
    table: &'a SampledTable,
}

impl TableStage<'_> {
    /// Table coordinate of input `i` at device fraction `x`
    fn table_position(&self, i: usize, x: f64) -> f64 {
        let curve = self.decode.map(|c| &c[i]);
        decode_component(curve, self.ranges[i], x).clamp(0.0, 1.0)
    }
}

/// XYZ matrix scaled into the lut encoding, no offset
fn pcs_matrix(m: Matrix3x3) -> Result<crate::icc::LutMatrix> {
    lut_matrix(m.scale(1.0 / XYZ_ENCODING_SCALE), [0.0; 3])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{
        BuilderOptions, CieBasedA, CieBasedDef, CieBasedDefg, CieLmn, UNIT_RANGE,
    };
    use crate::color::D65;
    use crate::error::Error;
    use crate::pipeline::{Direction, LutChain};

    fn builder() -> ProfileBuilder {
        ProfileBuilder::new(BuilderOptions::default()).unwrap()
    }

    fn cie_a(decode: Vec<f64>) -> ColorSpaceDescriptor {
        ColorSpaceDescriptor::CieBasedA(CieBasedA {
            range_a: UNIT_RANGE,
            decode_a: SampledCurve::new(decode),
            matrix_a: [1.0, 1.0, 1.0],
            lmn: CieLmn::default(),
        })
    }

    fn def_table(grid: usize) -> SampledTable {
        SampledTable::from_fn(vec![grid; 3], 3, |c, out| {
            out[0] = c[0] * 0.5;
            out[1] = c[1] * 0.5;
            out[2] = c[2] * 0.5;
        })
    }

    #[test]
    fn test_a_layout() {
        let profile = builder().build(&cie_a(vec![0.0, 0.25, 1.0])).unwrap();
        assert_eq!(profile.color_space(), ColorSpace::Gray);

        let lut = profile.a2b0().unwrap();
        assert_eq!((lut.input_channels, lut.output_channels), (1, 3));
        assert!(lut.matrix.is_none());

        let clut = lut.clut.as_ref().unwrap();
        assert_eq!(clut.grid, vec![2]);
        // D50 Y = 1.0 encodes as 0x8000
        assert_eq!(clut.data[4], 32768.0 / 65535.0);

        let Some(CurveData::Table(a)) = lut.a_curves.as_ref().map(|c| &c[0]) else {
            panic!("expected table A curve");
        };
        assert_eq!(a.len(), 513);
        assert_eq!(a[256], 16384);
    }

    #[test]
    fn test_a_with_decode_lmn() {
        let desc = ColorSpaceDescriptor::CieBasedA(CieBasedA {
            range_a: UNIT_RANGE,
            decode_a: SampledCurve::identity(),
            matrix_a: [0.0, 0.5, 0.0],
            lmn: CieLmn {
                decode_lmn: Some([
                    SampledCurve::identity(),
                    SampledCurve::identity(),
                    SampledCurve::identity(),
                ]),
                ..CieLmn::default()
            },
        });
        let lut = builder().build(&desc).unwrap().a2b0().cloned().unwrap();
        assert_eq!(lut.m_curves.map(|c| c.len()), Some(3));
        assert!(lut.matrix.unwrap().matrix.is_identity());
    }

    #[test]
    fn test_abc_matrix_only() {
        let desc = ColorSpaceDescriptor::CieBasedAbc(CieBasedAbc {
            lmn: CieLmn::with_white_point(D65),
            ..CieBasedAbc::default()
        });
        let profile = builder().build(&desc).unwrap();
        let lut = profile.a2b0().unwrap();
        assert!(lut.clut.is_none() && lut.a_curves.is_none());
        assert_eq!(lut.m_curves, Some(vec![CurveData::Identity; 3]));

        // The source white lands on D50 in the lut encoding
        let m = lut.matrix.as_ref().unwrap().matrix;
        let white = m.multiply_vec(D65);
        for i in 0..3 {
            assert!((white[i] * XYZ_ENCODING_SCALE - D50[i]).abs() < 1e-3);
        }
    }

    #[test]
    fn test_abc_with_decode_lmn_uses_clut() {
        let desc = ColorSpaceDescriptor::CieBasedAbc(CieBasedAbc {
            decode_abc: Some([
                SampledCurve::from_fn(3, |x| x * x),
                SampledCurve::identity(),
                SampledCurve::identity(),
            ]),
            matrix_abc: Matrix3x3::diagonal(0.5, 0.5, 0.5),
            lmn: CieLmn {
                decode_lmn: Some([
                    SampledCurve::identity(),
                    SampledCurve::identity(),
                    SampledCurve::identity(),
                ]),
                ..CieLmn::default()
            },
            ..CieBasedAbc::default()
        });
        let profile = builder().build(&desc).unwrap();
        let lut = profile.a2b0().unwrap();
        let clut = lut.clut.as_ref().unwrap();
        assert_eq!(clut.grid, vec![2, 2, 2]);
        // Last node: (1, 1, 1) * 0.5
        assert_eq!(&clut.data[21..24], &[32768.0 / 65535.0; 3]);
    }

    #[test]
    fn test_def_keeps_table_grid() {
        let desc = ColorSpaceDescriptor::CieBasedDef(CieBasedDef {
            range_def: [UNIT_RANGE; 3],
            decode_def: None,
            table: def_table(5),
            abc: CieBasedAbc::default(),
        });
        let profile = builder().build(&desc).unwrap();
        assert_eq!(profile.color_space(), ColorSpace::Rgb);
        let lut = profile.a2b0().unwrap();
        assert_eq!(lut.clut.as_ref().unwrap().grid, vec![5, 5, 5]);
        assert!(lut.matrix.is_some());
    }

    #[test]
    fn test_def_folds_decode_lmn() {
        let desc = ColorSpaceDescriptor::CieBasedDef(CieBasedDef {
            range_def: [UNIT_RANGE; 3],
            decode_def: None,
            table: def_table(3),
            abc: CieBasedAbc {
                lmn: CieLmn {
                    decode_lmn: Some([
                        SampledCurve::identity(),
                        SampledCurve::identity(),
                        SampledCurve::identity(),
                    ]),
                    ..CieLmn::default()
                },
                ..CieBasedAbc::default()
            },
        });
        let lut = builder().build(&desc).unwrap().a2b0().cloned().unwrap();
        assert_eq!(lut.clut.unwrap().grid, vec![9, 9, 9]);
        assert!(lut.matrix.is_none() && lut.m_curves.is_none());
    }

    #[test]
    fn test_defg() {
        let table = SampledTable::from_fn(vec![2, 3, 2, 2], 3, |c, out| {
            out[0] = (1.0 - c[3]) * 0.5;
            out[1] = c[1] * 0.25;
            out[2] = c[0] * 0.75;
        });
        let desc = ColorSpaceDescriptor::CieBasedDefg(CieBasedDefg {
            range_defg: [UNIT_RANGE; 4],
            decode_defg: None,
            table,
            abc: CieBasedAbc::default(),
        });
        let profile = builder().build(&desc).unwrap();
        assert_eq!(profile.color_space(), ColorSpace::Cmyk);
        let lut = profile.a2b0().unwrap();
        assert_eq!(lut.input_channels, 4);
        assert_eq!(lut.a_curves.as_ref().map(|c| c.len()), Some(4));
    }

    #[test]
    fn test_invalid_descriptors() {
        let b = builder();
        assert!(matches!(
            b.build(&cie_a(vec![0.5])),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            b.build(&cie_a(vec![0.0, 0.8, 0.4])),
            Err(Error::InvalidParameter(_))
        ));

        // DEF with a 4-axis table
        let desc = ColorSpaceDescriptor::CieBasedDef(CieBasedDef {
            range_def: [UNIT_RANGE; 3],
            decode_def: None,
            table: SampledTable::from_fn(vec![2; 4], 3, |_, out| out.fill(0.0)),
            abc: CieBasedAbc::default(),
        });
        assert!(matches!(b.build(&desc), Err(Error::InvalidParameter(_))));

        let desc = ColorSpaceDescriptor::CieBasedDef(CieBasedDef {
            range_def: [UNIT_RANGE; 3],
            decode_def: None,
            table: SampledTable::new(vec![2, 1, 2], 3, vec![0.0; 12]),
            abc: CieBasedAbc::default(),
        });
        assert!(matches!(b.build(&desc), Err(Error::InvalidParameter(_))));
    }

    fn evaluate(desc: &ColorSpaceDescriptor, input: &[f64]) -> [f64; 3] {
        let profile = builder().build(desc).unwrap();
        let chain = LutChain::from_profile(&profile, Direction::Input).unwrap();
        let mut out = [0.0; 3];
        chain.evaluate(input, &mut out).unwrap();
        out
    }

    fn assert_xyz(actual: [f64; 3], expected: [f64; 3]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-3, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn test_abc_range_folds_into_clut() {
        let desc = ColorSpaceDescriptor::CieBasedAbc(CieBasedAbc {
            range_abc: [[0.0, 0.5]; 3],
            ..CieBasedAbc::default()
        });
        let lut = builder().build(&desc).unwrap().a2b0().cloned().unwrap();
        assert_eq!(lut.clut.unwrap().grid, vec![9, 9, 9]);
        assert_eq!(lut.a_curves, Some(vec![CurveData::Identity; 3]));
        assert!(lut.matrix.is_none() && lut.m_curves.is_none());

        // Device 1.0 is the top of the range
        assert_xyz(evaluate(&desc, &[1.0, 0.5, 0.2]), [0.5, 0.25, 0.1]);
    }

    #[test]
    fn test_def_range_scales_table_position() {
        let desc = ColorSpaceDescriptor::CieBasedDef(CieBasedDef {
            range_def: [[0.0, 2.0]; 3],
            decode_def: None,
            table: SampledTable::from_fn(vec![5; 3], 3, |c, out| out.copy_from_slice(c)),
            abc: CieBasedAbc::default(),
        });
        let lut = builder().build(&desc).unwrap().a2b0().cloned().unwrap();
        assert_eq!(lut.a_curves, Some(vec![CurveData::Identity; 3]));
        assert_eq!(lut.clut.unwrap().grid, vec![9, 9, 9]);

        // Values past 1.0 hold the last table entry
        assert_xyz(evaluate(&desc, &[0.25, 0.4, 0.75]), [0.5, 0.8, 1.0]);
    }

    #[test]
    fn test_defg_range_folds_decode() {
        let table = SampledTable::from_fn(vec![2; 4], 3, |c, out| {
            out[0] = c[0];
            out[1] = c[3];
            out[2] = 0.0;
        });
        let desc = ColorSpaceDescriptor::CieBasedDefg(CieBasedDefg {
            range_defg: [[0.0, 4.0], UNIT_RANGE, UNIT_RANGE, [-1.0, 1.0]],
            decode_defg: Some(std::array::from_fn(|_| SampledCurve::from_fn(3, |x| x * 0.5))),
            table,
            abc: CieBasedAbc::default(),
        });
        let lut = builder().build(&desc).unwrap().a2b0().cloned().unwrap();
        assert_eq!(lut.a_curves.map(|c| c.len()), Some(4));
        assert_xyz(evaluate(&desc, &[1.0, 0.0, 0.0, 0.5]), [0.5, 0.25, 0.0]);
    }

    #[test]
    fn test_lmn_range_clips_gray() {
        let desc = ColorSpaceDescriptor::CieBasedA(CieBasedA {
            range_a: UNIT_RANGE,
            decode_a: SampledCurve::identity(),
            matrix_a: [1.0, 1.0, 1.0],
            lmn: CieLmn {
                range_lmn: [[0.0, 0.5]; 3],
                ..CieLmn::default()
            },
        });
        let lut = builder().build(&desc).unwrap().a2b0().cloned().unwrap();
        assert_eq!(lut.clut.unwrap().grid, vec![MAX_GRID_POINTS as u8]);
        assert!(lut.m_curves.is_none());

        assert_xyz(evaluate(&desc, &[0.3]), D50.map(|w| w * 0.3));
        assert_xyz(evaluate(&desc, &[0.8]), D50.map(|w| w * 0.5));
    }

    #[test]
    fn test_bad_ranges_rejected() {
        let b = builder();
        let desc = ColorSpaceDescriptor::CieBasedA(CieBasedA {
            range_a: [1.0, 0.0],
            decode_a: SampledCurve::identity(),
            matrix_a: [1.0, 1.0, 1.0],
            lmn: CieLmn::default(),
        });
        assert!(matches!(b.build(&desc), Err(Error::InvalidParameter(_))));

        let desc = ColorSpaceDescriptor::CieBasedDefg(CieBasedDefg {
            range_defg: [UNIT_RANGE, UNIT_RANGE, [0.0, f64::INFINITY], UNIT_RANGE],
            decode_defg: None,
            table: SampledTable::from_fn(vec![2; 4], 3, |_, out| out.fill(0.0)),
            abc: CieBasedAbc::default(),
        });
        assert!(matches!(b.build(&desc), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_wrong_family() {
        let b = builder();
        let a = cie_a(vec![0.0, 1.0]);
        assert!(matches!(b.build_from_abc(&a), Err(Error::UnsupportedColorSpace(_))));
        assert!(matches!(b.build_from_def(&a), Err(Error::UnsupportedColorSpace(_))));
        assert!(matches!(b.build_from_defg(&a), Err(Error::UnsupportedColorSpace(_))));
        assert!(b.build_from_a(&a).is_ok());
    }
}
