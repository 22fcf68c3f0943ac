//! Chains derived from profile tags

use super::chain::LutChain;
use super::stages::{Clut, Curve, MatrixStage, Stage};
use crate::color::{D50, Lab, Pcs, XYZ_ENCODING_SCALE, decode_lab, encode_lab};
use crate::error::{Error, Result};
use crate::icc::{ColorSpace, CurveData, LutData, LutKind, Profile, ProfileClass, TagSignature};
use crate::math::Matrix3x3;

/// Nodes of the 1-D table used for gray profiles with a Lab connection space
const GRAY_LAB_GRID: usize = 33;

/// Which way a profile is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Device to PCS (`A2B0`, or the forward matrix/TRC)
    Input,
    /// PCS to device (`B2A0`, or the inverted matrix/TRC)
    Output,
}

impl LutChain {
    /// Chain for one direction of `profile`
    ///
    /// Lut tags take precedence over matrix/TRC and gray TRC tags.
    pub fn from_profile(profile: &Profile, direction: Direction) -> Result<Self> {
        let pcs = match profile.pcs() {
            ColorSpace::Xyz => Some(Pcs::Xyz),
            ColorSpace::Lab => Some(Pcs::Lab),
            _ if profile.device_class() == ProfileClass::DeviceLink => None,
            other => {
                return Err(Error::unsupported(format!(
                    "{other:?} is not a connection space"
                )));
            }
        };

        let lut = match direction {
            Direction::Input => profile.a2b0(),
            Direction::Output => profile.b2a0(),
        };
        let stages = if let Some(lut) = lut {
            lut_stages(lut, pcs)?
        } else if let Some(trcs) = rgb_trcs(profile) {
            let colorants = colorant_matrix(profile)?;
            require_xyz(pcs)?;
            match direction {
                Direction::Input => matrix_trc_forward(trcs, colorants),
                Direction::Output => matrix_trc_inverse(trcs, colorants)?,
            }
        } else if let Some(trc) = profile.curve(TagSignature::GRAY_TRC) {
            let pcs = pcs.ok_or_else(|| Error::unsupported("gray device link"))?;
            match direction {
                Direction::Input => gray_forward(trc, pcs)?,
                Direction::Output => gray_inverse(trc, pcs)?,
            }
        } else {
            return Err(Error::unsupported(format!(
                "{:?} profile has no {direction:?} transform",
                profile.color_space()
            )));
        };

        let chain = Self::new(stages)?.with_pcs(pcs);
        tracing::debug!(
            ?direction,
            ?pcs,
            inputs = chain.input_channels(),
            outputs = chain.output_channels(),
            stages = chain.stages().len(),
            "derived chain from profile"
        );
        Ok(chain)
    }
}

/// Stages of an `mAB `/`mBA ` tag, with the lut XYZ encoding undone
pub(crate) fn lut_stages(lut: &LutData, pcs: Option<Pcs>) -> Result<Vec<Stage>> {
    let clut = match &lut.clut {
        Some(clut) => Some(Stage::Clut(Clut::from_icc(clut, lut.output_channels as usize)?)),
        None => None,
    };
    let a = lut.a_curves.as_deref().and_then(Stage::curves);
    let m = lut.m_curves.as_deref().and_then(Stage::curves);
    let matrix = lut
        .matrix
        .as_ref()
        .filter(|m| !(m.matrix.is_identity() && m.offset == [0.0; 3]))
        .map(|m| Stage::Matrix(MatrixStage::from_icc(m)));
    let b = Stage::curves(&lut.b_curves);

    let scale = |s: f64| Stage::Matrix(MatrixStage::new(Matrix3x3::diagonal(s, s, s)));
    let mut stages = Vec::with_capacity(6);
    match lut.kind {
        LutKind::AToB => {
            stages.extend([a, clut, m, matrix, b].into_iter().flatten());
            if pcs == Some(Pcs::Xyz) {
                stages.push(scale(XYZ_ENCODING_SCALE));
            }
        }
        LutKind::BToA => {
            if pcs == Some(Pcs::Xyz) {
                stages.push(scale(1.0 / XYZ_ENCODING_SCALE));
            }
            stages.extend([b, matrix, m, clut, a].into_iter().flatten());
        }
    }
    if stages.is_empty() {
        stages.push(Stage::Curves(vec![Curve::Identity; lut.input_channels as usize]));
    }
    Ok(stages)
}

fn rgb_trcs(profile: &Profile) -> Option<[&CurveData; 3]> {
    Some([
        profile.curve(TagSignature::RED_TRC)?,
        profile.curve(TagSignature::GREEN_TRC)?,
        profile.curve(TagSignature::BLUE_TRC)?,
    ])
}

/// Colorant XYZs as matrix columns
fn colorant_matrix(profile: &Profile) -> Result<Matrix3x3> {
    let column = |sig: TagSignature| {
        profile
            .xyz(sig)
            .ok_or_else(|| {
                Error::unsupported(format!("matrix/TRC profile without {}", sig.to_string()))
            })
    };
    let rows = [
        column(TagSignature::RED_COLORANT)?,
        column(TagSignature::GREEN_COLORANT)?,
        column(TagSignature::BLUE_COLORANT)?,
    ];
    Ok(Matrix3x3::new(rows).transpose())
}

fn require_xyz(pcs: Option<Pcs>) -> Result<()> {
    match pcs {
        Some(Pcs::Xyz) => Ok(()),
        other => Err(Error::unsupported(format!(
            "matrix/TRC profile with {other:?} connection space"
        ))),
    }
}

fn matrix_trc_forward(trcs: [&CurveData; 3], colorants: Matrix3x3) -> Vec<Stage> {
    let curves = trcs.map(Curve::from_icc);
    let mut stages = Vec::with_capacity(2);
    if !curves.iter().all(Curve::is_identity) {
        stages.push(Stage::Curves(curves.to_vec()));
    }
    stages.push(Stage::Matrix(MatrixStage::new(colorants)));
    stages
}

fn matrix_trc_inverse(trcs: [&CurveData; 3], colorants: Matrix3x3) -> Result<Vec<Stage>> {
    let inverse = MatrixStage::new(colorants)
        .inverse()
        .ok_or_else(|| Error::invalid("colorant matrix is singular"))?;
    let curves = trcs.map(|c| Curve::from_icc(c).inverse());
    let mut stages = vec![Stage::Matrix(inverse)];
    if !curves.iter().all(Curve::is_identity) {
        stages.push(Stage::Curves(curves.to_vec()));
    }
    Ok(stages)
}

/// Gray → PCS: TRC, then Y spread onto the D50 white
fn gray_forward(trc: &CurveData, pcs: Pcs) -> Result<Vec<Stage>> {
    let clut = match pcs {
        Pcs::Xyz => Clut::new(vec![2], 3, vec![0.0, 0.0, 0.0, D50[0], D50[1], D50[2]])?,
        Pcs::Lab => {
            let n = GRAY_LAB_GRID;
            let mut data = Vec::with_capacity(n * 3);
            for i in 0..n {
                let y = i as f64 / (n - 1) as f64;
                data.extend(encode_lab(Lab::from_xyz(D50.map(|w| w * y))));
            }
            Clut::new(vec![n], 3, data)?
        }
    };
    Ok(vec![Stage::Curves(vec![Curve::from_icc(trc)]), Stage::Clut(clut)])
}

/// PCS → gray: luminance only, then the inverse TRC
fn gray_inverse(trc: &CurveData, pcs: Pcs) -> Result<Vec<Stage>> {
    let clut = match pcs {
        // Node (x, y, z) of a 2x2x2 cube: output is the y bit
        Pcs::Xyz => Clut::new(
            vec![2, 2, 2],
            1,
            (0..8).map(|n| ((n >> 1) & 1) as f64).collect(),
        )?,
        Pcs::Lab => {
            let n = GRAY_LAB_GRID;
            let mut data = Vec::with_capacity(n * 4);
            for i in 0..n {
                let l = i as f64 / (n - 1) as f64;
                let y = decode_lab([l, 0.5, 0.5]).to_xyz()[1].clamp(0.0, 1.0);
                data.extend([y; 4]);
            }
            Clut::new(vec![n, 2, 2], 1, data)?
        }
    };
    Ok(vec![
        Stage::Clut(clut),
        Stage::Curves(vec![Curve::from_icc(trc).inverse()]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{
        BuilderOptions, CieBasedA, CieLmn, ColorSpaceDescriptor, ProfileBuilder,
        RenderingDictionary, SampledCurve, UNIT_RANGE,
    };
    use crate::color::D65;

    const EPSILON: f64 = 1e-3;

    fn builder() -> ProfileBuilder {
        ProfileBuilder::new(BuilderOptions::default()).unwrap()
    }

    fn cal_rgb(white_point: [f64; 3], gamma: f64) -> ColorSpaceDescriptor {
        ColorSpaceDescriptor::CalRgb {
            white_point,
            black_point: [0.0; 3],
            gamma: [gamma; 3],
            matrix: Matrix3x3::identity(),
        }
    }

    #[test]
    fn test_cal_rgb_both_directions() {
        let profile = builder().build(&cal_rgb(D50, 2.2)).unwrap();
        // Stored gamma is the u8Fixed8 value
        let g = 563.0 / 256.0;

        let input = LutChain::from_profile(&profile, Direction::Input).unwrap();
        assert_eq!(input.pcs(), Some(Pcs::Xyz));
        let mut out = [0.0; 3];
        input.evaluate(&[0.5; 3], &mut out).unwrap();
        for v in out {
            assert!((v - 0.5_f64.powf(g)).abs() < EPSILON, "{out:?}");
        }

        let output = LutChain::from_profile(&profile, Direction::Output).unwrap();
        output.evaluate(&[0.5; 3], &mut out).unwrap();
        for v in out {
            assert!((v - 0.5_f64.powf(1.0 / 2.2)).abs() < EPSILON, "{out:?}");
        }
    }

    #[test]
    fn test_matrix_trc_roundtrip() {
        let profile = builder().build(&cal_rgb(D65, 1.8)).unwrap();
        let fwd = LutChain::from_profile(&profile, Direction::Input).unwrap();
        let inv = LutChain::from_profile(&profile, Direction::Output).unwrap();
        let link = LutChain::link(&fwd, &inv).unwrap();

        let mut out = [0.0; 3];
        for rgb in [[0.2, 0.4, 0.6], [0.9, 0.1, 0.5], [1.0, 1.0, 1.0]] {
            link.evaluate(&rgb, &mut out).unwrap();
            for (o, i) in out.iter().zip(rgb) {
                assert!((o - i).abs() < EPSILON, "{rgb:?} -> {out:?}");
            }
        }
    }

    #[test]
    fn test_cie_a_reproduces_decode() {
        let decode = vec![0.0, 0.05, 0.2, 0.45, 1.0];
        let desc = ColorSpaceDescriptor::CieBasedA(CieBasedA {
            range_a: UNIT_RANGE,
            decode_a: SampledCurve::new(decode.clone()),
            matrix_a: [1.0, 1.0, 1.0],
            lmn: CieLmn::default(),
        });
        let profile = builder().build(&desc).unwrap();
        let chain = LutChain::from_profile(&profile, Direction::Input).unwrap();
        assert_eq!((chain.input_channels(), chain.output_channels()), (1, 3));

        let mut out = [0.0; 3];
        for (i, &y) in decode.iter().enumerate() {
            let a = i as f64 / (decode.len() - 1) as f64;
            chain.evaluate(&[a], &mut out).unwrap();
            // One 16-bit unit
            assert!((out[1] - y).abs() <= 1.0 / 65535.0 + 1e-12, "{a}: {} vs {y}", out[1]);
        }
    }

    #[test]
    fn test_gray_inverse_reads_luminance() {
        let desc = ColorSpaceDescriptor::CalGray {
            white_point: D50,
            black_point: [0.0; 3],
            gamma: 2.0,
        };
        let profile = builder().build(&desc).unwrap();
        let chain = LutChain::from_profile(&profile, Direction::Output).unwrap();
        assert_eq!((chain.input_channels(), chain.output_channels()), (3, 1));

        let mut out = [0.0];
        chain.evaluate(&[0.2, 0.25, 0.3], &mut out).unwrap();
        assert!((out[0] - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_crd_output_chain() {
        let profile = builder()
            .build_from_rendering_dict(&RenderingDictionary::default())
            .unwrap();
        let chain = LutChain::from_profile(&profile, Direction::Output).unwrap();
        assert_eq!(chain.pcs(), Some(Pcs::Xyz));

        let mut out = [0.0; 3];
        chain.evaluate(&[0.25, 0.5, 0.75], &mut out).unwrap();
        for (o, i) in out.iter().zip([0.25, 0.5, 0.75]) {
            assert!((o - i).abs() < EPSILON, "{out:?}");
        }
        assert!(LutChain::from_profile(&profile, Direction::Input).is_err());
    }

    #[test]
    fn test_lab_profile_chain() {
        let desc = ColorSpaceDescriptor::Lab {
            white_point: D50,
            black_point: [0.0; 3],
            range: [-128.0, 127.0, -128.0, 127.0],
        };
        let profile = builder().build(&desc).unwrap();
        let chain = LutChain::from_profile(&profile, Direction::Input).unwrap();
        assert_eq!(chain.pcs(), Some(Pcs::Lab));
        let mut out = [0.0; 3];
        chain.evaluate(&[0.5, 0.2, 0.8], &mut out).unwrap();
        assert_eq!(out, [0.5, 0.2, 0.8]);
    }
}
