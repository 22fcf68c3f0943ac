//! Source descriptors and rendering dictionaries covering every family

use ciecms_core::{
    CieBasedA, CieBasedAbc, CieBasedDef, CieBasedDefg, CieLmn, ColorSpaceDescriptor, D50,
    Matrix3x3, Profile, ProfileBuilder, RenderTable, RenderingDictionary, SampledCurve,
    SampledTable, UNIT_RANGE,
};

/// sRGB primaries adapted to D50, one primary per row
pub fn srgb_d50_primaries() -> Matrix3x3 {
    Matrix3x3::new([
        [0.4360747, 0.2225045, 0.0139322],
        [0.3850649, 0.7168786, 0.0971045],
        [0.1430804, 0.0606169, 0.7141733],
    ])
}

pub fn cal_gray(gamma: f64) -> ColorSpaceDescriptor {
    ColorSpaceDescriptor::CalGray {
        white_point: D50,
        black_point: [0.0; 3],
        gamma,
    }
}

pub fn cal_rgb(gamma: f64, matrix: Matrix3x3) -> ColorSpaceDescriptor {
    ColorSpaceDescriptor::CalRgb {
        white_point: D50,
        black_point: [0.0; 3],
        gamma: [gamma; 3],
        matrix,
    }
}

pub fn lab_full_range() -> ColorSpaceDescriptor {
    ColorSpaceDescriptor::Lab {
        white_point: D50,
        black_point: [0.0; 3],
        range: [-128.0, 127.0, -128.0, 127.0],
    }
}

/// Gray ramp whose A drives Y directly
pub fn cie_a_linear() -> ColorSpaceDescriptor {
    ColorSpaceDescriptor::CieBasedA(CieBasedA {
        range_a: UNIT_RANGE,
        decode_a: SampledCurve::identity(),
        matrix_a: [1.0, 1.0, 1.0],
        lmn: CieLmn::default(),
    })
}

/// CIEBasedABC spelling of a gamma 2.2 sRGB-like space
pub fn cie_abc_gamma(gamma: f64) -> ColorSpaceDescriptor {
    ColorSpaceDescriptor::CieBasedAbc(CieBasedAbc {
        decode_abc: Some(std::array::from_fn(|_| {
            SampledCurve::from_fn(256, |x| x.powf(gamma))
        })),
        matrix_abc: srgb_d50_primaries(),
        ..CieBasedAbc::default()
    })
}

/// DEF space with an identity 5x5x5 table
pub fn cie_def_identity() -> ColorSpaceDescriptor {
    ColorSpaceDescriptor::CieBasedDef(CieBasedDef {
        range_def: [UNIT_RANGE; 3],
        decode_def: None,
        table: SampledTable::from_fn(vec![5, 5, 5], 3, |input, out| {
            out.copy_from_slice(input);
        }),
        abc: CieBasedAbc::default(),
    })
}

/// DEFG space whose table acts like a naive CMYK to RGB conversion
pub fn cie_defg_naive_cmyk() -> ColorSpaceDescriptor {
    ColorSpaceDescriptor::CieBasedDefg(CieBasedDefg {
        range_defg: [UNIT_RANGE; 4],
        decode_defg: None,
        table: SampledTable::from_fn(vec![3, 3, 3, 3], 3, |input, out| {
            let k = 1.0 - input[3];
            for (o, c) in out.iter_mut().zip(input) {
                *o = (1.0 - c) * k;
            }
        }),
        abc: CieBasedAbc::default(),
    })
}

/// Every source family, with a name for assertion messages
pub fn source_descriptors() -> Vec<(&'static str, ColorSpaceDescriptor)> {
    vec![
        ("CalGray", cal_gray(1.8)),
        ("CalRGB", cal_rgb(2.2, srgb_d50_primaries())),
        ("Lab", lab_full_range()),
        ("CIEBasedA", cie_a_linear()),
        ("CIEBasedABC", cie_abc_gamma(2.2)),
        ("CIEBasedDEF", cie_def_identity()),
        ("CIEBasedDEFG", cie_defg_naive_cmyk()),
    ]
}

/// Rendering dictionary with a CMY(K) render table: device = 1 - XYZ, K = 0
pub fn crd_naive_cmyk() -> RenderingDictionary {
    RenderingDictionary {
        render_table: Some(RenderTable {
            table: SampledTable::from_fn(vec![5, 5, 5], 4, |input, out| {
                for (o, v) in out.iter_mut().zip(input) {
                    *o = 1.0 - v;
                }
                out[3] = 0.0;
            }),
            output_curves: None,
        }),
        ..RenderingDictionary::default()
    }
}

pub fn rendering_dictionaries() -> Vec<(&'static str, RenderingDictionary)> {
    vec![
        ("CRD default", RenderingDictionary::default()),
        ("CRD CMYK", crd_naive_cmyk()),
    ]
}

/// Build every source and rendering fixture
pub fn all_profiles(builder: &ProfileBuilder) -> anyhow::Result<Vec<(&'static str, Profile)>> {
    let mut profiles = Vec::new();
    for (name, descriptor) in source_descriptors() {
        profiles.push((name, builder.build(&descriptor)?));
    }
    for (name, rd) in rendering_dictionaries() {
        profiles.push((name, builder.build_from_rendering_dict(&rd)?));
    }
    Ok(profiles)
}
