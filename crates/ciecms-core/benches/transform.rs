//! Chain and evaluator benchmarks
//!
//! Interpolation kernels, whole-chain evaluation, and the pixel loop with
//! the single-entry cache on and off.

use std::sync::Arc;

use ciecms_core::math::{interpolate_multilinear, interpolate_tetrahedral};
use ciecms_core::{
    BuilderOptions, ColorSpaceDescriptor, D50, Direction, EvaluatorOptions, LutChain, Matrix3x3,
    PixelFormat, ProfileBuilder, RenderingDictionary, TransformCache, TransformEvaluator,
};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// sRGB primaries adapted to D50, one primary per row
const SRGB_D50: [[f64; 3]; 3] = [
    [0.4360747, 0.2225045, 0.0139322],
    [0.3850649, 0.7168786, 0.0971045],
    [0.1430804, 0.0606169, 0.7141733],
];

fn generate_inputs(count: usize, channels: usize) -> Vec<f64> {
    (0..count * channels)
        .map(|i| ((i * 37) % 1000) as f64 / 999.0)
        .collect()
}

/// Noise: neighbouring pixels never repeat
fn generate_rgb8_noise(count: usize) -> Vec<u8> {
    (0..count * 3).map(|i| ((i * 37) % 256) as u8).collect()
}

/// Page-like content: each color held for `run` pixels
fn generate_rgb8_runs(count: usize, run: usize) -> Vec<u8> {
    (0..count)
        .flat_map(|i| {
            let c = (i / run) * 53;
            [(c % 256) as u8, (c / 3 % 256) as u8, (c / 7 % 256) as u8]
        })
        .collect()
}

fn generate_grid(grid: &[usize], outputs: usize) -> Vec<f64> {
    let nodes: usize = grid.iter().product();
    (0..nodes * outputs)
        .map(|i| ((i * 7919) % 65536) as f64 / 65535.0)
        .collect()
}

fn link_calrgb_to_crd() -> Arc<LutChain> {
    let builder = ProfileBuilder::new(BuilderOptions::default()).unwrap();
    let source = builder
        .build(&ColorSpaceDescriptor::CalRgb {
            white_point: D50,
            black_point: [0.0; 3],
            gamma: [2.2; 3],
            matrix: Matrix3x3::new(SRGB_D50),
        })
        .unwrap();
    let device = builder
        .build_from_rendering_dict(&RenderingDictionary::default())
        .unwrap();
    let link = LutChain::link(
        &LutChain::from_profile(&source, Direction::Input).unwrap(),
        &LutChain::from_profile(&device, Direction::Output).unwrap(),
    )
    .unwrap();
    Arc::new(link)
}

// ============================================================================
// Interpolation Benchmarks
// ============================================================================

fn bench_interpolation(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolation");
    let count = 10_000;
    group.throughput(Throughput::Elements(count as u64));

    let grid3 = [17usize; 3];
    let data3 = generate_grid(&grid3, 3);
    let inputs3 = generate_inputs(count, 3);
    let mut out = [0.0f64; 4];

    group.bench_function("multilinear_3in", |b| {
        b.iter(|| {
            for px in inputs3.chunks_exact(3) {
                interpolate_multilinear(&grid3, &data3, 3, black_box(px), &mut out[..3]);
            }
        })
    });

    group.bench_function("tetrahedral_3in", |b| {
        b.iter(|| {
            for px in inputs3.chunks_exact(3) {
                let rgb = black_box([px[0], px[1], px[2]]);
                interpolate_tetrahedral(grid3, &data3, 3, rgb, &mut out[..3]);
            }
        })
    });

    let grid4 = [9usize; 4];
    let data4 = generate_grid(&grid4, 4);
    let inputs4 = generate_inputs(count, 4);

    group.bench_function("multilinear_4in", |b| {
        b.iter(|| {
            for px in inputs4.chunks_exact(4) {
                interpolate_multilinear(&grid4, &data4, 4, black_box(px), &mut out);
            }
        })
    });

    group.finish();
}

// ============================================================================
// Chain Benchmarks
// ============================================================================

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");
    let count = 10_000;
    group.throughput(Throughput::Elements(count as u64));

    let link = link_calrgb_to_crd();
    let inputs = generate_inputs(count, 3);
    let mut out = [0.0f64; 3];

    group.bench_function("calrgb_to_crd", |b| {
        b.iter(|| {
            for px in inputs.chunks_exact(3) {
                link.evaluate(black_box(px), &mut out).unwrap();
            }
        })
    });

    group.finish();
}

// ============================================================================
// Evaluator Benchmarks
// ============================================================================

fn bench_evaluator(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluator_rgb8");
    let link = link_calrgb_to_crd();

    let cached = TransformEvaluator::new(
        link.clone(),
        PixelFormat::rgb8(),
        PixelFormat::rgb8(),
        EvaluatorOptions::default(),
    )
    .unwrap();
    let uncached = TransformEvaluator::new(
        link,
        PixelFormat::rgb8(),
        PixelFormat::rgb8(),
        EvaluatorOptions::default().with_cache(false),
    )
    .unwrap();

    for pixel_count in [1000, 100_000].iter() {
        let inputs = [
            ("noise", generate_rgb8_noise(*pixel_count)),
            ("runs", generate_rgb8_runs(*pixel_count, 16)),
        ];
        let mut dst = vec![0u8; pixel_count * 3];
        group.throughput(Throughput::Elements(*pixel_count as u64));

        for (content, src) in &inputs {
            for (mode, eval) in [("cached", &cached), ("uncached", &uncached)] {
                group.bench_with_input(
                    BenchmarkId::new(format!("{content}_{mode}"), pixel_count),
                    pixel_count,
                    |b, &n| {
                        b.iter(|| {
                            let mut cache = TransformCache::new();
                            eval.run(black_box(src), black_box(&mut dst), n, &mut cache)
                                .unwrap()
                        })
                    },
                );
            }
        }
    }

    group.finish();
}

criterion_group!(benches, bench_interpolation, bench_chain, bench_evaluator);

criterion_main!(benches);
