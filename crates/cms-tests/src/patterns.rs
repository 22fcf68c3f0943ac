//! Page-like test buffers
//!
//! Rasterized page content is dominated by runs of one color, so besides
//! noise the generators produce run-length structured data that exercises
//! the evaluator cache.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Buffer pattern types
#[derive(Debug, Clone, Copy)]
pub enum PagePattern {
    /// Independent random bytes with seed
    Random(u64),
    /// Random colors repeated for 1..=max_run pixels
    Runs { seed: u64, max_run: usize },
    /// One color everywhere
    Flat(u8),
    /// Every component steps through 0..=255
    Ramp,
}

/// Generate `pixels` pixels of `bytes_per_pixel` bytes each
pub fn generate_page(pattern: PagePattern, pixels: usize, bytes_per_pixel: usize) -> Vec<u8> {
    let mut data = vec![0u8; pixels * bytes_per_pixel];

    match pattern {
        PagePattern::Random(seed) => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.fill_bytes(&mut data);
        }
        PagePattern::Runs { seed, max_run } => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut color = vec![0u8; bytes_per_pixel];
            let mut remaining = 0;
            for chunk in data.chunks_exact_mut(bytes_per_pixel) {
                if remaining == 0 {
                    rng.fill_bytes(&mut color);
                    remaining = rng.gen_range(1..=max_run.max(1));
                }
                chunk.copy_from_slice(&color);
                remaining -= 1;
            }
        }
        PagePattern::Flat(v) => data.fill(v),
        PagePattern::Ramp => {
            for (i, v) in data.iter_mut().enumerate() {
                *v = (i / bytes_per_pixel % 256) as u8;
            }
        }
    }

    data
}

/// Number of pixels equal to their predecessor
pub fn repeated_pixels(data: &[u8], bytes_per_pixel: usize) -> usize {
    data.chunks_exact(bytes_per_pixel)
        .zip(data.chunks_exact(bytes_per_pixel).skip(1))
        .filter(|(a, b)| a == b)
        .count()
}

/// Standard pixel counts
pub mod sizes {
    pub const LINE: usize = 612;
    pub const BAND: usize = 612 * 16;
    pub const PAGE: usize = 612 * 792;
}
