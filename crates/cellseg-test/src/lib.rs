//! cellseg-test - Regression test framework for cellseg
//!
//! This crate provides the regression harness used by the `tests/*_reg.rs`
//! files of every cellseg crate, plus builders for the synthetic rasters
//! those tests run on.
//!
//! # Usage
//!
//! ```ignore
//! use cellseg_test::{RegParams, pix_from_rows};
//!
//! let mut rp = RegParams::new("watershed");
//! rp.compare_values(2.0, count as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" (default) or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use cellseg_core::{Pix, PixelDepth};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Build an 8 bpp raster from literal rows.
pub fn pix_from_rows(rows: &[&[u32]]) -> TestResult<Pix> {
    pix_from_rows_depth(rows, PixelDepth::Bit8)
}

/// Build a raster of the given depth from literal rows.
pub fn pix_from_rows_depth(rows: &[&[u32]], depth: PixelDepth) -> TestResult<Pix> {
    let width = rows.first().map_or(0, |r| r.len());
    let mut values = Vec::with_capacity(width * rows.len());
    for (row, r) in rows.iter().enumerate() {
        if r.len() != width {
            return Err(TestError::RaggedRows {
                row,
                len: r.len(),
                expected: width,
            });
        }
        values.extend_from_slice(r);
    }
    Pix::from_values(width as u32, rows.len() as u32, depth, &values)
        .map_err(|source| TestError::Build {
            name: "rows",
            source,
        })
}

/// A `width` × `height` 8 bpp raster filled with `background`, with each
/// `(x, y, w, h, value)` rectangle painted in order.
pub fn pix_with_blocks(
    width: u32,
    height: u32,
    background: u32,
    blocks: &[(u32, u32, u32, u32, u32)],
) -> TestResult<Pix> {
    let mut values = vec![background; width as usize * height as usize];
    for &(bx, by, bw, bh, value) in blocks {
        for y in by..(by + bh).min(height) {
            for x in bx..(bx + bw).min(width) {
                values[(y * width + x) as usize] = value;
            }
        }
    }
    Pix::from_values(width, height, PixelDepth::Bit8, &values).map_err(|source| {
        TestError::Build {
            name: "blocks",
            source,
        }
    })
}

/// Smooth 8 bpp relief built from sines and cosines.
///
/// `variant` selects one of two frequency sets; both produce many regional
/// minima and maxima.
pub fn synthetic_wave(size: u32, variant: u32) -> TestResult<Pix> {
    let mut values = Vec::with_capacity((size * size) as usize);
    for i in 0..size {
        for j in 0..size {
            let fi = i as f32;
            let fj = j as f32;
            let f = if variant == 0 {
                128.0
                    + 26.3 * (0.0438 * fi).sin()
                    + 33.4 * (0.0712 * fi).cos()
                    + 18.6 * (0.0561 * fj).sin()
                    + 23.6 * (0.0327 * fj).cos()
            } else {
                128.0
                    + 26.3 * (0.0238 * fi).sin()
                    + 33.4 * (0.0312 * fi).cos()
                    + 18.6 * (0.0261 * fj).sin()
                    + 23.6 * (0.0207 * fj).cos()
            };
            values.push(f.clamp(0.0, 255.0) as u32);
        }
    }
    Pix::from_values(size, size, PixelDepth::Bit8, &values).map_err(|source| TestError::Build {
        name: "wave",
        source,
    })
}

/// Seeded pseudo-random 8 bpp raster with values in `0..=max_value`.
pub fn random_pix(width: u32, height: u32, max_value: u32, seed: u64) -> TestResult<Pix> {
    let mut rng = StdRng::seed_from_u64(seed);
    let max_value = max_value.min(255);
    let values: Vec<u32> = (0..width * height)
        .map(|_| rng.random_range(0..=max_value))
        .collect();
    Pix::from_values(width, height, PixelDepth::Bit8, &values).map_err(|source| {
        TestError::Build {
            name: "random",
            source,
        }
    })
}

/// Render a raster as whitespace-separated rows.
pub fn dump_pix(pix: &Pix) -> String {
    let mut out = String::new();
    for y in 0..pix.height() {
        let row: Vec<String> = (0..pix.width())
            .map(|x| format!("{:3}", pix.get_pixel_unchecked(x, y)))
            .collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pix_from_rows() {
        let pix = pix_from_rows(&[&[1, 2, 3], &[4, 5, 6]]).unwrap();
        assert_eq!(pix.width(), 3);
        assert_eq!(pix.height(), 2);
        assert_eq!(pix.get_pixel(2, 1), Some(6));
        assert!(pix_from_rows(&[&[1, 2], &[3]]).is_err());
    }

    #[test]
    fn test_pix_with_blocks() {
        let pix = pix_with_blocks(6, 4, 10, &[(1, 1, 2, 2, 50), (5, 3, 4, 4, 80)]).unwrap();
        assert_eq!(pix.get_pixel(0, 0), Some(10));
        assert_eq!(pix.get_pixel(2, 2), Some(50));
        assert_eq!(pix.get_pixel(5, 3), Some(80));
    }

    #[test]
    fn test_random_pix_is_reproducible() {
        let a = random_pix(8, 8, 7, 42).unwrap();
        let b = random_pix(8, 8, 7, 42).unwrap();
        assert_eq!(a.values(), b.values());
        assert!(a.values().iter().all(|&v| v <= 7));
    }
}
