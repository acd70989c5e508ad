//! Label rasters
//!
//! Every flooding and growing routine returns a [`LabeledImage`]: a label
//! raster where 0 is background (or watershed line) and positive values are
//! region ids. This module also derives per-region statistics from such a
//! raster and compacts label ids.

use crate::error::{RegionError, RegionResult};
use cellseg_core::{Box, Pix, PixelDepth};
use std::collections::{BTreeMap, HashMap};

/// A label raster together with the number of distinct positive labels
#[derive(Debug, Clone)]
pub struct LabeledImage {
    /// Label raster (8, 16 or 32 bpp); 0 is background
    pub labels: Pix,
    /// Number of distinct positive labels present
    pub count: u32,
}

impl LabeledImage {
    /// Label at `(x, y)`, or `None` outside the raster.
    pub fn label_at(&self, x: u32, y: u32) -> Option<u32> {
        self.labels.get_pixel(x, y)
    }
}

/// Validate that `depth` can hold label ids.
pub(crate) fn check_label_depth(depth: PixelDepth) -> RegionResult<()> {
    match depth {
        PixelDepth::Bit8 | PixelDepth::Bit16 | PixelDepth::Bit32 => Ok(()),
        other => Err(RegionError::UnsupportedDepth {
            expected: "8, 16 or 32 bpp labels",
            actual: other.bits(),
        }),
    }
}

/// Fail with [`RegionError::LabelOverflow`] when `largest` does not fit in
/// `depth`.
pub(crate) fn check_label_capacity(largest: u64, depth: PixelDepth) -> RegionResult<()> {
    check_label_depth(depth)?;
    let max = depth.max_value();
    if largest > max as u64 {
        return Err(RegionError::LabelOverflow {
            count: largest,
            depth: depth.bits(),
            max,
        });
    }
    Ok(())
}

/// Pack row-major labels into a raster of `depth`.
pub(crate) fn labels_to_pix(
    width: u32,
    height: u32,
    labels: &[u32],
    depth: PixelDepth,
) -> RegionResult<LabeledImage> {
    let largest = labels.iter().copied().max().unwrap_or(0);
    check_label_capacity(largest as u64, depth)?;
    let count = distinct_positive(labels);
    let labels = Pix::from_values(width, height, depth, labels)?;
    Ok(LabeledImage { labels, count })
}

fn distinct_positive(labels: &[u32]) -> u32 {
    let mut seen: Vec<u32> = labels.iter().copied().filter(|&l| l > 0).collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len() as u32
}

/// Count the distinct positive labels of a label raster.
pub fn count_labels(labels: &Pix) -> u32 {
    distinct_positive(&labels.values())
}

/// Renumber positive labels to `1..=n` in order of first appearance
/// (raster scan), keeping the raster depth.
///
/// # Errors
///
/// Returns [`RegionError::UnsupportedDepth`] if the raster is not 8, 16 or
/// 32 bpp.
pub fn relabel_sequential(labels: &Pix) -> RegionResult<LabeledImage> {
    check_label_depth(labels.depth())?;
    let mut map: HashMap<u32, u32> = HashMap::new();
    let values: Vec<u32> = labels
        .values()
        .into_iter()
        .map(|l| {
            if l == 0 {
                0
            } else {
                let next = map.len() as u32 + 1;
                *map.entry(l).or_insert(next)
            }
        })
        .collect();
    labels_to_pix(labels.width(), labels.height(), &values, labels.depth())
}

/// Per-region statistics of a label raster
#[derive(Debug, Clone, PartialEq)]
pub struct RegionStats {
    /// Region label
    pub label: u32,
    /// Bounding box
    pub bounds: Box,
    /// Number of pixels
    pub pixel_count: u64,
    /// Centroid X coordinate
    pub centroid_x: f64,
    /// Centroid Y coordinate
    pub centroid_y: f64,
    /// First pixel of the region in raster-scan order
    pub start: (u32, u32),
}

/// Compute statistics for every positive label.
///
/// # Arguments
///
/// * `labels` - Label raster (8, 16 or 32 bpp)
///
/// # Returns
///
/// One entry per positive label, sorted by label.
///
/// # Errors
///
/// Returns [`RegionError::UnsupportedDepth`] for 1, 2 or 4 bpp rasters.
pub fn region_stats(labels: &Pix) -> RegionResult<Vec<RegionStats>> {
    check_label_depth(labels.depth())?;

    struct Accum {
        count: u64,
        sum_x: u64,
        sum_y: u64,
        min_x: u32,
        min_y: u32,
        max_x: u32,
        max_y: u32,
        start: (u32, u32),
    }

    let mut stats: BTreeMap<u32, Accum> = BTreeMap::new();
    for y in 0..labels.height() {
        for x in 0..labels.width() {
            let label = labels.get_pixel_unchecked(x, y);
            if label == 0 {
                continue;
            }
            let acc = stats.entry(label).or_insert(Accum {
                count: 0,
                sum_x: 0,
                sum_y: 0,
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
                start: (x, y),
            });
            acc.count += 1;
            acc.sum_x += x as u64;
            acc.sum_y += y as u64;
            acc.min_x = acc.min_x.min(x);
            acc.min_y = acc.min_y.min(y);
            acc.max_x = acc.max_x.max(x);
            acc.max_y = acc.max_y.max(y);
        }
    }

    Ok(stats
        .into_iter()
        .map(|(label, acc)| RegionStats {
            label,
            bounds: Box::from_extent(
                acc.min_x as i32,
                acc.max_x as i32,
                acc.min_y as i32,
                acc.max_y as i32,
            ),
            pixel_count: acc.count,
            centroid_x: acc.sum_x as f64 / acc.count as f64,
            centroid_y: acc.sum_y as f64 / acc.count as f64,
            start: acc.start,
        })
        .collect())
}
