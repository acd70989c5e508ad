//! Boundary peeling of labeled regions

use crate::error::{RegionError, RegionResult};
use crate::grid::on_frame;
use crate::label::{LabeledImage, check_label_depth, labels_to_pix};
use cellseg_core::{Connectivity, Pix};
use std::collections::BTreeMap;

/// Options for region shrinking
#[derive(Debug, Clone)]
pub struct ShrinkOptions {
    /// Connectivity deciding which pixels lie on a region boundary
    pub connectivity: Connectivity,
    /// Maximum number of peeling rounds
    pub rounds: u32,
    /// Smallest area a region may be peeled down to
    pub min_area: u64,
}

impl Default for ShrinkOptions {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::FourWay,
            rounds: 1,
            min_area: 1,
        }
    }
}

impl ShrinkOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connectivity type
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Set the number of peeling rounds
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    /// Set the minimum area
    pub fn with_min_area(mut self, min_area: u64) -> Self {
        self.min_area = min_area;
        self
    }
}

/// Peel boundary pixels off every region while it keeps `min_area` pixels.
///
/// See [`shrink_regions_with`].
///
/// # Errors
///
/// Returns [`RegionError::InvalidParameters`] when `min_area` or `rounds`
/// is 0.
pub fn shrink_regions(labels: &Pix, options: &ShrinkOptions) -> RegionResult<LabeledImage> {
    if options.min_area == 0 {
        return Err(RegionError::InvalidParameters(
            "min_area must be positive".to_string(),
        ));
    }
    let min_area = options.min_area;
    shrink_regions_with(labels, options, |_, remaining| remaining >= min_area)
}

/// Peel boundary pixels off every region while `valid` accepts the result.
///
/// A boundary pixel is a labeled pixel on the image frame or with a
/// neighbor carrying another value. Each round, a region loses all of its
/// boundary pixels at once if `valid(label, remaining_area)` holds for the
/// area it would keep; otherwise it is left untouched that round. Stops after
/// `options.rounds` rounds or when no region changes.
///
/// # Arguments
///
/// * `labels` - Label raster (8, 16 or 32 bpp)
/// * `options` - Boundary connectivity and round count
/// * `valid` - Region validity predicate
///
/// # Returns
///
/// The shrunk label raster, same depth as the input.
///
/// # Errors
///
/// Returns [`RegionError::InvalidParameters`] when `options.rounds` is 0.
pub fn shrink_regions_with<F>(
    labels: &Pix,
    options: &ShrinkOptions,
    mut valid: F,
) -> RegionResult<LabeledImage>
where
    F: FnMut(u32, u64) -> bool,
{
    if options.rounds == 0 {
        return Err(RegionError::InvalidParameters(
            "rounds must be positive".to_string(),
        ));
    }
    check_label_depth(labels.depth())?;
    let (width, height) = (labels.width(), labels.height());
    let mut values = labels.values();

    let mut peeled_total = 0u64;
    let mut boundary: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    let mut area: BTreeMap<u32, u64> = BTreeMap::new();
    for round in 0..options.rounds {
        boundary.clear();
        area.clear();
        for (p, &l) in values.iter().enumerate() {
            if l == 0 {
                continue;
            }
            *area.entry(l).or_insert(0) += 1;
            let edge = on_frame(p, width, height)
                || options.connectivity.neighbor_indices(p, width, height).any(|q| values[q] != l);
            if edge {
                boundary.entry(l).or_default().push(p);
            }
        }

        let mut peeled = 0u64;
        for (&label, pixels) in &boundary {
            let remaining = area[&label] - pixels.len() as u64;
            if valid(label, remaining) {
                for &p in pixels {
                    values[p] = 0;
                }
                peeled += pixels.len() as u64;
            }
        }
        log::trace!("shrink round {}: {} pixels peeled", round + 1, peeled);
        if peeled == 0 {
            break;
        }
        peeled_total += peeled;
    }

    let out = labels_to_pix(width, height, &values, labels.depth())?;
    log::debug!(
        "shrink_regions: {}x{}, {} pixels peeled",
        width,
        height,
        peeled_total
    );
    Ok(out)
}
