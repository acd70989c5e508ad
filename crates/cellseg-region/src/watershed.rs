//! Watershed segmentation
//!
//! The grey image is treated as a relief flooded from its regional extrema
//! (or from caller-supplied markers). Each pixel moves through
//! `Unprocessed -> Queued -> Label | Watershed`: it is queued by a labeled
//! neighbor with priority equal to the monotone flood level, and when popped
//! it adopts the label its labeled neighbors agree on. A pixel whose labeled
//! neighbors disagree becomes a watershed line pixel. Pixels the flood never
//! reaches are flushed through a residual queue and end up as line pixels
//! too, so the output is a complete partition into labels and 0.

use crate::error::{RegionError, RegionResult};
use crate::extrema::{ExtremumKind, extrema_labels};
use crate::grid::{FloodState, gray_values};
use crate::label::{LabeledImage, check_label_capacity, check_label_depth, labels_to_pix};
use crate::priority::{FloodOrder, PriorityQueue};
use cellseg_core::{Connectivity, Pix, PixelDepth};
use std::collections::VecDeque;

/// Options for watershed segmentation
#[derive(Debug, Clone)]
pub struct WatershedOptions {
    /// Connectivity for finding neighbors
    pub connectivity: Connectivity,
    /// Ascending floods from the minima, descending from the maxima
    pub order: FloodOrder,
    /// Draw watershed lines where basins meet; otherwise every reached
    /// pixel joins the basin that queued it
    pub lines: bool,
    /// Depth of the output label raster
    pub label_depth: PixelDepth,
}

impl Default for WatershedOptions {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::EightWay,
            order: FloodOrder::Ascending,
            lines: true,
            label_depth: PixelDepth::Bit32,
        }
    }
}

impl WatershedOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connectivity type
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Set the flood order
    pub fn with_order(mut self, order: FloodOrder) -> Self {
        self.order = order;
        self
    }

    /// Enable or disable watershed lines
    pub fn with_lines(mut self, lines: bool) -> Self {
        self.lines = lines;
        self
    }

    /// Set the output label depth
    pub fn with_label_depth(mut self, depth: PixelDepth) -> Self {
        self.label_depth = depth;
        self
    }
}

/// Per-call flooding context
struct Flood<'a> {
    values: &'a [u32],
    width: u32,
    height: u32,
    connectivity: Connectivity,
    lines: bool,
    state: Vec<FloodState>,
    queue: PriorityQueue<u32, (usize, u32)>,
}

impl<'a> Flood<'a> {
    fn new(values: &'a [u32], width: u32, height: u32, options: &WatershedOptions) -> Self {
        Self {
            values,
            width,
            height,
            connectivity: options.connectivity,
            lines: options.lines,
            state: vec![FloodState::Unprocessed; values.len()],
            queue: PriorityQueue::new(options.order),
        }
    }

    /// Queue the unprocessed neighbors of labeled pixel `p`.
    fn spread(&mut self, p: usize, front: u32, label: u32) {
        let order = self.queue.order();
        for q in self.connectivity.neighbor_indices(p, self.width, self.height) {
            if self.state[q] == FloodState::Unprocessed {
                self.state[q] = FloodState::Queued;
                self.queue.push(order.clamp(front, self.values[q]), (q, label));
            }
        }
    }

    /// Plant `seeds` (row-major, 0 = none) and flood until every pixel is
    /// settled.
    fn run(mut self, seeds: &[u32]) -> Vec<FloodState> {
        for (p, &label) in seeds.iter().enumerate() {
            if label > 0 {
                self.state[p] = FloodState::Label(label);
            }
        }
        for (p, &label) in seeds.iter().enumerate() {
            if label > 0 {
                self.spread(p, self.values[p], label);
            }
        }

        let mut residual = VecDeque::new();
        while let Some((front, (p, origin))) = self.queue.pop() {
            let mut vote = None;
            let mut conflict = false;
            for q in self.connectivity.neighbor_indices(p, self.width, self.height) {
                if let Some(l) = self.state[q].label() {
                    match vote {
                        None => vote = Some(l),
                        Some(v) if v != l => conflict = true,
                        _ => {}
                    }
                }
            }
            let label = match vote {
                None => {
                    residual.push_back(p);
                    continue;
                }
                Some(_) if conflict && self.lines => {
                    self.state[p] = FloodState::Watershed;
                    continue;
                }
                Some(_) if conflict => origin,
                Some(v) => v,
            };
            self.state[p] = FloodState::Label(label);
            self.spread(p, front, label);
        }

        residual.extend(
            self.state
                .iter()
                .enumerate()
                .filter(|(_, s)| matches!(s, FloodState::Unprocessed | FloodState::Queued))
                .map(|(p, _)| p),
        );
        let stranded = residual.len();
        while let Some(p) = residual.pop_front() {
            if self.state[p].label().is_none() {
                self.state[p] = FloodState::Watershed;
            }
        }
        log::trace!(
            "watershed flood: {} pushes, {} stranded pixels",
            self.queue.pushed(),
            stranded
        );
        self.state
    }
}

fn finish(
    state: &[FloodState],
    width: u32,
    height: u32,
    depth: PixelDepth,
) -> RegionResult<LabeledImage> {
    let labels: Vec<u32> = state.iter().map(|s| s.output()).collect();
    labels_to_pix(width, height, &labels, depth)
}

/// Segment a grey image by flooding from its regional extrema.
///
/// Ascending order floods from the minima, descending order from the maxima.
/// Labels are numbered `1..=n` in raster order of each extremum.
///
/// # Arguments
///
/// * `pix` - Input image (8 or 16 bpp)
/// * `options` - Connectivity, flood order, line drawing and label depth
///
/// # Returns
///
/// A label raster where 0 marks watershed lines and positive values are
/// basin labels.
///
/// # Errors
///
/// Returns [`RegionError::LabelOverflow`] before flooding when there are more
/// extrema than the label depth can hold.
pub fn watershed(pix: &Pix, options: &WatershedOptions) -> RegionResult<LabeledImage> {
    check_label_depth(options.label_depth)?;
    let values = gray_values(pix)?;
    let (width, height) = (pix.width(), pix.height());
    let kind = ExtremumKind::for_order(options.order);
    let (seeds, count) = extrema_labels(&values, width, height, options.connectivity, kind);
    check_label_capacity(count as u64, options.label_depth)?;

    let state = Flood::new(&values, width, height, options).run(&seeds);
    let out = finish(&state, width, height, options.label_depth)?;
    log::debug!(
        "watershed: {}x{}, {} seeds -> {} basins",
        width,
        height,
        count,
        out.count
    );
    Ok(out)
}

/// Segment a grey image by flooding from caller-supplied markers.
///
/// Every positive value of `markers` is a seed and keeps its id in the
/// output; equal ids anywhere in the marker raster belong to one basin.
///
/// # Arguments
///
/// * `pix` - Input image (8 or 16 bpp)
/// * `markers` - Marker label raster of the same size (any depth)
/// * `options` - Connectivity, flood order, line drawing and label depth
///
/// # Errors
///
/// Returns an error on mismatched sizes, non-grey input, or marker ids
/// beyond the label depth.
pub fn constrained_watershed(
    pix: &Pix,
    markers: &Pix,
    options: &WatershedOptions,
) -> RegionResult<LabeledImage> {
    pix.check_same_size(markers)?;
    let values = gray_values(pix)?;
    let seeds = markers.values();
    let largest = seeds.iter().copied().max().unwrap_or(0);
    check_label_capacity(largest as u64, options.label_depth)?;
    if largest == 0 {
        return Err(RegionError::InvalidParameters(
            "marker raster holds no seeds".to_string(),
        ));
    }

    let (width, height) = (pix.width(), pix.height());
    let state = Flood::new(&values, width, height, options).run(&seeds);
    let out = finish(&state, width, height, options.label_depth)?;
    log::debug!(
        "constrained_watershed: {}x{} -> {} basins",
        width,
        height,
        out.count
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, values: &[u32]) -> Vec<u32> {
        assert_eq!(values.len() % width as usize, 0);
        values.to_vec()
    }

    #[test]
    fn test_flood_leaves_no_pending_pixels() {
        #[rustfmt::skip]
        let values = gray(5, &[
            1, 2, 3, 2, 1,
            2, 3, 4, 3, 2,
            1, 2, 3, 2, 1,
        ]);
        let (seeds, count) = extrema_labels(
            &values,
            5,
            3,
            Connectivity::FourWay,
            ExtremumKind::Minima,
        );
        assert_eq!(count, 4);
        let options = WatershedOptions::new().with_connectivity(Connectivity::FourWay);
        let state = Flood::new(&values, 5, 3, &options).run(&seeds);
        assert!(
            state
                .iter()
                .all(|s| matches!(s, FloodState::Label(_) | FloodState::Watershed))
        );
    }

    #[test]
    fn test_ridge_becomes_line() {
        #[rustfmt::skip]
        let pix = Pix::from_values(5, 1, PixelDepth::Bit8, &[0, 1, 9, 1, 0]).unwrap();
        let out = watershed(&pix, &WatershedOptions::new()).unwrap();
        assert_eq!(out.count, 2);
        assert_eq!(out.labels.values(), vec![1, 1, 0, 2, 2]);

        let out = watershed(&pix, &WatershedOptions::new().with_lines(false)).unwrap();
        assert_eq!(out.labels.values(), vec![1, 1, 1, 2, 2]);
    }

    #[test]
    fn test_uniform_image_single_basin() {
        let pix = Pix::from_values(4, 4, PixelDepth::Bit8, &[3; 16]).unwrap();
        let out = watershed(&pix, &WatershedOptions::new()).unwrap();
        assert_eq!(out.count, 1);
        assert!(out.labels.values().iter().all(|&l| l == 1));
    }

    #[test]
    fn test_constrained_keeps_marker_ids() {
        let pix = Pix::from_values(5, 1, PixelDepth::Bit8, &[0, 1, 2, 1, 0]).unwrap();
        let markers = Pix::from_values(5, 1, PixelDepth::Bit32, &[40, 0, 0, 0, 7]).unwrap();
        let out = constrained_watershed(&pix, &markers, &WatershedOptions::new()).unwrap();
        assert_eq!(out.labels.values(), vec![40, 40, 0, 7, 7]);
        assert_eq!(out.count, 2);
    }

    #[test]
    fn test_constrained_rejects_bad_markers() {
        let pix = Pix::from_values(3, 1, PixelDepth::Bit8, &[0, 1, 2]).unwrap();
        let empty = Pix::new(3, 1, PixelDepth::Bit8).unwrap();
        assert!(constrained_watershed(&pix, &empty, &WatershedOptions::new()).is_err());

        let big = Pix::from_values(3, 1, PixelDepth::Bit32, &[1000, 0, 0]).unwrap();
        let opts = WatershedOptions::new().with_label_depth(PixelDepth::Bit8);
        assert!(matches!(
            constrained_watershed(&pix, &big, &opts),
            Err(RegionError::LabelOverflow { count: 1000, .. })
        ));
    }
}
