//! Regional extrema
//!
//! A regional minimum (maximum) is a connected plateau of equal grey value
//! with no neighbor strictly lower (higher). Extrema are the seeds of the
//! watershed and of extinction values.

use crate::error::RegionResult;
use crate::grid::gray_values;
use crate::label::{LabeledImage, check_label_depth, labels_to_pix};
use crate::priority::FloodOrder;
use cellseg_core::{Connectivity, Pix, PixelDepth};
use std::collections::VecDeque;

/// Which extrema to find
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtremumKind {
    /// Regional minima
    #[default]
    Minima,
    /// Regional maxima
    Maxima,
}

impl ExtremumKind {
    /// The extremum kind a flood in `order` starts from.
    pub fn for_order(order: FloodOrder) -> Self {
        match order {
            FloodOrder::Ascending => ExtremumKind::Minima,
            FloodOrder::Descending => ExtremumKind::Maxima,
        }
    }

    #[inline]
    fn beaten_by(self, plateau: u32, neighbor: u32) -> bool {
        match self {
            ExtremumKind::Minima => neighbor < plateau,
            ExtremumKind::Maxima => neighbor > plateau,
        }
    }
}

/// Options for regional extrema labeling
#[derive(Debug, Clone)]
pub struct ExtremaOptions {
    /// Neighbor topology
    pub connectivity: Connectivity,
    /// Minima or maxima
    pub kind: ExtremumKind,
    /// Depth of the output label raster
    pub label_depth: PixelDepth,
}

impl Default for ExtremaOptions {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::EightWay,
            kind: ExtremumKind::Minima,
            label_depth: PixelDepth::Bit32,
        }
    }
}

impl ExtremaOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connectivity
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Set the extremum kind
    pub fn with_kind(mut self, kind: ExtremumKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the output label depth
    pub fn with_label_depth(mut self, depth: PixelDepth) -> Self {
        self.label_depth = depth;
        self
    }
}

/// Label regional extrema over row-major values.
///
/// Labels run `1..=count` in raster order of each plateau's first pixel.
pub(crate) fn extrema_labels(
    values: &[u32],
    width: u32,
    height: u32,
    connectivity: Connectivity,
    kind: ExtremumKind,
) -> (Vec<u32>, u32) {
    let n = values.len();
    let mut labels = vec![0u32; n];
    let mut visited = vec![false; n];
    let mut plateau = Vec::new();
    let mut queue = VecDeque::new();
    let mut count = 0u32;

    for start in 0..n {
        if visited[start] {
            continue;
        }
        let level = values[start];
        let mut extremum = true;
        plateau.clear();
        visited[start] = true;
        queue.push_back(start);
        while let Some(p) = queue.pop_front() {
            plateau.push(p);
            for q in connectivity.neighbor_indices(p, width, height) {
                let v = values[q];
                if v == level {
                    if !visited[q] {
                        visited[q] = true;
                        queue.push_back(q);
                    }
                } else if kind.beaten_by(level, v) {
                    extremum = false;
                }
            }
        }
        if extremum {
            count += 1;
            for &p in &plateau {
                labels[p] = count;
            }
        }
    }
    (labels, count)
}

/// Label the regional minima or maxima of a grey image.
///
/// # Arguments
///
/// * `pix` - Input image (8 or 16 bpp)
/// * `options` - Connectivity, extremum kind and label depth
///
/// # Returns
///
/// A label raster where every extremum plateau carries its own label and
/// every other pixel is 0.
///
/// # Errors
///
/// Returns [`RegionError::UnsupportedDepth`](crate::RegionError) for non-grey
/// input and [`RegionError::LabelOverflow`](crate::RegionError) when the
/// extrema do not fit in the label depth.
pub fn label_regional_extrema(pix: &Pix, options: &ExtremaOptions) -> RegionResult<LabeledImage> {
    check_label_depth(options.label_depth)?;
    let values = gray_values(pix)?;
    let (labels, count) = extrema_labels(
        &values,
        pix.width(),
        pix.height(),
        options.connectivity,
        options.kind,
    );
    let out = labels_to_pix(pix.width(), pix.height(), &labels, options.label_depth)?;
    log::debug!(
        "label_regional_extrema: {:?} {}x{} -> {} extrema",
        options.kind,
        pix.width(),
        pix.height(),
        count
    );
    Ok(out)
}

fn representatives(
    pix: &Pix,
    connectivity: Connectivity,
    kind: ExtremumKind,
) -> RegionResult<Vec<(u32, u32)>> {
    let values = gray_values(pix)?;
    let width = pix.width();
    let (labels, count) = extrema_labels(&values, width, pix.height(), connectivity, kind);
    let mut points = Vec::with_capacity(count as usize);
    for (i, &l) in labels.iter().enumerate() {
        // labels first appear in increasing order
        if l as usize > points.len() {
            points.push(((i % width as usize) as u32, (i / width as usize) as u32));
        }
    }
    Ok(points)
}

/// Find one pixel per regional minimum.
///
/// Returns the first pixel (raster order) of every minimum plateau.
pub fn find_local_minima(pix: &Pix, connectivity: Connectivity) -> RegionResult<Vec<(u32, u32)>> {
    representatives(pix, connectivity, ExtremumKind::Minima)
}

/// Find one pixel per regional maximum.
///
/// Returns the first pixel (raster order) of every maximum plateau.
pub fn find_local_maxima(pix: &Pix, connectivity: Connectivity) -> RegionResult<Vec<(u32, u32)>> {
    representatives(pix, connectivity, ExtremumKind::Maxima)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, values: &[u32]) -> Pix {
        Pix::from_values(width, values.len() as u32 / width, PixelDepth::Bit8, values).unwrap()
    }

    #[test]
    fn test_minima_plateaus() {
        #[rustfmt::skip]
        let pix = gray(5, &[
            1, 1, 5, 9, 9,
            5, 5, 5, 9, 2,
            9, 9, 9, 9, 9,
        ]);
        let out = label_regional_extrema(&pix, &ExtremaOptions::new()).unwrap();
        assert_eq!(out.count, 2);
        assert_eq!(
            out.labels.values(),
            vec![1, 1, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_maxima_and_representatives() {
        #[rustfmt::skip]
        let pix = gray(4, &[
            0, 0, 0, 0,
            0, 7, 7, 0,
            0, 0, 0, 3,
        ]);
        let maxima = find_local_maxima(&pix, Connectivity::FourWay).unwrap();
        assert_eq!(maxima, vec![(1, 1), (3, 2)]);
        // 8-connected, the 3 touches a 7-plateau neighbor and is not a maximum
        let maxima = find_local_maxima(&pix, Connectivity::EightWay).unwrap();
        assert_eq!(maxima, vec![(1, 1)]);
        let minima = find_local_minima(&pix, Connectivity::EightWay).unwrap();
        assert_eq!(minima, vec![(0, 0)]);
    }

    #[test]
    fn test_uniform_image_is_one_extremum() {
        let pix = gray(3, &[4; 9]);
        let out = label_regional_extrema(
            &pix,
            &ExtremaOptions::new().with_kind(ExtremumKind::Maxima),
        )
        .unwrap();
        assert_eq!(out.count, 1);
        assert!(out.labels.values().iter().all(|&l| l == 1));
    }

    #[test]
    fn test_overflow_in_small_label_depth() {
        // 256 isolated minima along one row
        let values: Vec<u32> = (0..512).map(|i| if i % 2 == 0 { 0 } else { 9 }).collect();
        let pix = Pix::from_values(512, 1, PixelDepth::Bit8, &values).unwrap();
        let opts = ExtremaOptions::new().with_label_depth(PixelDepth::Bit8);
        assert!(matches!(
            label_regional_extrema(&pix, &opts),
            Err(crate::RegionError::LabelOverflow { count: 256, .. })
        ));
    }
}
