//! Extinction values
//!
//! Flooding from every regional extremum, two lakes merge when their fronts
//! meet. The lake with the smaller attribute (area by default) dies there:
//! its extinction value is the flood level of the merge measured from its
//! own extremum. The larger lake absorbs it and carries on. The one lake that
//! never dies gets a value no smaller than any other, so ranking extrema by
//! extinction value puts the most persistent one first.

use crate::equivalence::Equivalence;
use crate::error::{RegionError, RegionResult};
use crate::extrema::{ExtremumKind, extrema_labels};
use crate::grid::gray_values;
use crate::priority::{FloodOrder, PriorityQueue};
use cellseg_core::{Box, Connectivity, Pix, PixelDepth};

/// Lake attribute deciding which lake dies on a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LakeAttribute {
    /// Number of flooded pixels
    #[default]
    Area,
    /// Flood level reached, measured from the lake's extremum (dynamics)
    Depth,
    /// Longer side of the lake's bounding box
    Diameter,
}

/// Options for extinction values
#[derive(Debug, Clone)]
pub struct ExtinctionOptions {
    /// Connectivity for finding neighbors
    pub connectivity: Connectivity,
    /// Ascending floods from the minima, descending from the maxima
    pub order: FloodOrder,
    /// Attribute compared when two lakes merge
    pub attribute: LakeAttribute,
}

impl Default for ExtinctionOptions {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::EightWay,
            order: FloodOrder::Ascending,
            attribute: LakeAttribute::Area,
        }
    }
}

impl ExtinctionOptions {
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

    /// Set the lake attribute
    pub fn with_attribute(mut self, attribute: LakeAttribute) -> Self {
        self.attribute = attribute;
        self
    }
}

/// Extinction value of every regional extremum
#[derive(Debug, Clone)]
pub struct Extinction {
    width: u32,
    height: u32,
    /// Extremum label per pixel (0 off the extrema)
    extrema: Vec<u32>,
    /// Value per extremum, index `label - 1`
    values: Vec<u32>,
    /// First pixel of each extremum, index `label - 1`
    seeds: Vec<(u32, u32)>,
}

impl Extinction {
    /// Number of extrema.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the image had no extrema (only for an empty raster).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Extinction values, index `label - 1`.
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Extinction value of extremum `label`.
    pub fn value(&self, label: u32) -> Option<u32> {
        label
            .checked_sub(1)
            .and_then(|i| self.values.get(i as usize).copied())
    }

    /// First pixel (raster order) of each extremum, index `label - 1`.
    pub fn seeds(&self) -> &[(u32, u32)] {
        &self.seeds
    }

    /// Extremum label at `(x, y)`, 0 off the extrema.
    pub fn extremum_at(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.extrema[(y * self.width + x) as usize])
    }

    /// Paint every extremum plateau with its extinction value.
    ///
    /// Values above the depth maximum saturate; pixels off the extrema are 0.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::UnsupportedDepth`] for depths below 8 bpp.
    pub fn render(&self, depth: PixelDepth) -> RegionResult<Pix> {
        if depth.bits() < 8 {
            return Err(RegionError::UnsupportedDepth {
                expected: "8, 16 or 32 bpp",
                actual: depth.bits(),
            });
        }
        let max = depth.max_value();
        let painted: Vec<u32> = self
            .extrema
            .iter()
            .map(|&l| match l {
                0 => 0,
                l => self.values[l as usize - 1].min(max),
            })
            .collect();
        Ok(Pix::from_values(self.width, self.height, depth, &painted)?)
    }
}

/// Running state of one lake, indexed by its root label
#[derive(Debug, Clone, Copy)]
struct Lake {
    level: u32,
    bounds: Box,
}

/// Per-call flooding context
struct Dynamics<'a> {
    values: &'a [u32],
    width: u32,
    height: u32,
    options: &'a ExtinctionOptions,
    eq: Equivalence,
    lakes: Vec<Lake>,
    extinction: Vec<Option<u32>>,
}

impl Dynamics<'_> {
    fn attribute(&mut self, root: u32, level: u32) -> u64 {
        let lake = self.lakes[root as usize];
        match self.options.attribute {
            LakeAttribute::Area => self.eq.area(root),
            LakeAttribute::Depth => self.options.order.rise(lake.level, level) as u64,
            LakeAttribute::Diameter => lake.bounds.max_side() as u64,
        }
    }

    /// Merge the lakes of roots `a` and `b` at `level`; returns the survivor.
    fn merge(&mut self, a: u32, b: u32, level: u32) -> u32 {
        let (aa, ab) = (self.attribute(a, level), self.attribute(b, level));
        let a_wins = aa > ab || (aa == ab && a < b);
        let (survivor, loser) = if a_wins { (a, b) } else { (b, a) };
        let dead = self.lakes[loser as usize];
        self.extinction[loser as usize] = Some(self.options.order.rise(dead.level, level));
        self.eq.union_into(survivor, loser);
        let merged = self.lakes[survivor as usize].bounds.union(&dead.bounds);
        self.lakes[survivor as usize].bounds = merged;
        survivor
    }

    fn grow(&mut self, root: u32, p: usize) {
        let x = (p % self.width as usize) as i32;
        let y = (p / self.width as usize) as i32;
        let point = Box::new_unchecked(x, y, 1, 1);
        let lake = &mut self.lakes[root as usize];
        lake.bounds = lake.bounds.union(&point);
        self.eq.add_area(root, 1);
    }

    fn run(mut self, extrema: &[u32], count: u32) -> Vec<u32> {
        let order = self.options.order;
        let n = self.values.len();
        let mut owner = vec![0u32; n];
        let mut queued = vec![false; n];
        let mut queue = PriorityQueue::new(order);

        for (p, &l) in extrema.iter().enumerate() {
            if l > 0 {
                owner[p] = l;
                queued[p] = true;
                self.lakes[l as usize].level = self.values[p];
                self.grow(l, p);
            }
        }
        for (p, &l) in extrema.iter().enumerate() {
            if l == 0 {
                continue;
            }
            for q in self.options.connectivity.neighbor_indices(p, self.width, self.height) {
                if !queued[q] {
                    queued[q] = true;
                    queue.push(order.clamp(self.values[p], self.values[q]), q);
                }
            }
        }

        while let Some((level, p)) = queue.pop() {
            let mut root = 0u32;
            for q in self.options.connectivity.neighbor_indices(p, self.width, self.height) {
                if owner[q] == 0 {
                    continue;
                }
                let r = self.eq.find(owner[q]);
                root = match root {
                    0 => r,
                    cur if cur == r => cur,
                    cur => self.merge(cur, r, level),
                };
            }
            owner[p] = root;
            self.grow(root, p);
            for q in self.options.connectivity.neighbor_indices(p, self.width, self.height) {
                if !queued[q] {
                    queued[q] = true;
                    queue.push(order.clamp(level, self.values[q]), q);
                }
            }
        }

        // Lakes never absorbed: at most one per connected grid
        let extreme = match order {
            FloodOrder::Ascending => self.values.iter().copied().max(),
            FloodOrder::Descending => self.values.iter().copied().min(),
        }
        .unwrap_or(0);
        let strongest = self.extinction.iter().flatten().copied().max().unwrap_or(0);
        (1..=count)
            .map(|l| match self.extinction[l as usize] {
                Some(v) => v,
                None => order
                    .rise(self.lakes[l as usize].level, extreme)
                    .max(strongest),
            })
            .collect()
    }
}

/// Compute the extinction value of every regional extremum.
///
/// # Arguments
///
/// * `pix` - Input image (8 or 16 bpp)
/// * `options` - Connectivity, flood order and lake attribute
///
/// # Returns
///
/// An [`Extinction`] holding one value per extremum; extrema are labeled
/// `1..=n` in raster order of their first pixel.
///
/// # Errors
///
/// Returns [`RegionError::UnsupportedDepth`] for non-grey input.
pub fn extinction_values(pix: &Pix, options: &ExtinctionOptions) -> RegionResult<Extinction> {
    let values = gray_values(pix)?;
    let (width, height) = (pix.width(), pix.height());
    let kind = ExtremumKind::for_order(options.order);
    let (extrema, count) = extrema_labels(&values, width, height, options.connectivity, kind);

    let mut seeds = vec![(0, 0); count as usize];
    let mut seen = 0usize;
    for (p, &l) in extrema.iter().enumerate() {
        if l as usize > seen {
            seen = l as usize;
            seeds[seen - 1] = ((p % width as usize) as u32, (p / width as usize) as u32);
        }
    }

    let dynamics = Dynamics {
        values: &values,
        width,
        height,
        options,
        eq: Equivalence::with_labels(count),
        lakes: vec![
            Lake {
                level: 0,
                bounds: Box::default(),
            };
            count as usize + 1
        ],
        extinction: vec![None; count as usize + 1],
    };
    let result = dynamics.run(&extrema, count);
    log::debug!(
        "extinction_values: {}x{}, {} extrema, attribute {:?}",
        width,
        height,
        count,
        options.attribute
    );
    Ok(Extinction {
        width,
        height,
        extrema,
        values: result,
        seeds,
    })
}
