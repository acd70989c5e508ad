//! Cost-ordered seeded region growing

use super::ContourPolicy;
use crate::cost::RegionCost;
use crate::error::{RegionError, RegionResult};
use crate::grid::{FloodState, gray_values};
use crate::label::{LabeledImage, check_label_capacity, labels_to_pix};
use crate::priority::{FloodOrder, PriorityQueue};
use cellseg_core::{Connectivity, Pix, PixelDepth};
use ordered_float::OrderedFloat;
use std::collections::HashMap;

/// Options for seeded region growing
#[derive(Debug, Clone)]
pub struct GrowOptions {
    /// Connectivity for finding neighbors
    pub connectivity: Connectivity,
    /// Treatment of pixels reached by two regions
    pub policy: ContourPolicy,
    /// Candidates costing more than this are never claimed
    pub max_cost: Option<f64>,
    /// Maximum growth distance, in pixels, from the seeds
    pub max_rounds: Option<u32>,
    /// Depth of the output label raster
    pub label_depth: PixelDepth,
}

impl Default for GrowOptions {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::EightWay,
            policy: ContourPolicy::KeepContours,
            max_cost: None,
            max_rounds: None,
            label_depth: PixelDepth::Bit32,
        }
    }
}

impl GrowOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connectivity type
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Set the contour policy
    pub fn with_policy(mut self, policy: ContourPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the cost ceiling
    pub fn with_max_cost(mut self, max_cost: f64) -> Self {
        self.max_cost = Some(max_cost);
        self
    }

    /// Set the maximum growth distance
    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Set the output label depth
    pub fn with_label_depth(mut self, depth: PixelDepth) -> Self {
        self.label_depth = depth;
        self
    }

    fn validate(&self) -> RegionResult<()> {
        if self.max_rounds == Some(0) {
            return Err(RegionError::InvalidParameters(
                "max_rounds must be positive".to_string(),
            ));
        }
        match self.max_cost {
            Some(c) if !(c.is_finite() && c >= 0.0) => Err(RegionError::InvalidParameters(format!(
                "max_cost must be finite and non-negative, got {}",
                c
            ))),
            _ => Ok(()),
        }
    }
}

struct Grower<'a, C> {
    values: &'a [u32],
    width: u32,
    height: u32,
    options: &'a GrowOptions,
    state: Vec<FloodState>,
    costs: HashMap<u32, C>,
    queue: PriorityQueue<OrderedFloat<f64>, (usize, u32, u32)>,
}

impl<C: RegionCost> Grower<'_, C> {
    /// Offer the unclaimed neighbors of `p` to region `label`.
    ///
    /// A pixel may hold offers from several regions; the cheapest pops first
    /// and later ones are dropped.
    fn spread(&mut self, p: usize, label: u32, round: u32) {
        if self.options.max_rounds.is_some_and(|max| round > max) {
            return;
        }
        let Some(cost) = self.costs.get(&label) else {
            return;
        };
        for q in self.options.connectivity.neighbor_indices(p, self.width, self.height) {
            if !matches!(self.state[q], FloodState::Unprocessed | FloodState::Queued) {
                continue;
            }
            let price = cost.cost(self.values[q]);
            if self.options.max_cost.is_some_and(|max| price > max) {
                continue;
            }
            self.state[q] = FloodState::Queued;
            self.queue.push(OrderedFloat(price), (q, label, round));
        }
    }

    fn run(mut self) -> Vec<FloodState> {
        let seeded: Vec<(usize, u32)> = self
            .state
            .iter()
            .enumerate()
            .filter_map(|(p, s)| s.label().map(|l| (p, l)))
            .collect();
        for &(p, label) in &seeded {
            self.spread(p, label, 1);
        }

        let mut contours = 0u64;
        while let Some((_, (p, origin, round))) = self.queue.pop() {
            if self.state[p] != FloodState::Queued {
                continue;
            }
            if self.options.policy == ContourPolicy::KeepContours {
                let mut first = None;
                let mut contested = false;
                for q in self.options.connectivity.neighbor_indices(p, self.width, self.height) {
                    if let Some(l) = self.state[q].label() {
                        match first {
                            None => first = Some(l),
                            Some(f) if f != l => contested = true,
                            _ => {}
                        }
                    }
                }
                if contested {
                    self.state[p] = FloodState::Watershed;
                    contours += 1;
                    continue;
                }
            }
            self.state[p] = FloodState::Label(origin);
            if let Some(cost) = self.costs.get_mut(&origin) {
                cost.accumulate(self.values[p]);
            }
            self.spread(p, origin, round + 1);
        }
        log::trace!(
            "grow_regions: {} pushes, {} contour pixels",
            self.queue.pushed(),
            contours
        );
        self.state
    }
}

/// Grow labeled seeds over a grey image in increasing cost order.
///
/// Each region owns a cost function built by `make_cost(label)`; it absorbs
/// the seed pixels and every pixel the region claims. Each region prices a
/// candidate when it first borders it; the cheapest offer wins and equal
/// costs are settled in the order they were offered.
///
/// # Arguments
///
/// * `pix` - Grey image (8 or 16 bpp) supplying the pixel values
/// * `seeds` - Seed label raster of the same size; 0 is unclaimed
/// * `options` - Connectivity, contour policy and growth limits
/// * `make_cost` - Builds the cost function of a region from its label
///
/// # Returns
///
/// A label raster with every seed label grown; unclaimed and contour pixels
/// are 0.
///
/// # Errors
///
/// Returns an error on mismatched sizes, non-grey input, an invalid
/// `max_cost`, a zero `max_rounds`, or seed labels beyond the label depth.
pub fn grow_regions<C, F>(
    pix: &Pix,
    seeds: &Pix,
    options: &GrowOptions,
    mut make_cost: F,
) -> RegionResult<LabeledImage>
where
    C: RegionCost,
    F: FnMut(u32) -> C,
{
    options.validate()?;
    pix.check_same_size(seeds)?;
    let values = gray_values(pix)?;
    let seed_labels = seeds.values();
    let largest = seed_labels.iter().copied().max().unwrap_or(0);
    check_label_capacity(largest as u64, options.label_depth)?;

    let mut state = vec![FloodState::Unprocessed; values.len()];
    let mut costs: HashMap<u32, C> = HashMap::new();
    for (p, &label) in seed_labels.iter().enumerate() {
        if label > 0 {
            state[p] = FloodState::Label(label);
            costs
                .entry(label)
                .or_insert_with(|| make_cost(label))
                .accumulate(values[p]);
        }
    }

    let (width, height) = (pix.width(), pix.height());
    let grower = Grower {
        values: &values,
        width,
        height,
        options,
        state,
        costs,
        queue: PriorityQueue::new(FloodOrder::Ascending),
    };
    let state = grower.run();
    let labels: Vec<u32> = state.iter().map(|s| s.output()).collect();
    let out = labels_to_pix(width, height, &labels, options.label_depth)?;
    log::debug!(
        "grow_regions: {}x{}, {:?}, {} regions",
        width,
        height,
        options.policy,
        out.count
    );
    Ok(out)
}
