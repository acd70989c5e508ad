//! Round-based region expansion

use super::ContourPolicy;
use crate::error::{RegionError, RegionResult};
use crate::grid::FloodState;
use crate::label::{LabeledImage, check_label_capacity, labels_to_pix};
use cellseg_core::{Connectivity, Pix, PixelDepth};

/// Options for region expansion
#[derive(Debug, Clone)]
pub struct ExpandOptions {
    /// Number of expansion rounds; odd rounds use 4-, even rounds
    /// 8-connectivity
    pub expansion_rounds: u32,
    /// Rounds of buffer carving between distinct regions afterwards
    pub sep_expand_rounds: u32,
    /// Treatment of pixels claimed by two regions in the same round
    pub policy: ContourPolicy,
    /// Depth of the output label raster
    pub label_depth: PixelDepth,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            expansion_rounds: 1,
            sep_expand_rounds: 0,
            policy: ContourPolicy::KeepContours,
            label_depth: PixelDepth::Bit32,
        }
    }
}

impl ExpandOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of expansion rounds
    pub fn with_expansion_rounds(mut self, rounds: u32) -> Self {
        self.expansion_rounds = rounds;
        self
    }

    /// Set the number of separation rounds
    pub fn with_sep_expand_rounds(mut self, rounds: u32) -> Self {
        self.sep_expand_rounds = rounds;
        self
    }

    /// Set the contour policy
    pub fn with_policy(mut self, policy: ContourPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the output label depth
    pub fn with_label_depth(mut self, depth: PixelDepth) -> Self {
        self.label_depth = depth;
        self
    }
}

fn round_connectivity(round: u32) -> Connectivity {
    if round % 2 == 1 {
        Connectivity::FourWay
    } else {
        Connectivity::EightWay
    }
}

/// Expand labeled seeds by a fixed number of rounds.
///
/// Every round claims, all at once, each unclaimed pixel that borders a
/// region. A pixel bordering two regions in the same round becomes a contour
/// under [`ContourPolicy::KeepContours`]; under
/// [`ContourPolicy::CompleteGrow`] it joins the first region found in
/// neighbor order. Growth stops after `expansion_rounds` even if unclaimed
/// pixels remain.
///
/// With `sep_expand_rounds > 0`, each further round returns to background
/// every claimed pixel that touches a different region, a contour or an
/// already carved pixel, widening the gap between regions. Seed pixels are
/// never carved.
///
/// # Arguments
///
/// * `seeds` - Seed label raster (any depth); 0 is unclaimed
/// * `mask` - Optional raster of the same size; pixels where it is 0 are
///   never claimed
/// * `options` - Round counts, contour policy and label depth
///
/// # Errors
///
/// Returns [`RegionError::InvalidParameters`] when `expansion_rounds` is 0,
/// and an error on a mismatched mask or seed labels beyond the label depth.
pub fn expand_regions(
    seeds: &Pix,
    mask: Option<&Pix>,
    options: &ExpandOptions,
) -> RegionResult<LabeledImage> {
    if options.expansion_rounds == 0 {
        return Err(RegionError::InvalidParameters(
            "expansion_rounds must be positive".to_string(),
        ));
    }
    let allowed: Option<Vec<bool>> = match mask {
        Some(m) => {
            seeds.check_same_size(m)?;
            Some(m.values().into_iter().map(|v| v != 0).collect())
        }
        None => None,
    };
    let seed_labels = seeds.values();
    let largest = seed_labels.iter().copied().max().unwrap_or(0);
    check_label_capacity(largest as u64, options.label_depth)?;

    let (width, height) = (seeds.width(), seeds.height());
    let mut state: Vec<FloodState> = seed_labels
        .iter()
        .map(|&l| {
            if l > 0 {
                FloodState::Label(l)
            } else {
                FloodState::Unprocessed
            }
        })
        .collect();
    let is_seed: Vec<bool> = seed_labels.iter().map(|&l| l > 0).collect();

    let mut rounds_run = 0;
    let mut changes = Vec::new();
    for round in 1..=options.expansion_rounds {
        let connectivity = round_connectivity(round);
        changes.clear();
        for p in 0..state.len() {
            if state[p] != FloodState::Unprocessed
                || allowed.as_ref().is_some_and(|a| !a[p])
            {
                continue;
            }
            let mut first = None;
            let mut contested = false;
            for q in connectivity.neighbor_indices(p, width, height) {
                if let Some(l) = state[q].label() {
                    match first {
                        None => first = Some(l),
                        Some(f) if f != l => contested = true,
                        _ => {}
                    }
                }
            }
            match first {
                Some(_) if contested && options.policy == ContourPolicy::KeepContours => {
                    changes.push((p, FloodState::Watershed));
                }
                Some(l) => changes.push((p, FloodState::Label(l))),
                None => {}
            }
        }
        if changes.is_empty() {
            break;
        }
        for &(p, s) in &changes {
            state[p] = s;
        }
        rounds_run = round;
    }

    let mut carved = 0usize;
    for _ in 0..options.sep_expand_rounds {
        changes.clear();
        for p in 0..state.len() {
            let Some(own) = state[p].label() else {
                continue;
            };
            if is_seed[p] {
                continue;
            }
            let touches_other = Connectivity::EightWay.neighbor_indices(p, width, height).any(|q| {
                match state[q] {
                    FloodState::Label(l) => l != own,
                    FloodState::Watershed => true,
                    _ => false,
                }
            });
            if touches_other {
                changes.push((p, FloodState::Watershed));
            }
        }
        if changes.is_empty() {
            break;
        }
        carved += changes.len();
        for &(p, s) in &changes {
            state[p] = s;
        }
    }

    let labels: Vec<u32> = state.iter().map(|s| s.output()).collect();
    let out = labels_to_pix(width, height, &labels, options.label_depth)?;
    log::debug!(
        "expand_regions: {}x{}, {} rounds run, {} pixels carved",
        width,
        height,
        rounds_run,
        carved
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(width: u32, values: &[u32]) -> Pix {
        Pix::from_values(width, values.len() as u32 / width, PixelDepth::Bit32, values).unwrap()
    }

    #[test]
    fn test_rounds_alternate_connectivity() {
        let mut values = vec![0; 25];
        values[12] = 1;
        let seeds = labels(5, &values);

        // round 1 is 4-connected: a plus sign
        let out = expand_regions(&seeds, None, &ExpandOptions::new()).unwrap();
        #[rustfmt::skip]
        let plus = vec![
            0, 0, 0, 0, 0,
            0, 0, 1, 0, 0,
            0, 1, 1, 1, 0,
            0, 0, 1, 0, 0,
            0, 0, 0, 0, 0,
        ];
        assert_eq!(out.labels.values(), plus);

        // round 2 is 8-connected and reaches all but the corners
        let opts = ExpandOptions::new().with_expansion_rounds(2);
        let out = expand_regions(&seeds, None, &opts).unwrap();
        let values = out.labels.values();
        assert_eq!(values.iter().filter(|&&l| l == 0).count(), 4);
        assert_eq!((values[0], values[4], values[20], values[24]), (0, 0, 0, 0));

        let opts = ExpandOptions::new().with_expansion_rounds(3);
        let out = expand_regions(&seeds, None, &opts).unwrap();
        assert!(out.labels.values().iter().all(|&l| l == 1));
    }

    #[test]
    fn test_contours_between_regions() {
        let seeds = labels(5, &[1, 0, 0, 0, 2]);
        let opts = ExpandOptions::new().with_expansion_rounds(10);
        let out = expand_regions(&seeds, None, &opts).unwrap();
        assert_eq!(out.labels.values(), vec![1, 1, 0, 2, 2]);

        let opts = opts.with_policy(ContourPolicy::CompleteGrow);
        let out = expand_regions(&seeds, None, &opts).unwrap();
        assert_eq!(out.labels.values(), vec![1, 1, 1, 2, 2]);
    }

    #[test]
    fn test_mask_blocks_growth() {
        let seeds = labels(4, &[1, 0, 0, 0]);
        let mask = Pix::from_values(4, 1, PixelDepth::Bit8, &[1, 1, 0, 1]).unwrap();
        let opts = ExpandOptions::new().with_expansion_rounds(5);
        let out = expand_regions(&seeds, Some(&mask), &opts).unwrap();
        assert_eq!(out.labels.values(), vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_separation_widens_gap() {
        let seeds = labels(9, &[1, 0, 0, 0, 0, 0, 0, 0, 2]);
        let opts = ExpandOptions::new()
            .with_expansion_rounds(10)
            .with_policy(ContourPolicy::CompleteGrow)
            .with_sep_expand_rounds(1);
        let out = expand_regions(&seeds, None, &opts).unwrap();
        // grown to [1 1 1 1 1 2 2 2 2], then the touching pair is carved
        assert_eq!(out.labels.values(), vec![1, 1, 1, 1, 0, 0, 2, 2, 2]);

        let opts = opts.with_sep_expand_rounds(2);
        let out = expand_regions(&seeds, None, &opts).unwrap();
        assert_eq!(out.labels.values(), vec![1, 1, 1, 0, 0, 0, 0, 2, 2]);
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let seeds = labels(3, &[1, 0, 0]);
        let opts = ExpandOptions::new().with_expansion_rounds(0);
        assert!(matches!(
            expand_regions(&seeds, None, &opts),
            Err(RegionError::InvalidParameters(_))
        ));
        // No separation is a valid choice
        let opts = ExpandOptions::new().with_sep_expand_rounds(0);
        assert!(expand_regions(&seeds, None, &opts).is_ok());
    }
}
