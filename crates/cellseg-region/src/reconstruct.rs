//! Grey-scale morphological reconstruction
//!
//! `underbuild` is reconstruction by dilation: the seed is propagated through
//! its neighbors, never rising above the mask. `overbuild` is the dual,
//! reconstruction by erosion. Both run as a single priority-queue flood: a
//! pixel is pushed whenever its value changes and each pop only spreads the
//! popped front value, so every pixel settles at its final value once its
//! front reaches it.

use crate::error::{RegionError, RegionResult};
use crate::grid::gray_values;
use crate::priority::{FloodOrder, PriorityQueue};
use cellseg_core::{Connectivity, Pix};

fn check_pair(seed: &Pix, mask: &Pix) -> RegionResult<(Vec<u32>, Vec<u32>)> {
    seed.check_same_size(mask)?;
    if seed.depth() != mask.depth() {
        return Err(RegionError::InvalidParameters(format!(
            "seed is {} bpp but mask is {} bpp",
            seed.depth().bits(),
            mask.depth().bits()
        )));
    }
    Ok((gray_values(seed)?, gray_values(mask)?))
}

fn rebuild(
    seed: &Pix,
    mask: &Pix,
    connectivity: Connectivity,
    order: FloodOrder,
) -> RegionResult<Pix> {
    let (seed_values, mask_values) = check_pair(seed, mask)?;
    let (width, height) = (seed.width(), seed.height());

    // Start from the seed clipped by the mask; the flood can only push
    // values further toward the mask.
    let mut out: Vec<u32> = seed_values
        .iter()
        .zip(&mask_values)
        .map(|(&s, &m)| order.clamp(s, m))
        .collect();

    let mut queue = PriorityQueue::with_capacity(order, out.len());
    for (p, &v) in out.iter().enumerate() {
        queue.push(v, p);
    }

    let mut updates = 0u64;
    while let Some((front, p)) = queue.pop() {
        if front != out[p] {
            // superseded by a later push
            continue;
        }
        for q in connectivity.neighbor_indices(p, width, height) {
            let candidate = order.clamp(front, mask_values[q]);
            if order.precedes(candidate, out[q]) {
                out[q] = candidate;
                queue.push(candidate, q);
                updates += 1;
            }
        }
    }

    log::debug!(
        "reconstruction {:?}: {}x{}, {} updates, {} pushes",
        order,
        width,
        height,
        updates,
        queue.pushed()
    );
    Ok(Pix::from_values(width, height, seed.depth(), &out)?)
}

/// Reconstruct `seed` by dilation under `mask`.
///
/// The result is the largest image not above `mask` whose regional maxima
/// are marked by `seed`: every pixel takes the highest value it can reach
/// from the seed along a path that never exceeds the mask. With
/// `seed <= mask` the result lies between them and the operation is
/// idempotent.
///
/// # Arguments
///
/// * `seed` - Marker image (8 or 16 bpp)
/// * `mask` - Ceiling image, same size and depth
/// * `connectivity` - Neighbor topology
///
/// # Errors
///
/// Returns an error on mismatched sizes or depths, or non-grey input.
pub fn underbuild(seed: &Pix, mask: &Pix, connectivity: Connectivity) -> RegionResult<Pix> {
    rebuild(seed, mask, connectivity, FloodOrder::Descending)
}

/// Reconstruct `seed` by erosion over `mask`.
///
/// The dual of [`underbuild`]: every pixel takes the lowest value it can
/// reach from the seed along a path that never drops below the mask.
///
/// # Errors
///
/// Returns an error on mismatched sizes or depths, or non-grey input.
pub fn overbuild(seed: &Pix, mask: &Pix, connectivity: Connectivity) -> RegionResult<Pix> {
    rebuild(seed, mask, connectivity, FloodOrder::Ascending)
}
