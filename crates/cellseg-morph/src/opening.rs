//! Attribute openings on the max-tree
//!
//! Every filter walks from each leaf towards the root while the full area of
//! the current node stays within `max_area`, and rewrites some node of that
//! walk in the output raster:
//!
//! - **Area opening** flattens the largest node of the walk to its parent's
//!   level, removing bright components smaller than the ceiling
//! - **Length opening** flattens the most circular node of the walk to its
//!   own level
//! - **Ultimate opening** writes the grey-level contrast of qualifying nodes
//!   into a zeroed raster, keeping the largest contrast per pixel
//!
//! Leaves are visited by level then index, so results are deterministic.
//! The `*_tree` variants run on a prebuilt [`MaxTree`] and reuse its cached
//! attributes; the tree's own connectivity then applies.

use crate::error::{MorphError, MorphResult};
use crate::maxtree::{MaxTree, NodeId, SetMode};
use cellseg_core::{Connectivity, Pix, PixMut};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Options for area opening and closing
#[derive(Debug, Clone)]
pub struct AreaOpeningOptions {
    /// Connectivity of the components
    pub connectivity: Connectivity,
    /// Components of at most this many pixels are removed
    pub max_area: u64,
}

impl Default for AreaOpeningOptions {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::EightWay,
            max_area: 1,
        }
    }
}

impl AreaOpeningOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connectivity type
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Set the area ceiling
    pub fn with_max_area(mut self, max_area: u64) -> Self {
        self.max_area = max_area;
        self
    }

    fn validate(&self) -> MorphResult<()> {
        check_max_area(self.max_area)
    }
}

/// Options for length opening
#[derive(Debug, Clone)]
pub struct LengthOpeningOptions {
    /// Connectivity of the components
    pub connectivity: Connectivity,
    /// Walks stop at the first node larger than this
    pub max_area: u64,
    /// Width sampling interval passed to the geodesic measurement
    pub interval: u32,
}

impl Default for LengthOpeningOptions {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::EightWay,
            max_area: 1000,
            interval: 0,
        }
    }
}

impl LengthOpeningOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connectivity type
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Set the area ceiling
    pub fn with_max_area(mut self, max_area: u64) -> Self {
        self.max_area = max_area;
        self
    }

    /// Set the width sampling interval
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }
}

/// Options for the ultimate opening
#[derive(Debug, Clone)]
pub struct UltimateOpeningOptions {
    /// Connectivity of the components
    pub connectivity: Connectivity,
    /// Walks stop at the first node larger than this
    pub max_area: u64,
    /// Nodes with a circularity above this do not contribute
    pub max_circularity: f64,
    /// Width sampling interval passed to the geodesic measurement
    pub interval: u32,
    /// Commit only the largest jump between qualifying nodes of each walk
    pub single_output: bool,
}

impl Default for UltimateOpeningOptions {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::EightWay,
            max_area: 1000,
            max_circularity: 2.0,
            interval: 0,
            single_output: false,
        }
    }
}

impl UltimateOpeningOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connectivity type
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Set the area ceiling
    pub fn with_max_area(mut self, max_area: u64) -> Self {
        self.max_area = max_area;
        self
    }

    /// Set the circularity threshold
    pub fn with_max_circularity(mut self, max_circularity: f64) -> Self {
        self.max_circularity = max_circularity;
        self
    }

    /// Set the width sampling interval
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Keep only the largest jump per walk
    pub fn with_single_output(mut self, single_output: bool) -> Self {
        self.single_output = single_output;
        self
    }

    fn validate(&self) -> MorphResult<()> {
        check_max_area(self.max_area)?;
        if !(self.max_circularity.is_finite() && self.max_circularity >= 0.0) {
            return Err(MorphError::InvalidParameters(format!(
                "max_circularity must be finite and non-negative, got {}",
                self.max_circularity
            )));
        }
        Ok(())
    }
}

fn check_max_area(max_area: u64) -> MorphResult<()> {
    if max_area == 0 {
        return Err(MorphError::InvalidParameters(
            "max_area must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Grey-level drop from `id` to its parent, or its own level for a root.
fn contrast(tree: &MaxTree, id: NodeId) -> MorphResult<u32> {
    Ok(match tree.parent(id)? {
        Some(parent) => id.level - parent.level,
        None => id.level,
    })
}

/// Remove bright components of at most `max_area` pixels.
///
/// Each removed component takes the level of the first enclosing component
/// larger than the ceiling. A raster whose whole area is within the ceiling
/// is flattened to its lowest level.
///
/// # Arguments
///
/// * `pix` - 8 or 16 bpp grey raster
/// * `options` - Connectivity and area ceiling
///
/// # Errors
///
/// Returns an error for other depths or a zero `max_area`.
///
/// # Examples
///
/// ```
/// use cellseg_core::{Pix, PixelDepth};
/// use cellseg_morph::{AreaOpeningOptions, area_opening};
///
/// let pix = Pix::from_values(5, 1, PixelDepth::Bit8, &[1, 9, 1, 5, 5]).unwrap();
/// let opened = area_opening(&pix, &AreaOpeningOptions::new().with_max_area(1)).unwrap();
/// assert_eq!(opened.values(), vec![1, 1, 1, 5, 5]);
/// ```
pub fn area_opening(pix: &Pix, options: &AreaOpeningOptions) -> MorphResult<Pix> {
    options.validate()?;
    let tree = MaxTree::build(pix, options.connectivity)?;
    area_opening_tree(&tree, options.max_area)
}

/// Fill dark components of at most `max_area` pixels.
///
/// The dual of [`area_opening`], computed on the inverted raster.
pub fn area_closing(pix: &Pix, options: &AreaOpeningOptions) -> MorphResult<Pix> {
    options.validate()?;
    let inverted = pix.invert();
    let tree = MaxTree::build(&inverted, options.connectivity)?;
    Ok(area_opening_tree(&tree, options.max_area)?.invert())
}

/// [`area_opening`] on a prebuilt tree.
pub fn area_opening_tree(tree: &MaxTree, max_area: u64) -> MorphResult<Pix> {
    check_max_area(max_area)?;
    let mut out = tree.to_pix()?.to_mut();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut removed = 0u64;

    for leaf in tree.leaves() {
        let mut top = None;
        let mut current = Some(leaf);
        while let Some(id) = current {
            if tree.area(id)? > max_area {
                break;
            }
            if !visited.insert(id) {
                // The rest of this chain was handled from another leaf
                top = None;
                break;
            }
            top = Some(id);
            current = tree.parent(id)?;
        }
        if let Some(id) = top {
            let level = tree.parent(id)?.map_or(id.level, |p| p.level);
            removed += tree.set_value(id, &mut out, level, SetMode::Overwrite)?;
        }
    }

    log::debug!(
        "area_opening: {}x{}, max_area {}, {} pixels lowered",
        tree.width(),
        tree.height(),
        max_area,
        removed
    );
    Ok(out.into())
}

/// Flatten each leaf chain to its most circular component.
///
/// Along every walk, the node with the smallest circularity (ties go to the
/// node nearest the leaf) has its full pixel set rewritten to its own level.
/// A leaf larger than the ceiling changes nothing.
///
/// # Arguments
///
/// * `pix` - 8 or 16 bpp grey raster
/// * `options` - Connectivity, area ceiling and width sampling interval
pub fn length_opening(pix: &Pix, options: &LengthOpeningOptions) -> MorphResult<Pix> {
    check_max_area(options.max_area)?;
    let mut tree = MaxTree::build(pix, options.connectivity)?;
    length_opening_tree(&mut tree, options)
}

/// [`length_opening`] on a prebuilt tree.
///
/// Chains that share ancestors share their upper part: the best node above
/// each visited node is settled once and reused by every later chain. The
/// selected nodes are then written ancestors first, so a pixel takes the
/// level of the innermost selected node holding it whatever the leaf order.
pub fn length_opening_tree(tree: &mut MaxTree, options: &LengthOpeningOptions) -> MorphResult<Pix> {
    check_max_area(options.max_area)?;
    let mut out = tree.to_pix()?.to_mut();
    // Most circular node from a node up to the ceiling, None past it
    let mut settled: HashMap<NodeId, Option<(f64, NodeId)>> = HashMap::new();
    let mut selected: BTreeSet<NodeId> = BTreeSet::new();

    for leaf in tree.leaves() {
        let mut path = Vec::new();
        let mut above = None;
        let mut current = Some(leaf);
        while let Some(id) = current {
            if let Some(&best) = settled.get(&id) {
                above = best;
                break;
            }
            if tree.area(id)? > options.max_area {
                break;
            }
            path.push(id);
            current = tree.parent(id)?;
        }

        for &id in path.iter().rev() {
            let circularity = tree.circularity(id, options.interval)?;
            // Ties go to the node nearer the leaf
            if let Some(c) = circularity.filter(|&c| above.is_none_or(|(b, _)| c <= b)) {
                above = Some((c, id));
            }
            settled.insert(id, above);
        }
        if let Some((_, id)) = above {
            selected.insert(id);
        }
    }

    // NodeId orders by level, and every parent sits below its children
    for &id in &selected {
        tree.set_value(id, &mut out, id.level, SetMode::Overwrite)?;
    }

    log::debug!(
        "length_opening: {}x{}, max_area {}, {} nodes flattened",
        tree.width(),
        tree.height(),
        options.max_area,
        selected.len()
    );
    Ok(out.into())
}

/// Contrast map of the components whose circularity stays under a
/// threshold.
///
/// The output starts at zero. Each qualifying node of a walk writes its
/// contrast (its level minus its parent's level) over its full pixel set,
/// and every pixel keeps the largest contrast written to it. With
/// `single_output`, each walk commits only its largest jump: the level drop
/// from one qualifying node to the next, or to the parent for the last one.
///
/// # Arguments
///
/// * `pix` - 8 or 16 bpp grey raster
/// * `options` - Area ceiling, circularity threshold and output mode
///
/// # Returns
///
/// A raster of the input's size and depth holding contrasts.
pub fn ultimate_opening(pix: &Pix, options: &UltimateOpeningOptions) -> MorphResult<Pix> {
    options.validate()?;
    let mut tree = MaxTree::build(pix, options.connectivity)?;
    ultimate_opening_tree(&mut tree, options)
}

/// [`ultimate_opening`] on a prebuilt tree.
pub fn ultimate_opening_tree(
    tree: &mut MaxTree,
    options: &UltimateOpeningOptions,
) -> MorphResult<Pix> {
    options.validate()?;
    let mut out = PixMut::new(tree.width(), tree.height(), tree.depth())?;
    let mut written: HashSet<NodeId> = HashSet::new();

    for leaf in tree.leaves() {
        let mut qualifying = Vec::new();
        let mut current = Some(leaf);
        while let Some(id) = current {
            if tree.area(id)? > options.max_area {
                break;
            }
            let round_enough = tree
                .circularity(id, options.interval)?
                .is_some_and(|c| c <= options.max_circularity);
            if round_enough {
                qualifying.push(id);
            }
            current = tree.parent(id)?;
        }

        if options.single_output {
            let mut best: Option<(u32, NodeId)> = None;
            for (i, &id) in qualifying.iter().enumerate() {
                let jump = match qualifying.get(i + 1) {
                    Some(next) => id.level - next.level,
                    None => contrast(tree, id)?,
                };
                if best.is_none_or(|(b, _)| jump > b) {
                    best = Some((jump, id));
                }
            }
            if let Some((jump, id)) = best.filter(|&(jump, _)| jump > 0) {
                tree.set_value(id, &mut out, jump, SetMode::IfLess)?;
            }
        } else {
            for id in qualifying {
                if written.insert(id) {
                    let c = contrast(tree, id)?;
                    tree.set_value(id, &mut out, c, SetMode::IfLess)?;
                }
            }
        }
    }

    log::debug!(
        "ultimate_opening: {}x{}, max_area {}, max_circularity {}, single_output {}",
        tree.width(),
        tree.height(),
        options.max_area,
        options.max_circularity,
        options.single_output
    );
    Ok(out.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellseg_core::PixelDepth;

    fn blocks(width: u32, height: u32, bg: u32, blocks: &[(u32, u32, u32, u32, u32)]) -> Pix {
        let mut values = vec![bg; (width * height) as usize];
        for &(bx, by, bw, bh, v) in blocks {
            for y in by..by + bh {
                for x in bx..bx + bw {
                    values[(y * width + x) as usize] = v;
                }
            }
        }
        Pix::from_values(width, height, PixelDepth::Bit8, &values).unwrap()
    }

    #[test]
    fn test_area_opening_removes_noise_keeps_block() {
        let pix = blocks(10, 8, 10, &[(1, 1, 3, 3, 50), (7, 5, 1, 1, 80)]);
        let opts = AreaOpeningOptions::new().with_max_area(4);
        let out = area_opening(&pix, &opts).unwrap();
        assert_eq!(out.get_pixel(7, 5), Some(10));
        assert_eq!(out.get_pixel(2, 2), Some(50));
        assert_eq!(out.get_pixel(1, 1), Some(50));
        assert_eq!(out.get_pixel(0, 0), Some(10));
    }

    #[test]
    fn test_area_opening_nested_peak() {
        // A 1-pixel spike of 90 on a 3x3 plateau of 40: only the spike goes
        let pix = blocks(7, 7, 0, &[(2, 2, 3, 3, 40), (3, 3, 1, 1, 90)]);
        let out = area_opening(&pix, &AreaOpeningOptions::new().with_max_area(2)).unwrap();
        assert_eq!(out.get_pixel(3, 3), Some(40));
        assert_eq!(out.get_pixel(2, 2), Some(40));
        // A larger ceiling removes the plateau too
        let out = area_opening(&pix, &AreaOpeningOptions::new().with_max_area(9)).unwrap();
        assert!(out.values().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_area_closing_fills_hole() {
        let pix = blocks(5, 5, 200, &[(2, 2, 1, 1, 20)]);
        let out = area_closing(&pix, &AreaOpeningOptions::new().with_max_area(1)).unwrap();
        assert!(out.values().iter().all(|&v| v == 200));
    }

    #[test]
    fn test_zero_area_rejected() {
        let pix = blocks(3, 3, 0, &[]);
        let opts = AreaOpeningOptions::new().with_max_area(0);
        assert!(matches!(
            area_opening(&pix, &opts),
            Err(MorphError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_length_opening_flattens_to_round_ancestor() {
        // A thin bright line standing on a square pedestal
        let pix = blocks(12, 12, 0, &[(2, 2, 8, 8, 50), (3, 5, 6, 1, 120)]);
        let opts = LengthOpeningOptions::new().with_max_area(100);
        let out = length_opening(&pix, &opts).unwrap();
        assert_eq!(out.get_pixel(5, 5), Some(50));
        assert_eq!(out.get_pixel(2, 2), Some(50));
        assert_eq!(out.get_pixel(0, 0), Some(0));
    }

    #[test]
    fn test_length_opening_sibling_leaves_independent_of_order() {
        // A line and a dot side by side on one pedestal. The dot's grey
        // level decides whether its chain is walked before or after the
        // line's; the outcome must not change.
        for dot in [100, 200] {
            let pix = blocks(
                12,
                12,
                0,
                &[(2, 2, 8, 8, 50), (3, 5, 6, 1, 120), (7, 8, 1, 1, dot)],
            );
            let opts = LengthOpeningOptions::new().with_max_area(100);
            let out = length_opening(&pix, &opts).unwrap();
            assert_eq!(out.get_pixel(7, 8), Some(dot), "dot {dot}");
            assert_eq!(out.get_pixel(5, 5), Some(50), "dot {dot}");
            assert_eq!(out.get_pixel(2, 2), Some(50), "dot {dot}");
            assert_eq!(out.get_pixel(0, 0), Some(0), "dot {dot}");
        }
    }

    #[test]
    fn test_ultimate_opening_contrast() {
        let pix = blocks(12, 12, 10, &[(2, 2, 4, 4, 70), (8, 8, 2, 2, 30)]);
        let opts = UltimateOpeningOptions::new().with_max_area(50);
        let out = ultimate_opening(&pix, &opts).unwrap();
        assert_eq!(out.get_pixel(3, 3), Some(60));
        assert_eq!(out.get_pixel(8, 8), Some(20));
        assert_eq!(out.get_pixel(0, 0), Some(0));
    }

    #[test]
    fn test_ultimate_single_output_takes_largest_jump() {
        // 5x5 at 40, 3x3 at 100 inside it: jumps 60 (inner) and 40 (outer)
        let pix = blocks(9, 9, 0, &[(2, 2, 5, 5, 40), (3, 3, 3, 3, 100)]);
        let opts = UltimateOpeningOptions::new()
            .with_max_area(30)
            .with_single_output(true);
        let out = ultimate_opening(&pix, &opts).unwrap();
        assert_eq!(out.get_pixel(4, 4), Some(60));
        assert_eq!(out.get_pixel(2, 2), Some(0));

        let all = ultimate_opening(&pix, &opts.clone().with_single_output(false)).unwrap();
        assert_eq!(all.get_pixel(4, 4), Some(60));
        assert_eq!(all.get_pixel(2, 2), Some(40));
    }

    #[test]
    fn test_invalid_circularity_rejected() {
        let pix = blocks(3, 3, 0, &[]);
        let opts = UltimateOpeningOptions::new().with_max_circularity(f64::NAN);
        assert!(ultimate_opening(&pix, &opts).is_err());
    }
}
