//! Max-tree (component tree) of a grey-level raster
//!
//! Every node of a [`MaxTree`] is a connected component of the threshold
//! set `{p : value(p) >= level}` that owns, directly, the pixels of exactly
//! `level`. Children sit at strictly higher levels than their parent, so a
//! node's full pixel set is its own pixels plus everything below it.
//!
//! Nodes live in an arena indexed by `(level - min_level, index)` and are
//! addressed through [`NodeId`]. Only each node's own pixels are stored;
//! full pixel sets are gathered on demand.
//!
//! # Attributes
//!
//! - Area is accumulated once, bottom-up, right after construction
//! - [`BasicInfo`] (area and bounding box) and [`GeodesicInfo`] are computed
//!   the first time they are asked for and cached on the node
//!
//! The tree remembers the [`Connectivity`] it was built with and measures
//! geodesic attributes with the same one.

mod build;
mod geodesic;
mod node;

pub use geodesic::GeodesicInfo;
pub use node::{BasicInfo, SetMode};

use crate::error::{MorphError, MorphResult};
use cellseg_core::{Connectivity, Pix, PixelDepth};

/// Grey-level histogram of a raster with its populated level bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRange {
    histogram: Vec<u64>,
    min: u32,
    max: u32,
}

impl LevelRange {
    /// Count the values of an 8 or 16 bpp raster.
    ///
    /// `min` and `max` are the lowest and highest levels with a non-zero
    /// count; both are 0 for an empty value list.
    pub(crate) fn from_values(values: &[u32], depth: PixelDepth) -> Self {
        let mut histogram = vec![0u64; depth.max_value() as usize + 1];
        for &v in values {
            histogram[v as usize] += 1;
        }
        let min = histogram.iter().position(|&c| c > 0).unwrap_or(0) as u32;
        let max = histogram.iter().rposition(|&c| c > 0).unwrap_or(0) as u32;
        Self {
            histogram,
            min,
            max,
        }
    }

    /// Lowest populated level
    pub fn min(&self) -> u32 {
        self.min
    }

    /// Highest populated level
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Number of levels between `min` and `max`, inclusive
    pub fn level_count(&self) -> usize {
        (self.max - self.min) as usize + 1
    }

    /// Pixels at `level`
    pub fn count(&self, level: u32) -> u64 {
        self.histogram.get(level as usize).copied().unwrap_or(0)
    }

    /// Per-level pixel counts over the whole depth range
    pub fn histogram(&self) -> &[u64] {
        &self.histogram
    }
}

/// Handle of a tree node: its grey level and its position among the nodes
/// of that level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    /// Grey level of the node
    pub level: u32,
    /// Index among the nodes of `level`, in closing order
    pub index: u32,
}

/// One connected component of the tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pixels: Vec<usize>,
    area: u64,
    info: Option<BasicInfo>,
    geodesic: Option<GeodesicInfo>,
}

impl TreeNode {
    fn new(id: NodeId, parent: Option<NodeId>, pixels: Vec<usize>) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            pixels,
            area: 0,
            info: None,
            geodesic: None,
        }
    }

    /// Handle of this node
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Grey level of this node
    pub fn level(&self) -> u32 {
        self.id.level
    }

    /// Enclosing node, `None` for a root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Nested nodes one step up, sorted by level then index
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Pixels owned directly, as flat indices `y * width + x`
    pub fn pixels(&self) -> &[usize] {
        &self.pixels
    }

    /// Pixels of this node and all of its descendants
    pub fn area(&self) -> u64 {
        self.area
    }

    /// Whether no node is nested in this one
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Component tree of an 8 or 16 bpp grey raster
#[derive(Debug, Clone)]
pub struct MaxTree {
    width: u32,
    height: u32,
    depth: PixelDepth,
    connectivity: Connectivity,
    range: LevelRange,
    nodes: Vec<Vec<TreeNode>>,
    values: Vec<u32>,
    labels: Vec<u32>,
}

impl MaxTree {
    /// Image width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth of the source raster
    pub fn depth(&self) -> PixelDepth {
        self.depth
    }

    /// Connectivity the tree was built with
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Histogram and populated bounds of the source raster
    pub fn level_range(&self) -> &LevelRange {
        &self.range
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(Vec::len).sum()
    }

    /// All nodes, by level then index.
    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter().flatten()
    }

    fn slot(&self, id: NodeId) -> Option<(usize, usize)> {
        let slot = id.level.checked_sub(self.range.min)? as usize;
        let index = id.index as usize;
        (self.nodes.get(slot)?.len() > index).then_some((slot, index))
    }

    /// Look up a node.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::UnknownNode`] if `id` is not in this tree.
    pub fn node(&self, id: NodeId) -> MorphResult<&TreeNode> {
        let (slot, index) = self.slot(id).ok_or(MorphError::UnknownNode {
            level: id.level,
            index: id.index,
        })?;
        Ok(&self.nodes[slot][index])
    }

    fn node_mut(&mut self, id: NodeId) -> MorphResult<&mut TreeNode> {
        let (slot, index) = self.slot(id).ok_or(MorphError::UnknownNode {
            level: id.level,
            index: id.index,
        })?;
        Ok(&mut self.nodes[slot][index])
    }

    /// Node owning pixel `(x, y)`, `None` off the image.
    pub fn node_of(&self, x: u32, y: u32) -> Option<NodeId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let p = (y * self.width + x) as usize;
        Some(NodeId {
            level: self.values[p],
            index: self.labels[p],
        })
    }

    /// Enclosing node of `id`.
    pub fn parent(&self, id: NodeId) -> MorphResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Nodes nested directly in `id`.
    pub fn children(&self, id: NodeId) -> MorphResult<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// Full area of `id`.
    pub fn area(&self, id: NodeId) -> MorphResult<u64> {
        Ok(self.node(id)?.area)
    }

    /// Nodes without children, by level then index.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes().filter(|n| n.is_leaf()).map(|n| n.id).collect()
    }

    /// Nodes without a parent.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|n| n.parent.is_none())
            .map(|n| n.id)
            .collect()
    }

    /// Rebuild the source raster from the tree.
    pub fn to_pix(&self) -> MorphResult<Pix> {
        Ok(Pix::from_values(
            self.width,
            self.height,
            self.depth,
            &self.values,
        )?)
    }
}
