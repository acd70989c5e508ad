//! cellseg-morph - Component trees and attribute openings for cellseg
//!
//! This crate provides the max-tree based connected filters:
//!
//! - **Max-tree** - Construction of the component tree of a grey raster,
//!   with arena nodes addressed by `(level, index)` handles
//! - **Node attributes** - Area, bounding box, geodesic length, width and
//!   circularity, computed lazily and cached per node
//! - **Area opening / closing** - Removal of bright (dark) components below
//!   an area ceiling
//! - **Length opening** - Flattening of each leaf chain to its most circular
//!   component
//! - **Ultimate opening** - Per-pixel contrast of the most significant round
//!   component
//!
//! # Examples
//!
//! ```
//! use cellseg_core::{Connectivity, Pix, PixelDepth};
//! use cellseg_morph::{MaxTree, area_opening_tree};
//!
//! let pix = Pix::from_values(4, 1, PixelDepth::Bit8, &[2, 7, 2, 2]).unwrap();
//! let tree = MaxTree::build(&pix, Connectivity::EightWay).unwrap();
//! assert_eq!(tree.node_count(), 2);
//!
//! let opened = area_opening_tree(&tree, 1).unwrap();
//! assert_eq!(opened.values(), vec![2, 2, 2, 2]);
//! ```

pub mod error;
pub mod maxtree;
pub mod opening;

// Re-export core types
pub use cellseg_core;

pub use error::{MorphError, MorphResult};
pub use maxtree::{BasicInfo, GeodesicInfo, LevelRange, MaxTree, NodeId, SetMode, TreeNode};
pub use opening::{
    AreaOpeningOptions, LengthOpeningOptions, UltimateOpeningOptions, area_closing, area_opening,
    area_opening_tree, length_opening, length_opening_tree, ultimate_opening,
    ultimate_opening_tree,
};
