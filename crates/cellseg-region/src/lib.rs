//! cellseg-region - Flooding and region growing for cellseg
//!
//! This crate provides the priority-queue flooding algorithms:
//!
//! - **Priority ordering** - An insertion-stable priority queue shared by
//!   every flood
//! - **Regional extrema** - Labeling of minimum / maximum plateaus
//! - **Reconstruction** - Grey-scale reconstruction by dilation
//!   ([`underbuild`]) and erosion ([`overbuild`])
//! - **Watershed** - Flooding from extrema or from caller markers, with or
//!   without watershed lines
//! - **Extinction values** - Persistence of every extremum during flooding
//! - **Seeded regions** - Cost-ordered growing, round-based expansion and
//!   boundary shrinking
//! - **Label statistics** - Per-region bounds, centroid and area
//!
//! # Examples
//!
//! ## Watershed segmentation
//!
//! ```
//! use cellseg_core::{Pix, PixelDepth};
//! use cellseg_region::{WatershedOptions, watershed};
//!
//! let pix = Pix::from_values(5, 1, PixelDepth::Bit8, &[0, 1, 9, 1, 0]).unwrap();
//! let basins = watershed(&pix, &WatershedOptions::default()).unwrap();
//! assert_eq!(basins.count, 2);
//! assert_eq!(basins.labels.values(), vec![1, 1, 0, 2, 2]);
//! ```
//!
//! ## Seeded growing
//!
//! ```
//! use cellseg_core::{Pix, PixelDepth};
//! use cellseg_region::{ContourPolicy, GrowOptions, MeanDifference, grow_regions};
//!
//! let pix = Pix::from_values(4, 1, PixelDepth::Bit8, &[10, 11, 80, 82]).unwrap();
//! let seeds = Pix::from_values(4, 1, PixelDepth::Bit32, &[1, 0, 0, 2]).unwrap();
//! let opts = GrowOptions::new().with_policy(ContourPolicy::CompleteGrow);
//! let out = grow_regions(&pix, &seeds, &opts, |_| MeanDifference::new()).unwrap();
//! assert_eq!(out.labels.values(), vec![1, 1, 2, 2]);
//! ```

pub mod cost;
pub mod dynamics;
pub mod equivalence;
pub mod error;
pub mod extrema;
mod grid;
pub mod label;
pub mod priority;
pub mod reconstruct;
pub mod seeded;
pub mod watershed;

// Re-export core types
pub use cellseg_core;

// Re-export error types
pub use error::{RegionError, RegionResult};

pub use cost::{MeanDifference, RegionCost, UniformCost, ValueCost};
pub use dynamics::{Extinction, ExtinctionOptions, LakeAttribute, extinction_values};
pub use equivalence::Equivalence;
pub use extrema::{
    ExtremaOptions, ExtremumKind, find_local_maxima, find_local_minima, label_regional_extrema,
};
pub use label::{LabeledImage, RegionStats, count_labels, region_stats, relabel_sequential};
pub use priority::{FloodOrder, PriorityQueue};
pub use reconstruct::{overbuild, underbuild};
pub use seeded::{
    ContourPolicy, ExpandOptions, GrowOptions, ShrinkOptions, expand_regions, grow_regions,
    shrink_regions, shrink_regions_with,
};
pub use watershed::{WatershedOptions, constrained_watershed, watershed};
