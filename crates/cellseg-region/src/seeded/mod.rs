//! Seeded region growing, expansion and shrinking
//!
//! All three start from a label raster of seeds (0 = unclaimed) and move
//! region borders one pixel at a time:
//!
//! - [`grow_regions`] claims pixels in increasing cost order, pricing each
//!   candidate with the [`RegionCost`](crate::RegionCost) of the region that
//!   reaches it.
//! - [`expand_regions`] claims pixels in synchronous rounds alternating 4-
//!   and 8-connectivity, with no cost at all.
//! - [`shrink_regions`] peels boundary pixels while a validity predicate
//!   holds for the region.

mod expand;
mod grow;
mod shrink;

pub use expand::{ExpandOptions, expand_regions};
pub use grow::{GrowOptions, grow_regions};
pub use shrink::{ShrinkOptions, shrink_regions, shrink_regions_with};

/// What happens to a pixel reached by two different regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContourPolicy {
    /// The pixel becomes permanent background, leaving a contour between
    /// the regions
    #[default]
    KeepContours,
    /// The pixel joins the region that reached it first
    CompleteGrow,
}
