//! cellseg - Max-tree filtering and flooding-based segmentation
//!
//! The segmentation core of a cell-image toolkit, over a 2-D raster with
//! fixed 4-, 6- (hexagonal) or 8-connectivity.
//!
//! # Overview
//!
//! - Component trees and attribute openings (area, length, ultimate) in
//!   [`morph`]
//! - Priority-queue flooding in [`region`]: regional extrema, grey-scale
//!   reconstruction, watershed, extinction values, seeded region growing,
//!   expansion and shrinking
//!
//! # Example
//!
//! ```
//! use cellseg::morph::{AreaOpeningOptions, area_opening};
//! use cellseg::region::{WatershedOptions, watershed};
//! use cellseg::{Pix, PixelDepth};
//!
//! // Two cells on a dark background, one with a speck of noise
//! #[rustfmt::skip]
//! let values = [
//!     0,  0,  0,  0,  0,  0,  0,
//!     0, 90, 90,  0, 90, 90,  0,
//!     0, 90, 90,  0, 90, 99,  0,
//!     0,  0,  0,  0,  0,  0,  0,
//! ];
//! let pix = Pix::from_values(7, 4, PixelDepth::Bit8, &values).unwrap();
//!
//! let clean = area_opening(&pix, &AreaOpeningOptions::new().with_max_area(1)).unwrap();
//! assert_eq!(clean.get_pixel(5, 2), Some(90));
//!
//! let cells = watershed(&clean, &WatershedOptions::new().with_order(
//!     cellseg::region::FloodOrder::Descending,
//! )).unwrap();
//! assert_eq!(cells.count, 2);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use cellseg_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use cellseg_morph as morph;
pub use cellseg_region as region;
