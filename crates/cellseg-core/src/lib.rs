//! cellseg-core - Basic data structures for cell segmentation
//!
//! This crate provides the data structures shared by the flooding and
//! tree-filtering crates:
//!
//! - [`Pix`] / [`PixMut`] - The raster container (immutable / mutable)
//! - [`PixelDepth`] - Bits per pixel of a raster
//! - [`Box`] - Rectangle regions
//! - [`Connectivity`] - 4-, 6- and 8-connected neighbor topology

pub mod box_;
pub mod connectivity;
pub mod error;
pub mod pix;

pub use box_::Box;
pub use connectivity::{Connectivity, NeighborIndices, Neighbors, is_outside};
pub use error::{Error, Result};
pub use pix::{Pix, PixMut, PixelDepth};
