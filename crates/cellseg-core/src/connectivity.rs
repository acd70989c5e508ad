//! Neighbor topology
//!
//! Fixed neighbor offset sets for 4-, 6- and 8-connectivity. The 6-connected
//! hexagonal grid stores odd rows shifted half a pixel to the right, so its
//! offsets alternate with the parity of the row being visited.
//!
//! The same [`Connectivity`] must be used for building a structure (a tree,
//! a label image) and for measuring it afterwards; mixing them measures
//! attributes over an adjacency the structure was not built with.

use crate::error::{Error, Result};

const OFFSETS_4: [(i32, i32); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

const OFFSETS_8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

// Even rows sit half a pixel left of their odd neighbors.
const OFFSETS_6_EVEN: [(i32, i32); 6] = [(-1, -1), (0, -1), (-1, 0), (1, 0), (-1, 1), (0, 1)];

const OFFSETS_6_ODD: [(i32, i32); 6] = [(0, -1), (1, -1), (-1, 0), (1, 0), (0, 1), (1, 1)];

/// Pixel-grid connectivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Connectivity {
    /// 4-way connectivity (up, down, left, right)
    FourWay,
    /// 6-way hexagonal connectivity
    SixWay,
    /// 8-way connectivity (includes diagonals)
    #[default]
    EightWay,
}

impl Connectivity {
    /// Select a connectivity by neighbor count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for anything other than 4, 6 or 8.
    pub fn from_count(count: u32) -> Result<Self> {
        match count {
            4 => Ok(Connectivity::FourWay),
            6 => Ok(Connectivity::SixWay),
            8 => Ok(Connectivity::EightWay),
            _ => Err(Error::InvalidParameter(format!(
                "connectivity must be 4, 6 or 8, got {}",
                count
            ))),
        }
    }

    /// Number of neighbors per pixel.
    pub fn count(self) -> u32 {
        match self {
            Connectivity::FourWay => 4,
            Connectivity::SixWay => 6,
            Connectivity::EightWay => 8,
        }
    }

    /// Ordered neighbor offsets for a pixel on row `y`.
    ///
    /// Only [`Connectivity::SixWay`] depends on `y`.
    #[inline]
    pub fn offsets(self, y: i32) -> &'static [(i32, i32)] {
        match self {
            Connectivity::FourWay => &OFFSETS_4,
            Connectivity::EightWay => &OFFSETS_8,
            Connectivity::SixWay => {
                if y & 1 == 0 {
                    &OFFSETS_6_EVEN
                } else {
                    &OFFSETS_6_ODD
                }
            }
        }
    }

    /// Iterate over the in-grid neighbors of `(x, y)`.
    pub fn neighbors(self, x: u32, y: u32, width: u32, height: u32) -> Neighbors {
        Neighbors {
            offsets: self.offsets(y as i32),
            pos: 0,
            x: x as i32,
            y: y as i32,
            width,
            height,
        }
    }

    /// Iterate over the in-grid neighbors of a flat index `y * width + x`,
    /// yielding flat indices.
    pub fn neighbor_indices(self, index: usize, width: u32, height: u32) -> NeighborIndices {
        let x = (index % width as usize) as u32;
        let y = (index / width as usize) as u32;
        NeighborIndices {
            inner: self.neighbors(x, y, width, height),
        }
    }
}

/// Test whether `(x, y)` lies off a `width` × `height` grid.
#[inline]
pub fn is_outside(x: i32, y: i32, width: u32, height: u32) -> bool {
    x < 0 || y < 0 || x >= width as i32 || y >= height as i32
}

/// Iterator over in-grid neighbor coordinates.
#[derive(Debug, Clone)]
pub struct Neighbors {
    offsets: &'static [(i32, i32)],
    pos: usize,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl Iterator for Neighbors {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&(dx, dy)) = self.offsets.get(self.pos) {
            self.pos += 1;
            let nx = self.x + dx;
            let ny = self.y + dy;
            if !is_outside(nx, ny, self.width, self.height) {
                return Some((nx as u32, ny as u32));
            }
        }
        None
    }
}

/// Iterator over in-grid neighbor flat indices.
#[derive(Debug, Clone)]
pub struct NeighborIndices {
    inner: Neighbors,
}

impl Iterator for NeighborIndices {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let width = self.inner.width as usize;
        self.inner
            .next()
            .map(|(x, y)| y as usize * width + x as usize)
    }
}
