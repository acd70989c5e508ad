//! Full pixel sets, bounding boxes and raster rewriting for tree nodes

use super::{MaxTree, NodeId};
use crate::error::{MorphError, MorphResult};
use cellseg_core::{Box, Error, PixMut};

/// Area and bounding box of a node's full pixel set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicInfo {
    /// Pixel count
    pub area: u64,
    /// Bounding box
    pub bounds: Box,
}

/// Condition under which [`MaxTree::set_value`] rewrites a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetMode {
    /// Always write
    Overwrite,
    /// Write only where the raster currently holds the given value
    IfEqual(u32),
    /// Write only where the raster currently holds less than the new value
    IfLess,
}

impl SetMode {
    #[inline]
    fn accepts(self, current: u32, value: u32) -> bool {
        match self {
            SetMode::Overwrite => true,
            SetMode::IfEqual(old) => current == old,
            SetMode::IfLess => current < value,
        }
    }
}

impl MaxTree {
    /// Append the flat indices of `id` and all its descendants to `out`.
    pub(crate) fn gather(&self, id: NodeId, out: &mut Vec<usize>) -> MorphResult<()> {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let node = self.node(next)?;
            out.extend_from_slice(&node.pixels);
            stack.extend_from_slice(&node.children);
        }
        Ok(())
    }

    /// Coordinates of every pixel in the full pixel set of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::UnknownNode`] if `id` is not in this tree.
    pub fn full_pixels(&self, id: NodeId) -> MorphResult<Vec<(u32, u32)>> {
        let mut pixels = Vec::with_capacity(self.area(id)? as usize);
        self.gather(id, &mut pixels)?;
        let width = self.width as usize;
        Ok(pixels
            .into_iter()
            .map(|p| ((p % width) as u32, (p / width) as u32))
            .collect())
    }

    /// Area and bounding box of `id`, gathered once and cached.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::UnknownNode`] if `id` is not in this tree.
    pub fn basic_info(&mut self, id: NodeId) -> MorphResult<BasicInfo> {
        if let Some(info) = self.node(id)?.info {
            return Ok(info);
        }
        let mut pixels = Vec::new();
        self.gather(id, &mut pixels)?;
        let width = self.width as usize;
        let (mut xmin, mut ymin) = (usize::MAX, usize::MAX);
        let (mut xmax, mut ymax) = (0, 0);
        for &p in &pixels {
            let (x, y) = (p % width, p / width);
            xmin = xmin.min(x);
            xmax = xmax.max(x);
            ymin = ymin.min(y);
            ymax = ymax.max(y);
        }
        let bounds = if pixels.is_empty() {
            Box::default()
        } else {
            Box::from_extent(xmin as i32, xmax as i32, ymin as i32, ymax as i32)
        };
        let info = BasicInfo {
            area: pixels.len() as u64,
            bounds,
        };
        self.node_mut(id)?.info = Some(info);
        Ok(info)
    }

    /// Rewrite the full pixel set of `id` in `out` with `value`.
    ///
    /// # Arguments
    ///
    /// * `id` - Node whose pixels, descendants included, are rewritten
    /// * `out` - Raster of the tree's size
    /// * `value` - New pixel value
    /// * `mode` - Per-pixel write condition
    ///
    /// # Returns
    ///
    /// The number of pixels written.
    ///
    /// # Errors
    ///
    /// Returns an error if `out` does not match the tree's size, if `value`
    /// does not fit the depth of `out`, or if `id` is not in this tree.
    pub fn set_value(
        &self,
        id: NodeId,
        out: &mut PixMut,
        value: u32,
        mode: SetMode,
    ) -> MorphResult<u64> {
        if out.width() != self.width || out.height() != self.height {
            return Err(Error::IncompatibleSizes(
                self.width,
                self.height,
                out.width(),
                out.height(),
            )
            .into());
        }
        let max = out.depth().max_value();
        if value > max {
            return Err(MorphError::InvalidParameters(format!(
                "value {} exceeds the {} bpp maximum {}",
                value,
                out.depth().bits(),
                max
            )));
        }

        let mut pixels = Vec::new();
        self.gather(id, &mut pixels)?;
        let width = self.width as usize;
        let mut written = 0;
        for p in pixels {
            let (x, y) = ((p % width) as u32, (p / width) as u32);
            if mode.accepts(out.get_pixel_unchecked(x, y), value) {
                out.set_pixel_unchecked(x, y, value);
                written += 1;
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellseg_core::{Connectivity, Pix, PixelDepth};

    fn tree() -> (Pix, MaxTree) {
        #[rustfmt::skip]
        let values = [
            1, 1, 1, 1, 1, 1,
            1, 4, 4, 1, 1, 1,
            1, 4, 7, 1, 3, 1,
            1, 1, 1, 1, 1, 1,
        ];
        let pix = Pix::from_values(6, 4, PixelDepth::Bit8, &values).unwrap();
        let tree = MaxTree::build(&pix, Connectivity::EightWay).unwrap();
        (pix, tree)
    }

    #[test]
    fn test_full_pixels_include_descendants() {
        let (_, tree) = tree();
        let blob = tree.node_of(1, 1).unwrap();
        let mut pixels = tree.full_pixels(blob).unwrap();
        pixels.sort_unstable();
        assert_eq!(pixels, vec![(1, 1), (1, 2), (2, 1), (2, 2)]);
        assert_eq!(tree.node(blob).unwrap().pixels().len(), 3);
    }

    #[test]
    fn test_basic_info_cached() {
        let (_, mut tree) = tree();
        let blob = tree.node_of(2, 2).unwrap();
        let parent = tree.parent(blob).unwrap().unwrap();
        let info = tree.basic_info(parent).unwrap();
        assert_eq!(info.area, 4);
        assert_eq!(info.bounds, Box::new_unchecked(1, 1, 2, 2));
        assert_eq!(tree.basic_info(parent).unwrap(), info);
        assert_eq!(tree.node(parent).unwrap().info, Some(info));
    }

    #[test]
    fn test_set_value_modes() {
        let (pix, tree) = tree();
        let blob = tree.node_of(1, 1).unwrap();

        let mut out = pix.to_mut();
        assert_eq!(tree.set_value(blob, &mut out, 2, SetMode::Overwrite).unwrap(), 4);
        assert_eq!(out.get_pixel(2, 2), Some(2));
        assert_eq!(out.get_pixel(4, 2), Some(3));

        let mut out = pix.to_mut();
        assert_eq!(tree.set_value(blob, &mut out, 9, SetMode::IfEqual(4)).unwrap(), 3);
        assert_eq!(out.get_pixel(2, 2), Some(7));

        let mut out = pix.to_mut();
        assert_eq!(tree.set_value(blob, &mut out, 5, SetMode::IfLess).unwrap(), 3);
        assert_eq!(out.get_pixel(1, 1), Some(5));
        assert_eq!(out.get_pixel(2, 2), Some(7));
    }

    #[test]
    fn test_set_value_checks_raster() {
        let (_, tree) = tree();
        let root = tree.roots()[0];
        let mut small = PixMut::new(3, 3, PixelDepth::Bit8).unwrap();
        assert!(matches!(
            tree.set_value(root, &mut small, 1, SetMode::Overwrite),
            Err(MorphError::Core(_))
        ));
        let mut out = PixMut::new(6, 4, PixelDepth::Bit8).unwrap();
        assert!(matches!(
            tree.set_value(root, &mut out, 256, SetMode::Overwrite),
            Err(MorphError::InvalidParameters(_))
        ));
    }
}
