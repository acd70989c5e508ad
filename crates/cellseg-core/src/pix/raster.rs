//! Bulk conversion between packed rasters and flat value buffers
//!
//! Flooding and tree algorithms index pixels as `y * width + x` into plain
//! `Vec<u32>` buffers; these helpers move data in and out of the packed
//! word layout once per call instead of per access.

use super::{Pix, PixMut, PixelDepth, get_packed, set_packed};
use crate::error::{Error, Result};

impl Pix {
    /// Build an image from row-major values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `values.len()` is not
    /// `width * height` or a value does not fit in `depth`.
    pub fn from_values(width: u32, height: u32, depth: PixelDepth, values: &[u32]) -> Result<Pix> {
        let mut pm = PixMut::new(width, height, depth)?;
        pm.set_values(values)?;
        Ok(pm.into())
    }

    /// Copy the image out as row-major values.
    pub fn values(&self) -> Vec<u32> {
        let depth = self.depth();
        let mut out = Vec::with_capacity(self.pixel_count());
        for y in 0..self.height() {
            let line = self.row_data(y);
            out.extend((0..self.width()).map(|x| get_packed(line, x, depth)));
        }
        out
    }

    /// Largest pixel value in the image.
    pub fn max_pixel_value(&self) -> u32 {
        self.values().into_iter().max().unwrap_or(0)
    }

    /// Complement every pixel against the depth maximum.
    pub fn invert(&self) -> Pix {
        let max = self.depth().max_value();
        let mut pm = self.to_mut();
        for y in 0..self.height() {
            for x in 0..self.width() {
                let v = pm.get_pixel_unchecked(x, y);
                pm.set_pixel_unchecked(x, y, max - v);
            }
        }
        pm.into()
    }
}

impl PixMut {
    /// Overwrite the whole image from row-major values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] on a length mismatch or a value
    /// wider than the depth.
    pub fn set_values(&mut self, values: &[u32]) -> Result<()> {
        let width = self.width();
        let expected = width as usize * self.height() as usize;
        if values.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "expected {} values, got {}",
                expected,
                values.len()
            )));
        }
        let depth = self.depth();
        let max = depth.max_value();
        if let Some(&v) = values.iter().find(|&&v| v > max) {
            return Err(Error::InvalidParameter(format!(
                "value {} exceeds {} bpp maximum {}",
                v,
                depth.bits(),
                max
            )));
        }
        let wpl = self.wpl() as usize;
        let data = self.data_mut();
        for (y, row) in values.chunks(width as usize).enumerate() {
            let line = &mut data[y * wpl..(y + 1) * wpl];
            for (x, &v) in row.iter().enumerate() {
                set_packed(line, x as u32, depth, v);
            }
        }
        Ok(())
    }

    /// Copy the image out as row-major values.
    pub fn values(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.width() as usize * self.height() as usize);
        for y in 0..self.height() {
            for x in 0..self.width() {
                out.push(self.get_pixel_unchecked(x, y));
            }
        }
        out
    }
}
