//! Shared raster plumbing for the flooding algorithms

use crate::error::{RegionError, RegionResult};
use cellseg_core::Pix;

/// Per-pixel flooding state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FloodState {
    Unprocessed,
    Queued,
    Watershed,
    Label(u32),
}

impl FloodState {
    #[inline]
    pub(crate) fn label(self) -> Option<u32> {
        match self {
            FloodState::Label(l) => Some(l),
            _ => None,
        }
    }

    /// Output value: the label, or 0 for anything that never got one.
    #[inline]
    pub(crate) fn output(self) -> u32 {
        self.label().unwrap_or(0)
    }
}

/// Read an 8 or 16 bpp grey raster into row-major values.
pub(crate) fn gray_values(pix: &Pix) -> RegionResult<Vec<u32>> {
    if !pix.depth().is_gray() {
        return Err(RegionError::UnsupportedDepth {
            expected: "8 or 16 bpp grey",
            actual: pix.depth().bits(),
        });
    }
    Ok(pix.values())
}

/// Whether pixel `index` sits on the outer frame of the grid.
#[inline]
pub(crate) fn on_frame(index: usize, width: u32, height: u32) -> bool {
    let x = index % width as usize;
    let y = index / width as usize;
    x == 0 || y == 0 || x + 1 == width as usize || y + 1 == height as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellseg_core::PixelDepth;

    #[test]
    fn test_gray_values_rejects_binary() {
        let pix = Pix::new(4, 4, PixelDepth::Bit1).unwrap();
        assert!(matches!(
            gray_values(&pix),
            Err(RegionError::UnsupportedDepth { actual: 1, .. })
        ));
        let pix = Pix::new(4, 4, PixelDepth::Bit16).unwrap();
        assert_eq!(gray_values(&pix).unwrap().len(), 16);
    }

    #[test]
    fn test_flood_state_output() {
        assert_eq!(FloodState::Label(7).output(), 7);
        assert_eq!(FloodState::Watershed.output(), 0);
        assert_eq!(FloodState::Queued.label(), None);
    }

    #[test]
    fn test_on_frame() {
        assert!(on_frame(0, 3, 3));
        assert!(!on_frame(4, 3, 3));
        assert!(on_frame(8, 3, 3));
    }
}
