use crate::cube::CubeError;
/// Rectangular raster declared by the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanGeometry {
    width: usize,
    height: usize,
}
impl ScanGeometry {
    /// `channels` is the number of current columns `N`; it must be a multiple of `width`.
    pub fn new(channels: usize, width: usize) -> Result<Self, CubeError> {
        if width == 0 {
            return Err(CubeError::InvalidWidth);
        }
        if channels == 0 || channels % width != 0 {
            return Err(CubeError::ShapeMismatch { channels, width });
        }
        Ok(Self {
            width,
            height: channels / width,
        })
    }
    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
    /// Maps a raw channel index (0-based, acquisition order) to its `(row, col)` cell.
    ///
    /// Odd rows are swept right-to-left by the stage, so their column is reflected.
    pub fn locate(&self, channel: usize) -> (usize, usize) {
        let row = channel / self.width;
        let nx = channel % self.width;
        let col = if row % 2 == 0 { nx } else { self.width - 1 - nx };
        (row, col)
    }
    /// Inverse of [`ScanGeometry::locate`].
    pub fn channel_at(&self, row: usize, col: usize) -> usize {
        let nx = if row % 2 == 0 { col } else { self.width - 1 - col };
        nx + row * self.width
    }
    pub fn contains(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }
}
