use std::sync::atomic::{AtomicU64, Ordering};
use crate::cube::raw::PotentialSeries;
use crate::cube::remap::DataCube;
use crate::cube::CubeError;
/// Voltammogram of one pixel: `(potential V, current A)` in time order.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelCurve {
    pub points: Vec<(f64, f64)>,
}
impl PixelCurve {
    pub fn len(&self) -> usize {
        self.points.len()
    }
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
/// Pairs `potentials[t]` with `cube[row][col][t]`. Signed coordinates so that clicks left
/// of or below the image report `OutOfBounds` instead of wrapping.
pub fn extract_curve(
    cube: &DataCube,
    potentials: &PotentialSeries,
    row: i64,
    col: i64,
) -> Result<PixelCurve, CubeError> {
    if !cube.geometry().contains(row, col) {
        return Err(CubeError::OutOfBounds {
            row,
            col,
            rows: cube.rows(),
            cols: cube.cols(),
        });
    }
    if potentials.len() != cube.samples() {
        return Err(CubeError::PotentialMismatch {
            potentials: potentials.len(),
            samples: cube.samples(),
        });
    }
    let points = potentials
        .iter()
        .copied()
        .zip(cube.trace(row as usize, col as usize).iter().copied())
        .collect();
    Ok(PixelCurve { points })
}
/// Sequence numbers for exported curves. Starts at 1 and never resets.
#[derive(Debug)]
pub struct ExportCounter {
    next: AtomicU64,
}
impl Default for ExportCounter {
    fn default() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}
impl ExportCounter {
    /// Returns the current value and advances the counter by one.
    pub fn advance(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
/// An extracted curve tagged with what the export file name needs.
#[derive(Clone, Debug, PartialEq)]
pub struct TaggedCurve {
    pub sequence: u64,
    pub row: usize,
    pub col: usize,
    pub curve: PixelCurve,
}
