use std::ops::Range;
use ndarray::{Array2, Axis};
use crate::cube::remap::DataCube;
use crate::cube::CubeError;
/// 2D current map indexed `[row, col]`.
pub type Frame = Array2<f64>;
/// Slice of the cube at time index `t`.
pub fn frame_at(cube: &DataCube, t: usize) -> Result<Frame, CubeError> {
    if t >= cube.samples() {
        return Err(CubeError::TimeOutOfRange {
            index: t,
            samples: cube.samples(),
        });
    }
    Ok(cube.view().index_axis(Axis(2), t).to_owned())
}
/// Time indices shown in the current movie; the warm-up region is left out.
pub fn animation_range(cube: &DataCube, warmup_offset: usize) -> Range<usize> {
    warmup_offset.min(cube.samples())..cube.samples()
}
/// Total current per pixel, summed over every time sample (warm-up included).
pub fn sum_projection(cube: &DataCube) -> Frame {
    cube.view().sum_axis(Axis(2))
}
/// Natural `(min, max)` of a frame.
pub fn frame_range(frame: &Frame) -> (f64, f64) {
    frame.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}
