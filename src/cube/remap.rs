use std::sync::Arc;
use log::debug;
use ndarray::parallel::prelude::*;
use ndarray::{s, Array3, ArrayView1, ArrayView3, ArrayViewMut2, Axis};
use crate::cube::geometry::ScanGeometry;
use crate::cube::raw::{PotentialSeries, RawScan};
use crate::cube::stats::{ScanStats, StatsAccumulator};
use crate::cube::CubeError;
/// Time samples excluded from the normalization range while the instrument settles.
pub const DEFAULT_WARMUP_OFFSET: usize = 100;
/// Current (A) addressed by `[row, col, time]`, columns ordered left-to-right in every row.
#[derive(Clone, Debug, PartialEq)]
pub struct DataCube {
    data: Array3<f64>,
    geometry: ScanGeometry,
}
impl DataCube {
    pub fn rows(&self) -> usize {
        self.geometry.height()
    }
    pub fn cols(&self) -> usize {
        self.geometry.width()
    }
    pub fn samples(&self) -> usize {
        self.data.len_of(Axis(2))
    }
    pub fn geometry(&self) -> ScanGeometry {
        self.geometry
    }
    pub fn get(&self, row: usize, col: usize, t: usize) -> Option<f64> {
        self.data.get((row, col, t)).copied()
    }
    /// Current trace of one pixel. Panics on an out-of-range pixel; see
    /// [`crate::cube::extract_curve`] for the checked path.
    pub fn trace(&self, row: usize, col: usize) -> ArrayView1<'_, f64> {
        self.data.slice(s![row, col, ..])
    }
    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }
}
fn check_warmup(raw: &RawScan, warmup_offset: usize) -> Result<(), CubeError> {
    if warmup_offset >= raw.samples() {
        return Err(CubeError::WarmupOutOfRange {
            offset: warmup_offset,
            samples: raw.samples(),
        });
    }
    Ok(())
}
/// Copies every raw channel of one cube row into `plane` (`[col, time]`) and reduces the
/// samples past the warm-up offset.
fn fill_row(
    raw: &RawScan,
    geometry: &ScanGeometry,
    row: usize,
    mut plane: ArrayViewMut2<'_, f64>,
    warmup_offset: usize,
) -> StatsAccumulator {
    let mut acc = StatsAccumulator::default();
    for col in 0..geometry.width() {
        let trace = raw.channel(geometry.channel_at(row, col));
        let mut cell = plane.index_axis_mut(Axis(0), col);
        for (t, (dst, &value)) in cell.iter_mut().zip(trace.iter()).enumerate() {
            *dst = value;
            if t >= warmup_offset {
                acc.push(value);
            }
        }
    }
    acc
}
/// Undoes the serpentine raster of `raw` and computes the post warm-up min/max in the
/// same traversal.
pub fn remap(
    raw: &RawScan,
    width: usize,
    warmup_offset: usize,
) -> Result<(DataCube, ScanStats), CubeError> {
    let geometry = ScanGeometry::new(raw.channels(), width)?;
    check_warmup(raw, warmup_offset)?;
    let mut data = Array3::<f64>::zeros((geometry.height(), geometry.width(), raw.samples()));
    let acc = data
        .axis_iter_mut(Axis(0))
        .enumerate()
        .map(|(row, plane)| fill_row(raw, &geometry, row, plane, warmup_offset))
        .fold(StatsAccumulator::default(), StatsAccumulator::merge);
    let stats = acc.finish().ok_or(CubeError::WarmupOutOfRange {
        offset: warmup_offset,
        samples: raw.samples(),
    })?;
    Ok((DataCube { data, geometry }, stats))
}
/// Same contract as [`remap`]; rows are filled on the rayon pool and their partial
/// reductions merged afterwards.
pub fn remap_parallel(
    raw: &RawScan,
    width: usize,
    warmup_offset: usize,
) -> Result<(DataCube, ScanStats), CubeError> {
    let geometry = ScanGeometry::new(raw.channels(), width)?;
    check_warmup(raw, warmup_offset)?;
    let mut data = Array3::<f64>::zeros((geometry.height(), geometry.width(), raw.samples()));
    let acc = data
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .map(|(row, plane)| fill_row(raw, &geometry, row, plane, warmup_offset))
        .reduce(StatsAccumulator::default, StatsAccumulator::merge);
    let stats = acc.finish().ok_or(CubeError::WarmupOutOfRange {
        offset: warmup_offset,
        samples: raw.samples(),
    })?;
    Ok((DataCube { data, geometry }, stats))
}
/// Everything downstream consumers need after a load: potentials, cube and stats.
#[derive(Clone, Debug)]
pub struct ScanDataset {
    pub potentials: PotentialSeries,
    pub cube: Arc<DataCube>,
    pub stats: ScanStats,
    pub warmup_offset: usize,
}
impl ScanDataset {
    pub fn build(
        raw: &RawScan,
        width: usize,
        warmup_offset: usize,
        parallel: bool,
    ) -> Result<Self, CubeError> {
        let (cube, stats) = if parallel {
            remap_parallel(raw, width, warmup_offset)?
        } else {
            remap(raw, width, warmup_offset)?
        };
        debug!(
            "remapped {}x{}x{} cube, current range [{:e}, {:e}] A",
            cube.rows(),
            cube.cols(),
            cube.samples(),
            stats.min,
            stats.max
        );
        Ok(Self {
            potentials: raw.potentials(),
            cube: Arc::new(cube),
            stats,
            warmup_offset,
        })
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    fn worked_example() -> RawScan {
        RawScan::from_rows(vec![
            vec![-0.1, 1.0, 4.0, 7.0, 10.0],
            vec![0.0, 2.0, 5.0, 8.0, 11.0],
            vec![0.1, 3.0, 6.0, 9.0, 12.0],
        ])
        .unwrap()
    }
    fn random_scan(rng: &mut StdRng, nt: usize, channels: usize) -> RawScan {
        let data = Array2::from_shape_fn((nt, channels + 1), |(t, c)| {
            if c == 0 {
                t as f64 * 1e-3
            } else {
                rng.gen_range(-1e-9..1e-9)
            }
        });
        RawScan::new(data).unwrap()
    }
    #[test]
    fn worked_example_reflects_odd_row() {
        let raw = worked_example();
        let (cube, stats) = remap(&raw, 2, 0).unwrap();
        assert_eq!((cube.rows(), cube.cols(), cube.samples()), (2, 2, 3));
        assert_eq!(cube.trace(0, 0).to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(cube.trace(0, 1).to_vec(), vec![4.0, 5.0, 6.0]);
        assert_eq!(cube.trace(1, 1).to_vec(), vec![7.0, 8.0, 9.0]);
        assert_eq!(cube.trace(1, 0).to_vec(), vec![10.0, 11.0, 12.0]);
        assert_eq!(stats, ScanStats { min: 1.0, max: 12.0 });
    }
    #[test]
    fn boustrophedon_mapping_holds_for_every_sample() {
        let mut rng = StdRng::seed_from_u64(7);
        let (nx, ny, nt) = (5, 4, 12);
        let raw = random_scan(&mut rng, nt, nx * ny);
        let (cube, _) = remap(&raw, nx, 3).unwrap();
        for ny_idx in 0..ny {
            for nx_idx in 0..nx {
                let column = 1 + nx_idx + ny_idx * nx;
                let col = if ny_idx % 2 == 0 { nx_idx } else { nx - 1 - nx_idx };
                for t in 0..nt {
                    assert_eq!(
                        cube.get(ny_idx, col, t),
                        Some(raw.data()[[t, column]])
                    );
                }
            }
        }
    }
    #[test]
    fn stats_skip_warmup_samples() {
        let mut rows: Vec<Vec<f64>> = (0..6).map(|t| vec![t as f64, 1.0, 2.0]).collect();
        rows[0][1] = -50.0;
        rows[1][2] = 90.0;
        rows[4][1] = 0.5;
        let raw = RawScan::from_rows(rows).unwrap();
        let (cube, stats) = remap(&raw, 2, 2).unwrap();
        assert_eq!(stats, ScanStats { min: 0.5, max: 2.0 });
        for row in 0..cube.rows() {
            for col in 0..cube.cols() {
                for t in 2..cube.samples() {
                    assert!(stats.contains(cube.get(row, col, t).unwrap()));
                }
            }
        }
        assert_eq!(cube.get(0, 0, 0), Some(-50.0));
    }
    #[test]
    fn warmup_must_leave_samples() {
        let raw = worked_example();
        assert!(matches!(
            remap(&raw, 2, 3),
            Err(CubeError::WarmupOutOfRange {
                offset: 3,
                samples: 3
            })
        ));
        assert!(remap(&raw, 2, 2).is_ok());
    }
    #[test]
    fn width_must_divide_channels() {
        let raw = RawScan::from_rows(vec![vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]]).unwrap();
        assert!(matches!(
            remap(&raw, 2, 0),
            Err(CubeError::ShapeMismatch {
                channels: 5,
                width: 2
            })
        ));
        assert!(matches!(
            remap_parallel(&raw, 2, 0),
            Err(CubeError::ShapeMismatch { .. })
        ));
    }
    #[test]
    fn remap_is_deterministic_and_parallel_agrees() {
        let mut rng = StdRng::seed_from_u64(42);
        let raw = random_scan(&mut rng, 150, 6 * 5);
        let first = remap(&raw, 6, DEFAULT_WARMUP_OFFSET).unwrap();
        let second = remap(&raw, 6, DEFAULT_WARMUP_OFFSET).unwrap();
        let parallel = remap_parallel(&raw, 6, DEFAULT_WARMUP_OFFSET).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, parallel);
    }
    #[test]
    fn dataset_keeps_potentials_verbatim() {
        let raw = worked_example();
        let dataset = ScanDataset::build(&raw, 2, 1, true).unwrap();
        assert_eq!(dataset.potentials.as_slice(), &[-0.1, 0.0, 0.1]);
        assert_eq!(dataset.stats, ScanStats { min: 2.0, max: 12.0 });
    }
}
