use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::info;
use regex::Regex;
use crate::cube::curve::{extract_curve, ExportCounter, PixelCurve, TaggedCurve};
use crate::cube::raw::PotentialSeries;
use crate::cube::remap::{DataCube, ScanDataset};
use crate::cube::CubeError;
use crate::types::DisplayPoint;
/// Metadata carried by an export file name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportName {
    pub sequence: u64,
    pub row: usize,
    pub col: usize,
}
/// `<input>_<sequence>_x<col>_y<row>.txt`, appended to the full input path.
pub fn export_path(input: &Path, name: ExportName) -> PathBuf {
    let mut path = OsString::from(input.as_os_str());
    path.push(format!(
        "_{}_x{}_y{}.txt",
        name.sequence, name.col, name.row
    ));
    PathBuf::from(path)
}
/// Recovers the metadata from a path built by [`export_path`].
pub fn parse_export_name(path: &Path) -> Option<ExportName> {
    let re = Regex::new(r"_(\d+)_x(\d+)_y(\d+)\.txt$").ok()?;
    let name = path.file_name()?.to_str()?;
    let caps = re.captures(name)?;
    Some(ExportName {
        sequence: caps.get(1)?.as_str().parse().ok()?,
        col: caps.get(2)?.as_str().parse().ok()?,
        row: caps.get(3)?.as_str().parse().ok()?,
    })
}
/// Writes `potential<TAB>current` rows, no header.
pub fn write_curve(path: &Path, curve: &PixelCurve) -> Result<(), CubeError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(path)?;
    for (potential, current) in &curve.points {
        wtr.write_record(&[format!("{potential:.18e}"), format!("{current:.18e}")])?;
    }
    wtr.flush()?;
    Ok(())
}
/// Result of one click: the tagged curve and where it was written.
#[derive(Clone, Debug)]
pub struct ExportRecord {
    pub tagged: TaggedCurve,
    pub path: PathBuf,
}
/// Interactive session controller: owns the export counter and turns pixel picks into
/// exported voltammograms.
pub struct CurveExporter {
    cube: Arc<DataCube>,
    potentials: PotentialSeries,
    input_path: PathBuf,
    counter: ExportCounter,
}
impl CurveExporter {
    pub fn new(dataset: &ScanDataset, input_path: impl Into<PathBuf>) -> Self {
        Self {
            cube: Arc::clone(&dataset.cube),
            potentials: dataset.potentials.clone(),
            input_path: input_path.into(),
            counter: ExportCounter::default(),
        }
    }
    pub fn cube(&self) -> &DataCube {
        &self.cube
    }
    pub fn exports_so_far(&self) -> u64 {
        self.counter.peek() - 1
    }
    /// Extracts one pixel. Only a successful extraction consumes a sequence number.
    pub fn extract(&self, row: i64, col: i64) -> Result<TaggedCurve, CubeError> {
        let curve = extract_curve(&self.cube, &self.potentials, row, col)?;
        Ok(TaggedCurve {
            sequence: self.counter.advance(),
            row: row as usize,
            col: col as usize,
            curve,
        })
    }
    pub fn export(&self, row: i64, col: i64) -> Result<ExportRecord, CubeError> {
        let tagged = self.extract(row, col)?;
        let path = export_path(
            &self.input_path,
            ExportName {
                sequence: tagged.sequence,
                row: tagged.row,
                col: tagged.col,
            },
        );
        write_curve(&path, &tagged.curve)?;
        info!(
            "exported voltammogram #{} (x={}, y={}) to {}",
            tagged.sequence,
            tagged.col,
            tagged.row,
            path.display()
        );
        Ok(ExportRecord { tagged, path })
    }
    /// Click handler for the viewer: rounds the data coordinate to the nearest pixel and
    /// exports it.
    pub fn handle_click(&self, point: DisplayPoint) -> Result<ExportRecord, CubeError> {
        let pixel = point.to_pixel();
        self.export(pixel.row, pixel.col)
    }
}
