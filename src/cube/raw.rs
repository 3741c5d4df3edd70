use std::fs::File;
use std::io::Read;
use std::ops::Index;
use std::path::Path;
use std::sync::Arc;
use ndarray::{Array2, ArrayView1, Axis};
use crate::cube::CubeError;
/// Excitation potential (V) at every time sample, shared by all pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct PotentialSeries {
    values: Arc<[f64]>,
}
impl PotentialSeries {
    pub fn new(values: impl Into<Arc<[f64]>>) -> Self {
        Self {
            values: values.into(),
        }
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }
}
impl Index<usize> for PotentialSeries {
    type Output = f64;
    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}
/// Instrument-native scan: `Nt` rows of `[potential, current_1, .., current_N]`.
///
/// Currents are kept in raw acquisition order; see [`crate::cube::remap`] for the
/// serpentine reordering.
#[derive(Clone, Debug)]
pub struct RawScan {
    data: Array2<f64>,
}
impl RawScan {
    pub fn new(data: Array2<f64>) -> Result<Self, CubeError> {
        let (rows, columns) = data.dim();
        if rows == 0 || columns < 2 {
            return Err(CubeError::EmptyScan { rows, columns });
        }
        if let Some(((row, column), _)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(CubeError::InvalidSample { row, column });
        }
        Ok(Self { data })
    }
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, CubeError> {
        let columns = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut flat = Vec::with_capacity(rows.len() * columns);
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns {
                return Err(CubeError::Parse {
                    line: idx + 1,
                    message: format!("expected {columns} columns, found {}", row.len()),
                });
            }
            flat.extend_from_slice(row);
        }
        let data = Array2::from_shape_vec((rows.len(), columns), flat).map_err(|e| {
            CubeError::Parse {
                line: 0,
                message: e.to_string(),
            }
        })?;
        Self::new(data)
    }
    pub fn load_tsv(path: impl AsRef<Path>) -> Result<Self, CubeError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }
    /// Parses headerless tab-separated text. Blank lines are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CubeError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut columns = None;
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
            let expected = *columns.get_or_insert(record.len());
            if record.len() != expected {
                return Err(CubeError::Parse {
                    line,
                    message: format!("expected {expected} columns, found {}", record.len()),
                });
            }
            let row_idx = rows.len();
            let row = record
                .iter()
                .enumerate()
                .map(|(column, field)| {
                    if field.is_empty() {
                        return Err(CubeError::InvalidSample {
                            row: row_idx,
                            column,
                        });
                    }
                    field.parse::<f64>().map_err(|_| CubeError::Parse {
                        line,
                        message: format!("`{field}` is not a number"),
                    })
                })
                .collect::<Result<Vec<f64>, CubeError>>()?;
            rows.push(row);
        }
        Self::from_rows(rows)
    }
    /// Number of time samples `Nt`.
    pub fn samples(&self) -> usize {
        self.data.nrows()
    }
    /// Number of current channels `N` (column 0 excluded).
    pub fn channels(&self) -> usize {
        self.data.ncols() - 1
    }
    pub fn potentials(&self) -> PotentialSeries {
        PotentialSeries::new(self.data.column(0).to_vec())
    }
    /// Current trace of raw channel `channel` (0-based, i.e. matrix column `channel + 1`).
    pub fn channel(&self, channel: usize) -> ArrayView1<'_, f64> {
        self.data.index_axis(Axis(1), channel + 1)
    }
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn parses_headerless_tab_separated_text() {
        let text = "0.1\t1e-9\t2e-9\n0.2\t3e-9\t4e-9\n\n0.3\t5e-9\t6e-9\n";
        let scan = RawScan::from_reader(text.as_bytes()).unwrap();
        assert_eq!(scan.samples(), 3);
        assert_eq!(scan.channels(), 2);
        assert_eq!(scan.potentials().as_slice(), &[0.1, 0.2, 0.3]);
        assert_eq!(scan.channel(1).to_vec(), vec![2e-9, 4e-9, 6e-9]);
    }
    #[test]
    fn rejects_ragged_rows() {
        let text = "0.1\t1\t2\n0.2\t3\n";
        match RawScan::from_reader(text.as_bytes()) {
            Err(CubeError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
    #[test]
    fn rejects_non_numeric_fields() {
        let text = "0.1\tabc\n";
        assert!(matches!(
            RawScan::from_reader(text.as_bytes()),
            Err(CubeError::Parse { line: 1, .. })
        ));
    }
    #[test]
    fn rejects_non_finite_samples() {
        let text = "0.1\t1\t2\n0.2\tNaN\t4\n";
        match RawScan::from_reader(text.as_bytes()) {
            Err(CubeError::InvalidSample { row, column }) => assert_eq!((row, column), (1, 1)),
            other => panic!("expected invalid sample, got {other:?}"),
        }
        assert!(matches!(
            RawScan::from_rows(vec![vec![0.0, f64::INFINITY]]),
            Err(CubeError::InvalidSample { row: 0, column: 1 })
        ));
    }
    #[test]
    fn missing_values_are_invalid_samples() {
        let text = "0.1\t1\t2\n0.2\t\t4\n";
        match RawScan::from_reader(text.as_bytes()) {
            Err(CubeError::InvalidSample { row, column }) => assert_eq!((row, column), (1, 1)),
            other => panic!("expected invalid sample, got {other:?}"),
        }
        assert!(matches!(
            RawScan::from_reader("0.1\t\t2\n0.2\t3\t4\n".as_bytes()),
            Err(CubeError::InvalidSample { row: 0, column: 1 })
        ));
    }
    #[test]
    fn rejects_scans_without_current_channels() {
        assert!(matches!(
            RawScan::from_rows(vec![vec![0.1], vec![0.2]]),
            Err(CubeError::EmptyScan { rows: 2, columns: 1 })
        ));
        assert!(matches!(
            RawScan::from_reader("".as_bytes()),
            Err(CubeError::EmptyScan { .. })
        ));
    }
}
