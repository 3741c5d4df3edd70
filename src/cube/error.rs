use thiserror::Error;
#[derive(Debug, Error)]
pub enum CubeError {
    #[error("scan width {width} does not divide the {channels} current channels")]
    ShapeMismatch { channels: usize, width: usize },
    #[error("scan width must be at least one pixel")]
    InvalidWidth,
    #[error("raw scan needs at least one time sample and one current channel (got {rows}x{columns})")]
    EmptyScan { rows: usize, columns: usize },
    #[error("non-finite sample at time index {row}, column {column}")]
    InvalidSample { row: usize, column: usize },
    #[error("warm-up offset {offset} leaves no samples in a scan of {samples} time points")]
    WarmupOutOfRange { offset: usize, samples: usize },
    #[error("pixel (row {row}, col {col}) is outside the {rows}x{cols} scan grid")]
    OutOfBounds {
        row: i64,
        col: i64,
        rows: usize,
        cols: usize,
    },
    #[error("{potentials} potentials do not match the {samples} time samples of the cube")]
    PotentialMismatch { potentials: usize, samples: usize },
    #[error("time index {index} is outside a scan of {samples} time points")]
    TimeOutOfRange { index: usize, samples: usize },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("tab-separated data error: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to render frame: {0}")]
    Render(String),
    #[error("movie encoding failed: {0}")]
    Encode(String),
}
impl CubeError {
    /// Errors the operator can recover from without restarting the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CubeError::OutOfBounds { .. })
    }
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for CubeError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        CubeError::Render(format!("{value:?}"))
    }
}
impl From<image::ImageError> for CubeError {
    fn from(value: image::ImageError) -> Self {
        CubeError::Render(value.to_string())
    }
}
