// src/cube/mod.rs
pub mod curve;
pub mod error;
pub mod export;
pub mod geometry;
pub mod movie;
pub mod projection;
pub mod raw;
pub mod remap;
pub mod render;
pub mod stats;
pub use curve::{extract_curve, ExportCounter, PixelCurve, TaggedCurve};
pub use error::CubeError;
pub use export::{export_path, parse_export_name, write_curve, CurveExporter, ExportName, ExportRecord};
pub use geometry::ScanGeometry;
pub use movie::{movie_frames, movie_path, render_movie, write_movie, FfmpegSink, FrameSink};
pub use projection::{animation_range, frame_at, frame_range, sum_projection, Frame};
pub use raw::{PotentialSeries, RawScan};
pub use remap::{remap, remap_parallel, DataCube, ScanDataset, DEFAULT_WARMUP_OFFSET};
pub use render::{colorize, encode_png, render_frame_png, render_frame_rgb, Colormap, FrameStyle, Normalization};
pub use stats::{ScanStats, StatsAccumulator};
