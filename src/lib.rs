//! SECCM scan remapping.
//!
//! Turns the flat `time x channel` matrix recorded by a serpentine-rastering scanning
//! electrochemical cell microscope into a `[row, col, time]` data cube, renders the
//! current movie and exports per-pixel voltammograms picked in an interactive viewer.
pub mod config;
pub mod cube;
pub mod gui;
pub mod types;
pub use config::{AnalysisConfig, MovieConfig};
pub use cube::CubeError;
