use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use anyhow::Context;
use serde::Deserialize;
use crate::cube::{Colormap, DEFAULT_WARMUP_OFFSET};
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct MovieConfig {
    /// Frames per second of the encoded movie.
    pub fps: u32,
    pub bitrate_kbps: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    /// ffmpeg executable used to encode the raw frames.
    pub ffmpeg: String,
}
impl Default for MovieConfig {
    fn default() -> Self {
        // 10 ms per frame, 20 Mb/s.
        Self {
            fps: 100,
            bitrate_kbps: 20_000,
            frame_width: 800,
            frame_height: 600,
            ffmpeg: "ffmpeg".to_owned(),
        }
    }
}
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Leading time samples left out of the movie and its color range.
    pub warmup_offset: usize,
    /// Fill cube rows on the rayon pool.
    pub parallel: bool,
    pub colormap: Colormap,
    pub movie: MovieConfig,
}
impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            warmup_offset: DEFAULT_WARMUP_OFFSET,
            parallel: false,
            colormap: Colormap::default(),
            movie: MovieConfig::default(),
        }
    }
}
impl AnalysisConfig {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("invalid analysis config")
    }
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("cannot open config file {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("invalid analysis config in {}", path.display()))
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = AnalysisConfig::from_json(r#"{"warmup_offset": 20, "movie": {"fps": 25}}"#)
            .unwrap();
        assert_eq!(config.warmup_offset, 20);
        assert!(!config.parallel);
        assert_eq!(config.movie.fps, 25);
        assert_eq!(config.movie.bitrate_kbps, 20_000);
        assert_eq!(config.colormap, Colormap::Viridis);
    }
    #[test]
    fn colormap_names_are_lowercase() {
        let config = AnalysisConfig::from_json(r#"{"colormap": "cubehelix"}"#).unwrap();
        assert_eq!(config.colormap, Colormap::Cubehelix);
        assert!(AnalysisConfig::from_json(r#"{"colormap": "jet"}"#).is_err());
    }
}
