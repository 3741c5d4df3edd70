use std::ffi::OsString;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use log::{debug, info, warn};
use crate::config::MovieConfig;
use crate::cube::projection::{animation_range, frame_at, Frame};
use crate::cube::remap::ScanDataset;
use crate::cube::render::{render_frame_rgb, Colormap, FrameStyle, Normalization};
use crate::cube::CubeError;
/// `<input>_curr_Movie.mp4`, appended to the full input path.
pub fn movie_path(input: &Path) -> PathBuf {
    let mut path = OsString::from(input.as_os_str());
    path.push("_curr_Movie.mp4");
    PathBuf::from(path)
}
/// Potential annotation drawn on every movie frame.
pub fn potential_label(potential: f64) -> String {
    format!("E = {potential:.3} V")
}
/// Frames of the current movie in display order: `(time index, label, frame)` for every
/// time index past the warm-up offset.
pub fn movie_frames(
    dataset: &ScanDataset,
) -> impl Iterator<Item = Result<(usize, String, Frame), CubeError>> + '_ {
    animation_range(&dataset.cube, dataset.warmup_offset).map(move |t| {
        let frame = frame_at(&dataset.cube, t)?;
        Ok((t, potential_label(dataset.potentials[t]), frame))
    })
}
/// Receives packed RGB24 frames of a fixed size.
pub trait FrameSink {
    fn push_frame(&mut self, rgb: &[u8]) -> Result<(), CubeError>;
    fn finish(self: Box<Self>) -> Result<PathBuf, CubeError>;
}
/// Streams raw RGB24 frames into the stdin of an `ffmpeg` process.
pub struct FfmpegSink {
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    frames: usize,
    output: PathBuf,
    program: String,
}
impl FfmpegSink {
    pub fn create(output: PathBuf, width: u32, height: u32, config: &MovieConfig) -> Result<Self, CubeError> {
        let mut cmd = Command::new(&config.ffmpeg);
        cmd.arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-y")
            .arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg("rgb24")
            .arg("-s")
            .arg(format!("{width}x{height}"))
            .arg("-r")
            .arg(config.fps.max(1).to_string())
            .arg("-i")
            .arg("-")
            .arg("-c:v")
            .arg("libx264")
            .arg("-pix_fmt")
            .arg("yuv420p")
            .arg("-b:v")
            .arg(format!("{}k", config.bitrate_kbps))
            .arg(&output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        debug!("running {cmd:?}");
        let mut child = cmd
            .spawn()
            .map_err(|e| CubeError::Encode(format!("cannot run `{}`: {e}", config.ffmpeg)))?;
        let stdin = child
            .stdin
            .take()
            .map(BufWriter::new)
            .ok_or_else(|| CubeError::Encode("ffmpeg stdin is not available".into()))?;
        Ok(Self {
            child,
            stdin: Some(stdin),
            frames: 0,
            output,
            program: config.ffmpeg.clone(),
        })
    }
}
impl FrameSink for FfmpegSink {
    fn push_frame(&mut self, rgb: &[u8]) -> Result<(), CubeError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| CubeError::Encode("ffmpeg input already closed".into()))?;
        stdin
            .write_all(rgb)
            .map_err(|e| CubeError::Encode(format!("`{}` stopped reading frames: {e}", self.program)))?;
        self.frames += 1;
        Ok(())
    }
    fn finish(self: Box<Self>) -> Result<PathBuf, CubeError> {
        let mut sink = *self;
        // closing stdin is what tells ffmpeg the stream has ended
        let flushed = match sink.stdin.take() {
            Some(mut stdin) => stdin.flush(),
            None => Ok(()),
        };
        let output = sink.child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            return Err(CubeError::Encode(stderr));
        }
        flushed.map_err(|e| CubeError::Encode(e.to_string()))?;
        if sink.frames == 0 {
            return Err(CubeError::Encode("no frames to encode".into()));
        }
        Ok(sink.output)
    }
}
/// YUV420 encoders need even dimensions.
fn even_dimension(dim: u32) -> u32 {
    let dim = dim.max(2);
    dim - dim % 2
}
/// Renders every post warm-up frame with the shared `[min, max]` range of the scan and
/// hands it to `sink`. Returns the number of frames written.
pub fn render_movie(
    dataset: &ScanDataset,
    style: &FrameStyle,
    sink: &mut dyn FrameSink,
) -> Result<usize, CubeError> {
    let norm = Normalization::from(dataset.stats);
    let mut count = 0;
    for item in movie_frames(dataset) {
        let (t, label, frame) = item?;
        let rgb = render_frame_rgb(&frame, norm, Some(&label), style)?;
        sink.push_frame(&rgb)?;
        count += 1;
        if count % 100 == 0 {
            debug!("rendered frame {t} ({label})");
        }
    }
    Ok(count)
}
/// Renders and encodes the current movie next to `input`.
pub fn write_movie(
    dataset: &ScanDataset,
    input: &Path,
    config: &MovieConfig,
    colormap: Colormap,
) -> Result<PathBuf, CubeError> {
    let style = FrameStyle {
        width: even_dimension(config.frame_width),
        height: even_dimension(config.frame_height),
        colormap,
        ..FrameStyle::default()
    };
    if style.width != config.frame_width || style.height != config.frame_height {
        warn!(
            "adjusting movie frame size from {}x{} to {}x{}",
            config.frame_width, config.frame_height, style.width, style.height
        );
    }
    let mut sink = Box::new(FfmpegSink::create(
        movie_path(input),
        style.width,
        style.height,
        config,
    )?);
    let count = render_movie(dataset, &style, sink.as_mut())?;
    let path = sink.finish()?;
    info!("encoded {count} frames to {}", path.display());
    Ok(path)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::raw::RawScan;
    #[test]
    fn movie_path_appends_suffix() {
        assert_eq!(
            movie_path(Path::new("/data/scan.txt")),
            PathBuf::from("/data/scan.txt_curr_Movie.mp4")
        );
    }
    #[test]
    fn labels_use_three_decimals() {
        assert_eq!(potential_label(-0.12345), "E = -0.123 V");
        assert_eq!(potential_label(0.5), "E = 0.500 V");
    }
    #[test]
    fn frames_start_after_warmup() {
        let rows = (0..5)
            .map(|t| vec![t as f64 * 0.1, t as f64, 10.0 + t as f64])
            .collect();
        let raw = RawScan::from_rows(rows).unwrap();
        let dataset = ScanDataset::build(&raw, 1, 2, false).unwrap();
        let frames: Vec<_> = movie_frames(&dataset).map(Result::unwrap).collect();
        let times: Vec<usize> = frames.iter().map(|f| f.0).collect();
        assert_eq!(times, vec![2, 3, 4]);
        assert_eq!(frames[0].1, "E = 0.200 V");
        // single column: row 1 is the second channel
        assert_eq!(frames[2].2, ndarray::arr2(&[[4.0], [14.0]]));
    }
    #[derive(Default)]
    struct RecordingSink {
        frames: Vec<Vec<u8>>,
    }
    impl FrameSink for RecordingSink {
        fn push_frame(&mut self, rgb: &[u8]) -> Result<(), CubeError> {
            self.frames.push(rgb.to_vec());
            Ok(())
        }
        fn finish(self: Box<Self>) -> Result<PathBuf, CubeError> {
            Ok(PathBuf::from("recorded"))
        }
    }
    #[test]
    fn render_movie_pushes_one_packed_frame_per_time_step() {
        let rows = (0..5)
            .map(|t| vec![t as f64 * 0.1, t as f64 * 1e-9, -(t as f64) * 1e-9])
            .collect();
        let raw = RawScan::from_rows(rows).unwrap();
        let dataset = ScanDataset::build(&raw, 1, 2, false).unwrap();
        let style = FrameStyle {
            width: 200,
            height: 150,
            ..FrameStyle::default()
        };
        let mut sink = RecordingSink::default();
        let count = render_movie(&dataset, &style, &mut sink).unwrap();
        assert_eq!(count, 3);
        assert_eq!(sink.frames.len(), 3);
        for rgb in &sink.frames {
            assert_eq!(rgb.len(), 200 * 150 * 3);
            assert!(rgb.iter().any(|&b| b != 255), "frame is blank");
        }
        assert_ne!(sink.frames[0], sink.frames[2]);
        assert_eq!(Box::new(sink).finish().unwrap(), PathBuf::from("recorded"));
    }
    #[test]
    fn missing_encoder_is_an_encode_error() {
        let config = MovieConfig {
            ffmpeg: "seccm-cube-no-such-encoder".into(),
            ..MovieConfig::default()
        };
        let result = FfmpegSink::create(PathBuf::from("unused.mp4"), 4, 4, &config);
        assert!(matches!(result, Err(CubeError::Encode(_))));
    }
    #[test]
    fn even_dimensions_for_the_encoder() {
        assert_eq!(even_dimension(801), 800);
        assert_eq!(even_dimension(0), 2);
        assert_eq!(even_dimension(600), 600);
    }
}
