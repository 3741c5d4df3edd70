use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, RgbImage};
use log::debug;
use plotters::prelude::*;
use serde::Deserialize;
use crate::cube::error::CubeError;
use crate::cube::projection::{frame_range, Frame};
use crate::cube::stats::ScanStats;
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Viridis,
    Inferno,
    Magma,
    Cubehelix,
}
impl Colormap {
    fn gradient(self) -> colorous::Gradient {
        match self {
            Colormap::Viridis => colorous::VIRIDIS,
            Colormap::Inferno => colorous::INFERNO,
            Colormap::Magma => colorous::MAGMA,
            Colormap::Cubehelix => colorous::CUBEHELIX,
        }
    }
    pub fn rgb(self, t: f64) -> [u8; 3] {
        let c = self.gradient().eval_continuous(t.clamp(0.0, 1.0));
        [c.r, c.g, c.b]
    }
}
/// Linear color range; values outside are clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalization {
    pub min: f64,
    pub max: f64,
}
impl Normalization {
    pub fn unit(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            ((value - self.min) / span).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }
    /// Natural range of `frame`, used for the summed-current view.
    pub fn of_frame(frame: &Frame) -> Self {
        let (min, max) = frame_range(frame);
        Self { min, max }
    }
}
impl From<ScanStats> for Normalization {
    fn from(stats: ScanStats) -> Self {
        Self {
            min: stats.min,
            max: stats.max,
        }
    }
}
/// One image pixel per cube pixel. Row 0 of the frame ends up at the bottom of the image.
pub fn colorize(frame: &Frame, norm: Normalization, colormap: Colormap) -> RgbImage {
    let (rows, cols) = frame.dim();
    ImageBuffer::from_fn(cols as u32, rows as u32, |x, y| {
        let row = rows - 1 - y as usize;
        Rgb(colormap.rgb(norm.unit(frame[[row, x as usize]])))
    })
}
#[derive(Clone, Debug)]
pub struct FrameStyle {
    pub width: u32,
    pub height: u32,
    pub colormap: Colormap,
    pub background: RGBColor,
}
impl Default for FrameStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            colormap: Colormap::default(),
            background: WHITE,
        }
    }
}
/// Renders a current map with a colorbar into a packed RGB24 buffer
/// (`width * height * 3` bytes). `label` is drawn in the upper-left corner of the map.
pub fn render_frame_rgb(
    frame: &Frame,
    norm: Normalization,
    label: Option<&str>,
    style: &FrameStyle,
) -> Result<Vec<u8>, CubeError> {
    let (rows, cols) = frame.dim();
    if rows == 0 || cols == 0 {
        return Err(CubeError::Render("frame has no pixels".into()));
    }
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let (map_area, bar_area) = root.split_horizontally((style.width * 10 / 11) as i32);
        let (x_max, y_max) = (cols as f64 - 0.5, rows as f64 - 0.5);
        let mut chart = ChartBuilder::on(&map_area)
            .margin(10)
            .set_label_area_size(LabelAreaPosition::Left, 40)
            .set_label_area_size(LabelAreaPosition::Bottom, 30)
            .build_cartesian_2d(-0.5f64..x_max, -0.5f64..y_max)?;
        // axis and label text need a system font; the map itself does not
        if let Err(e) = chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .draw()
        {
            debug!("frame drawn without axis labels: {e:?}");
        }
        chart.draw_series(frame.indexed_iter().map(|((row, col), &value)| {
            let [r, g, b] = style.colormap.rgb(norm.unit(value));
            let (x, y) = (col as f64, row as f64);
            Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                RGBColor(r, g, b).filled(),
            )
        }))?;
        if let Some(label) = label {
            let anchor = (-0.5 + 0.05 * cols as f64, -0.5 + 0.95 * rows as f64);
            if let Err(e) = chart.draw_series(std::iter::once(Text::new(
                label.to_owned(),
                anchor,
                ("sans-serif", 24)
                    .into_font()
                    .style(FontStyle::Bold)
                    .color(&WHITE),
            ))) {
                debug!("frame drawn without `{label}`: {e:?}");
            }
        }
        draw_colorbar(&bar_area, norm, style.colormap)?;
        root.present()?;
    }
    Ok(buffer)
}
fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    norm: Normalization,
    colormap: Colormap,
) -> Result<(), CubeError>
where
    DB::ErrorType: 'static,
{
    const STEPS: usize = 128;
    let (lo, hi) = if norm.max > norm.min {
        (norm.min, norm.max)
    } else {
        (norm.min - 0.5, norm.min + 0.5)
    };
    let step = (hi - lo) / STEPS as f64;
    let area = match area.titled("i / A", ("sans-serif", 14)) {
        Ok(titled) => titled,
        Err(e) => {
            debug!("colorbar drawn without caption: {e:?}");
            area.clone()
        }
    };
    let mut bar = ChartBuilder::on(&area)
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Right, 45)
        .build_cartesian_2d(0f64..1f64, lo..hi)?;
    if let Err(e) = bar
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_label_formatter(&|v: &f64| format!("{v:.0e}"))
        .draw()
    {
        debug!("colorbar drawn without tick labels: {e:?}");
    }
    bar.draw_series((0..STEPS).map(|i| {
        let y0 = lo + i as f64 * step;
        let [r, g, b] = colormap.rgb((i as f64 + 0.5) / STEPS as f64);
        Rectangle::new([(0.0, y0), (1.0, y0 + step)], RGBColor(r, g, b).filled())
    }))?;
    Ok(())
}
pub fn render_frame_png(
    frame: &Frame,
    norm: Normalization,
    label: Option<&str>,
    style: &FrameStyle,
) -> Result<Vec<u8>, CubeError> {
    let buffer = render_frame_rgb(frame, norm, label, style)?;
    encode_png(&buffer, style.width, style.height)
}
pub fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, CubeError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| CubeError::Render("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;
    #[test]
    fn normalization_clamps_and_handles_flat_range() {
        let norm = Normalization { min: 1.0, max: 3.0 };
        assert_eq!(norm.unit(2.0), 0.5);
        assert_eq!(norm.unit(-10.0), 0.0);
        assert_eq!(norm.unit(10.0), 1.0);
        let flat = Normalization { min: 2.0, max: 2.0 };
        assert_eq!(flat.unit(2.0), 0.5);
    }
    #[test]
    fn colorize_puts_row_zero_at_the_bottom() {
        let frame = arr2(&[[0.0, 0.0], [1.0, 1.0], [1.0, 1.0]]);
        let image = colorize(&frame, Normalization::of_frame(&frame), Colormap::Viridis);
        assert_eq!(image.dimensions(), (2, 3));
        let low = Rgb(Colormap::Viridis.rgb(0.0));
        let high = Rgb(Colormap::Viridis.rgb(1.0));
        assert_eq!(*image.get_pixel(0, 2), low);
        assert_eq!(*image.get_pixel(1, 0), high);
    }
    #[test]
    fn png_encoding_of_colorized_frame() {
        let frame = arr2(&[[1e-9, 2e-9], [3e-9, 4e-9]]);
        let rgb = colorize(&frame, Normalization::of_frame(&frame), Colormap::Magma);
        let png = encode_png(rgb.as_raw(), 2, 2).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
    #[test]
    fn rendered_frame_has_requested_size_and_encodes() {
        let frame = arr2(&[[1e-9, 2e-9, 3e-9], [4e-9, 5e-9, 6e-9]]);
        let style = FrameStyle {
            width: 220,
            height: 110,
            colormap: Colormap::Inferno,
            ..FrameStyle::default()
        };
        let norm = Normalization { min: 1e-9, max: 6e-9 };
        let rgb = render_frame_rgb(&frame, norm, Some("E = 0.100 V"), &style).unwrap();
        assert_eq!(rgb.len(), 220 * 110 * 3);
        let hottest = Colormap::Inferno.rgb(1.0);
        assert!(rgb.chunks_exact(3).any(|px| px == hottest));
        let png = render_frame_png(&frame, norm, None, &style).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (220, 110));
    }
    #[test]
    fn empty_frame_is_a_render_error() {
        let frame = Frame::zeros((0, 3));
        assert!(matches!(
            render_frame_rgb(&frame, Normalization { min: 0.0, max: 1.0 }, None, &FrameStyle::default()),
            Err(CubeError::Render(_))
        ));
    }
}
