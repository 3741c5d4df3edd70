// src/gui.rs
use eframe::egui;
use egui::{Color32, ColorImage, TextureHandle, TextureOptions};
use egui_plot::{Line, Plot, PlotImage, PlotPoint, PlotPoints};
use log::warn;
use crate::cube::{colorize, sum_projection, Colormap, CurveExporter, Normalization, TaggedCurve};
use crate::types::{DisplayPoint, ViewerEvent};

const MAX_LOG_LINES: usize = 8;

pub struct CubeViewerApp {
    exporter: CurveExporter,
    // 总电流图 (time-summed current)
    total_texture: TextureHandle,
    total_range: Normalization,
    last_curve: Option<TaggedCurve>,
    log_messages: Vec<String>,
}

impl CubeViewerApp {
    pub fn new(ctx: &egui::Context, exporter: CurveExporter, colormap: Colormap) -> Self {
        let total = sum_projection(exporter.cube());
        let total_range = Normalization::of_frame(&total);
        let rgb = colorize(&total, total_range, colormap);
        let size = [rgb.width() as usize, rgb.height() as usize];
        let image = ColorImage::from_rgb(size, rgb.as_raw());
        let total_texture = ctx.load_texture("total_current", image, TextureOptions::NEAREST);
        let summary = {
            let cube = exporter.cube();
            format!(
                "{} x {} pixels, {} samples. Click a pixel to export its voltammogram.",
                cube.cols(),
                cube.rows(),
                cube.samples()
            )
        };
        let mut app = Self {
            exporter,
            total_texture,
            total_range,
            last_curve: None,
            log_messages: Vec::new(),
        };
        app.push(ViewerEvent::Log(summary));
        app
    }

    fn push(&mut self, event: ViewerEvent) {
        self.log_messages.push(format!("> {}", event.line()));
        if self.log_messages.len() > MAX_LOG_LINES {
            self.log_messages.remove(0);
        }
    }

    fn on_click(&mut self, point: DisplayPoint) {
        match self.exporter.handle_click(point) {
            Ok(record) => {
                self.push(ViewerEvent::Exported {
                    sequence: record.tagged.sequence,
                    path: record.path.display().to_string(),
                });
                self.last_curve = Some(record.tagged);
            }
            Err(err) => {
                warn!("pixel export failed: {err}");
                self.push(ViewerEvent::Rejected(err.to_string()));
            }
        }
    }
}

impl eframe::App for CubeViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("L").min_width(300.0).show(ctx, |ui| {
            ui.add_space(10.0);
            ui.heading("Total current");
            ui.label(format!(
                "range [{:.3e}, {:.3e}] A",
                self.total_range.min, self.total_range.max
            ));
            ui.label(format!("exported curves: {}", self.exporter.exports_so_far()));
            ui.separator();

            if let Some(tagged) = &self.last_curve {
                ui.label(format!(
                    "#{}  x={}  y={}",
                    tagged.sequence, tagged.col, tagged.row
                ));
                Plot::new("voltammogram")
                    .height(240.0)
                    .x_axis_label("E / V")
                    .y_axis_label("i / A")
                    .show(ui, |plot_ui| {
                        let points: PlotPoints =
                            tagged.curve.points.iter().map(|&(e, i)| [e, i]).collect();
                        plot_ui.line(Line::new(points).color(Color32::from_rgb(0, 255, 255)));
                    });
            } else {
                ui.label("No curve exported yet.");
            }

            ui.add_space(10.0);
            egui::ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                for m in &self.log_messages {
                    ui.monospace(m);
                }
            });
        });

        let cube = self.exporter.cube();
        let (cols, rows) = (cube.cols() as f64, cube.rows() as f64);
        let texture_id = self.total_texture.id();
        let response = egui::CentralPanel::default()
            .show(ctx, |ui| {
                Plot::new("total_current")
                    .data_aspect(1.0)
                    .allow_drag(false)
                    .allow_zoom(false)
                    .allow_scroll(false)
                    .include_x(-0.5)
                    .include_x(cols - 0.5)
                    .include_y(-0.5)
                    .include_y(rows - 0.5)
                    .show(ui, |plot_ui| {
                        // pixel centres on integer coordinates, row 0 at the bottom
                        plot_ui.image(PlotImage::new(
                            texture_id,
                            PlotPoint::new((cols - 1.0) / 2.0, (rows - 1.0) / 2.0),
                            [cols as f32, rows as f32],
                        ));
                        plot_ui.pointer_coordinate()
                    })
            })
            .inner;
        if response.response.clicked() {
            if let Some(p) = response.inner {
                self.on_click(DisplayPoint { x: p.x, y: p.y });
            }
        }
    }
}

/// Opens the interactive pixel picker and blocks until the window is closed.
pub fn run_viewer(exporter: CurveExporter, colormap: Colormap, title: &str) -> eframe::Result<()> {
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1200.0, 800.0])
        .with_title(title);
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        title,
        options,
        Box::new(move |cc| Box::new(CubeViewerApp::new(&cc.egui_ctx, exporter, colormap))),
    )
}
