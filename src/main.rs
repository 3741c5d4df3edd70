// src/main.rs
use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context};
use clap::Parser;
use log::info;
use seccm_cube::cube::{
    render_frame_png, sum_projection, write_movie, CurveExporter, FrameStyle, Normalization,
    RawScan, ScanDataset,
};
use seccm_cube::{gui, AnalysisConfig};

#[derive(Debug, Parser)]
#[command(name = "seccm-cube", about = "Build SECCM current movies and export pixel voltammograms")]
struct Opt {
    /// Tab-separated scan file (potential column followed by one current column per pixel).
    /// A file dialog opens when omitted.
    input: Option<PathBuf>,
    /// Image width in pixels; asked for interactively when omitted
    #[arg(short, long)]
    width: Option<usize>,
    /// Render the current movie without asking
    #[arg(long, conflicts_with = "no_movie")]
    movie: bool,
    /// Skip the current movie without asking
    #[arg(long)]
    no_movie: bool,
    /// JSON analysis config
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Override the warm-up offset
    #[arg(long)]
    warmup: Option<usize>,
    /// Fill the data cube on all cores
    #[arg(long)]
    parallel: bool,
    /// Save the summed current map as `<input>_total_current.png`
    #[arg(long)]
    save_total: bool,
    /// Do not open the pixel picker
    #[arg(long)]
    no_gui: bool,
}

fn prompt(question: &str) -> anyhow::Result<String> {
    print!("{question} ");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("no answer to `{question}` (end of input)");
    }
    Ok(line.trim().to_owned())
}

fn ask_width() -> anyhow::Result<usize> {
    loop {
        let answer = prompt("What's the image width (in pixels)?")?;
        match answer.parse::<usize>() {
            Ok(width) if width > 0 => return Ok(width),
            _ => println!("Please enter a positive integer."),
        }
    }
}

fn ask_movie() -> anyhow::Result<bool> {
    Ok(prompt("Would you like a movie? (y/n)")?.eq_ignore_ascii_case("y"))
}

fn save_total(dataset: &ScanDataset, input: &Path, config: &AnalysisConfig) -> anyhow::Result<PathBuf> {
    let total = sum_projection(&dataset.cube);
    let style = FrameStyle {
        colormap: config.colormap,
        ..FrameStyle::default()
    };
    let png = render_frame_png(&total, Normalization::of_frame(&total), None, &style)?;
    let mut path = OsString::from(input.as_os_str());
    path.push("_total_current.png");
    let path = PathBuf::from(path);
    std::fs::write(&path, png).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(path)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opt = Opt::parse();

    let mut config = match &opt.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(warmup) = opt.warmup {
        config.warmup_offset = warmup;
    }
    config.parallel |= opt.parallel;

    let input = match opt.input {
        Some(path) => path,
        None => rfd::FileDialog::new()
            .pick_file()
            .ok_or_else(|| anyhow!("no scan file selected"))?,
    };
    let raw = RawScan::load_tsv(&input)
        .with_context(|| format!("cannot load scan {}", input.display()))?;
    info!(
        "loaded {}: {} time samples, {} current channels",
        input.display(),
        raw.samples(),
        raw.channels()
    );

    let width = match opt.width {
        Some(width) => width,
        None => ask_width()?,
    };
    let dataset = ScanDataset::build(&raw, width, config.warmup_offset, config.parallel)
        .with_context(|| format!("cannot build the data cube of {}", input.display()))?;
    info!("image size: {} x {}", dataset.cube.cols(), dataset.cube.rows());

    let movie = if opt.movie {
        true
    } else if opt.no_movie {
        false
    } else {
        ask_movie()?
    };
    if movie {
        info!("Movie is being prepared... Be patient...");
        let path = write_movie(&dataset, &input, &config.movie, config.colormap)
            .context("current movie failed")?;
        info!("movie written to {}", path.display());
    }

    if opt.save_total {
        let path = save_total(&dataset, &input, &config)?;
        info!("total current map written to {}", path.display());
    }

    if !opt.no_gui {
        let exporter = CurveExporter::new(&dataset, input.clone());
        let title = format!("SECCM total current - {}", input.display());
        gui::run_viewer(exporter, config.colormap, &title)
            .map_err(|e| anyhow!("viewer failed: {e}"))?;
    }
    Ok(())
}
