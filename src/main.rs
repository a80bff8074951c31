use anyhow::Context;
use clap::Parser;
use image::ImageReader;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use dicebox::config::{DetectionConfig, EdgeMethod, RegionMode};
use dicebox::{FrameReport, Session, render};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

#[derive(Parser)]
#[command(name = "dicebox")]
#[command(about = "Locate dice against a static background and box them")]
struct Cli {
    /// Image of the empty scene
    #[arg(short, long, value_name = "IMAGE")]
    background: PathBuf,

    /// Frames to process, in order (directories expand to their images, sorted)
    #[arg(value_name = "FRAMES", required = true)]
    frames: Vec<PathBuf>,

    /// JSON configuration file; flags below override its values
    #[arg(short, long, value_name = "JSON")]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    mode: Option<RegionMode>,

    #[arg(long)]
    blur_radius: Option<u32>,

    #[arg(long)]
    canny_low: Option<u32>,

    #[arg(long)]
    min_area: Option<u32>,

    #[arg(long, value_enum)]
    edge_method: Option<EdgeMethod>,

    /// Write annotated frames and primary crops to this directory
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Print one JSON report per frame instead of text
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn detection_config(&self) -> anyhow::Result<DetectionConfig> {
        let mut config = match &self.config {
            Some(path) => DetectionConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => DetectionConfig::default(),
        };
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(blur_radius) = self.blur_radius {
            config.blur_radius = blur_radius;
        }
        if let Some(canny_low) = self.canny_low {
            config.canny_low = canny_low;
        }
        if let Some(min_area) = self.min_area {
            config.min_area = min_area;
        }
        if let Some(edge_method) = self.edge_method {
            config.edge_method = edge_method;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.detection_config()?;

    let background = ImageReader::open(&args.background)?
        .decode()
        .with_context(|| format!("decoding background {}", args.background.display()))?
        .to_luma8();

    let mut session = Session::new(background, config)?;
    if let Some(debug_dir) = &args.debug_out {
        session = session.with_debug(debug_dir.clone())?;
    }
    if let Some(out_dir) = &args.out {
        std::fs::create_dir_all(out_dir)?;
    }

    let frames = expand_frames(&args.frames)?;
    tracing::info!(frames = frames.len(), "starting session");

    for path in &frames {
        // A frame that cannot be read is dropped; the session carries on
        let img = match load_frame(path) {
            Ok(img) => img,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable frame");
                continue;
            }
        };

        let report = session
            .process_frame(&img.to_luma8())
            .with_context(|| format!("processing {}", path.display()))?;

        print_report(path, &report, args.json)?;

        if let Some(out_dir) = &args.out {
            write_outputs(out_dir, path, &img, &report)?;
        }
    }

    Ok(())
}

fn load_frame(path: &Path) -> anyhow::Result<image::DynamicImage> {
    Ok(ImageReader::open(path)?.decode()?)
}

fn expand_frames(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| is_image(p))
                .collect();
            entries.sort();
            frames.extend(entries);
        } else {
            frames.push(input.clone());
        }
    }
    Ok(frames)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn print_report(path: &Path, report: &FrameReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }

    println!(
        "{} [{}] {} region(s)",
        path.display(),
        report.mode,
        report.regions.len()
    );
    for (i, bbox) in report.regions.iter().enumerate() {
        let marker = if report.primary.as_ref() == Some(bbox) && i == 0 { "*" } else { " " };
        println!(
            " {} {:>3}: ({}, {}) {}x{}",
            marker,
            i + 1,
            bbox.x,
            bbox.y,
            bbox.width,
            bbox.height
        );
    }
    Ok(())
}

fn write_outputs(
    out_dir: &Path,
    path: &Path,
    img: &image::DynamicImage,
    report: &FrameReport,
) -> anyhow::Result<()> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("frame_{:04}", report.frame_index));

    let annotated = render::annotate(img, &report.regions, report.mode);
    annotated
        .save(out_dir.join(format!("{}_regions.png", stem)))
        .map_err(|e| anyhow::anyhow!("Failed to save annotated frame: {}", e))?;

    if let Some(crop) = render::crop_primary(img, report.primary.as_ref()) {
        crop.save(out_dir.join(format!("{}_primary.png", stem)))
            .map_err(|e| anyhow::anyhow!("Failed to save primary crop: {}", e))?;
    }

    Ok(())
}
