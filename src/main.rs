//! # Epicycle Engine CLI
//!
//! Drives the epicycle store against a simulated frame clock.
//!
//! ## Commands
//! - `list`: show the drawables found in an asset directory
//! - `render`: write PNG frames of an animated drawable
//! - `report`: print reconstruction error against arrow count

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use epicycle_core::{
    reconstruction_error, DrawableLibrary, EpicycleConfig, EpicycleStore, FsDrawableLoader,
    LoadState,
};
use epicycle_skia::{FrameStyle, SkiaRenderer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "epicycle-engine")]
#[command(about = "Traces vector drawings with chains of rotating Fourier arrows")]
#[command(version)]
struct Cli {
    /// Directory holding the .svg drawables
    #[arg(short, long, global = true, default_value = "assets/drawables")]
    assets: PathBuf,

    /// JSON file overriding engine tuning constants
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available drawables
    List,

    /// Render PNG frames of one drawable
    Render {
        /// Drawable file name (defaults to the first one found)
        #[arg(short, long)]
        drawable: Option<String>,

        /// Output directory for frame_NNN.png files
        #[arg(short, long, default_value = "frames")]
        output: PathBuf,

        #[arg(long, default_value_t = 60)]
        frames: u32,

        #[arg(long, default_value_t = 30.0)]
        fps: f64,

        #[arg(long, default_value_t = 512)]
        size: u32,

        #[arg(long, default_value_t = 50)]
        arrows: usize,

        /// Playback speed: 0.25, 0.5, 1 or 2
        #[arg(long, default_value_t = 1.0)]
        speed: f64,

        /// Samples per unit of normalized arc length
        #[arg(long)]
        rate: Option<f64>,

        /// Follow the chain tip with the camera
        #[arg(long)]
        lock: bool,

        #[arg(long, default_value_t = 1.0)]
        zoom: f64,

        /// Start at this fraction of the loop
        #[arg(long, default_value_t = 0.0)]
        start: f64,
    },

    /// Print reconstruction error as arrows are added
    Report {
        #[arg(short, long)]
        drawable: Option<String>,

        #[arg(long, default_value_t = 100)]
        max_arrows: usize,

        #[arg(long, default_value_t = 10)]
        step: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = match &cli.config {
        Some(path) => EpicycleConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => EpicycleConfig::default(),
    };
    let library = open_library(&cli.assets)?;

    match cli.command {
        Commands::List => {
            for (index, name) in library.names.iter().enumerate() {
                println!("{index:>3}  {name}");
            }
            Ok(())
        }
        Commands::Render {
            drawable,
            output,
            frames,
            fps,
            size,
            arrows,
            speed,
            rate,
            lock,
            zoom,
            start,
        } => {
            let index = resolve_drawable(&library, drawable.as_deref())?;
            let mut store = open_store(config, library, index, rate)?;
            for _ in 0..arrows {
                store.add_arrow();
            }
            store.change_time(start);
            if lock {
                store.change_lock_to_path(true);
            }
            // Let the lock transition settle before the first frame.
            let settle = store.config().transition_millis;
            store.tick(settle);
            store.change_zoom_factor(zoom);
            store.change_period_speed(speed);
            if !store.snapshot().playing {
                store.play();
            }
            render_frames(&mut store, &output, frames, fps, size, settle)
        }
        Commands::Report {
            drawable,
            max_arrows,
            step,
        } => {
            let index = resolve_drawable(&library, drawable.as_deref())?;
            let mut store = open_store(config, library, index, None)?;
            println!("arrows  mse");
            let step = step.max(1);
            while store.snapshot().arrow_count < max_arrows {
                for _ in 0..step {
                    store.add_arrow();
                }
                let mse = reconstruction_error(store.samples(), store.arrows());
                println!("{:>6}  {:.6e}", store.snapshot().arrow_count, mse);
            }
            Ok(())
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn open_library(assets: &Path) -> Result<DrawableLibrary> {
    let loader = FsDrawableLoader::new(assets);
    let names = loader
        .list()
        .with_context(|| format!("Failed to read asset directory: {}", assets.display()))?;
    if names.is_empty() {
        bail!("No .svg drawables found in {}", assets.display());
    }
    Ok(DrawableLibrary::new(Arc::new(loader), names))
}

fn resolve_drawable(library: &DrawableLibrary, name: Option<&str>) -> Result<usize> {
    match name {
        None => Ok(0),
        Some(name) => library
            .names
            .iter()
            .position(|candidate| candidate == name)
            .with_context(|| format!("Unknown drawable: {name}")),
    }
}

fn open_store(
    config: EpicycleConfig,
    library: DrawableLibrary,
    index: usize,
    rate: Option<f64>,
) -> Result<EpicycleStore> {
    let mut store = EpicycleStore::new(config, library, index).context("Failed to open drawable")?;
    if let Some(rate) = rate {
        store.change_sampling_rate(rate);
    }
    if let LoadState::Failed(message) = store.wait_for_load() {
        bail!("Failed to sample drawable: {message}");
    }
    let state = store.snapshot();
    info!(
        samples = state.sample_count,
        period = state.period_duration,
        "drawable ready"
    );
    Ok(store)
}

fn render_frames(
    store: &mut EpicycleStore,
    output: &Path,
    frames: u32,
    fps: f64,
    size: u32,
    start_millis: f64,
) -> Result<()> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    let style = FrameStyle::default();
    let frame_millis = 1000.0 / fps.max(1.0);
    for index in 0..frames {
        let now = start_millis + index as f64 * frame_millis;
        let frame = store.compose(now, size as f64, size as f64);
        let png = SkiaRenderer::render_png(&frame, &style)
            .with_context(|| format!("Failed to render frame {index}"))?;
        let path = output.join(format!("frame_{index:03}.png"));
        std::fs::write(&path, png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    info!(frames, output = %output.display(), "frames written");
    Ok(())
}
