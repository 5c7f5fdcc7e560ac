use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use narkissos_core::decoration::domain::decoration_rotation::DecorationRotation;
use narkissos_core::decoration::infrastructure::decoration_library::load_decorations;
use narkissos_core::detection::domain::face_detector::FaceDetector;
use narkissos_core::detection::infrastructure::replay_face_detector::ReplayFaceDetector;
use narkissos_core::pipeline::infrastructure::sequential_overlay_executor::SequentialOverlayExecutor;
use narkissos_core::pipeline::infrastructure::threaded_overlay_executor::ThreadedOverlayExecutor;
use narkissos_core::pipeline::overlay_executor::{OverlayComponents, OverlayExecutor};
use narkissos_core::pipeline::overlay_faces_use_case::OverlayFacesUseCase;
use narkissos_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use narkissos_core::rendering::infrastructure::cpu_quad_compositor::CpuQuadCompositor;
use narkissos_core::shared::clock_seed::clock_seed;
use narkissos_core::shared::constants::{CONFIG_DIR_NAME, TUNING_FILE_NAME};
use narkissos_core::shared::orientation::Orientation;
use narkissos_core::shared::tuning::Tuning;
use narkissos_core::shared::video_metadata::VideoMetadata;
use narkissos_core::tracking::domain::coordinate_mapper::CoordinateMapper;
use narkissos_core::tracking::domain::track_pool::TrackPool;
use narkissos_core::video::domain::video_reader::VideoReader;
use narkissos_core::video::infrastructure::image_file_writer::ImageFileWriter;
use narkissos_core::video::infrastructure::image_sequence_reader::ImageSequenceReader;

/// Overlay tracked, smoothed decorations on the faces in a frame sequence.
#[derive(Parser)]
#[command(name = "narkissos")]
struct Cli {
    /// Directory of input frames (png, jpg, bmp), processed in name order.
    frames_dir: PathBuf,

    /// Directory of PNG decorations.
    #[arg(long)]
    decorations: PathBuf,

    /// Recorded detections: JSON object of frame index to face rectangles.
    #[arg(long)]
    detections: Option<PathBuf>,

    /// Save composited frames to this directory.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Tuning file (JSON). Defaults to the per-user config file if present.
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Seed for decoration order and mirroring. Defaults to the clock.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Display pacing in frames per second (0 = as fast as possible).
    #[arg(long, default_value = "0")]
    fps: f64,

    /// Save every Nth composited frame when --output is set.
    #[arg(long, default_value = "1")]
    snapshot_every: usize,

    /// Number of face slots, overriding the tuning file.
    #[arg(long)]
    capacity: Option<usize>,

    /// Detection orientation: upright or rotated. Overrides the tuning file.
    #[arg(long)]
    orientation: Option<Orientation>,

    /// Detect inline on every frame instead of on a background thread.
    #[arg(long)]
    sequential: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut reader: Box<dyn VideoReader> = Box::new(ImageSequenceReader::new());
    let metadata = reader.open(&cli.frames_dir)?;
    let tuning = build_tuning(&cli, &metadata)?;

    let library = load_decorations(&cli.decorations)?;
    log::info!(
        "Loaded {} decorations from {}",
        library.len(),
        cli.decorations.display()
    );

    let seed = cli.seed.unwrap_or_else(clock_seed);
    log::info!("Random seed: {seed}");
    let mut rotation = DecorationRotation::with_seed(library.handles(), seed)?;
    rotation.warm_up(tuning.rotation_warmup);
    let pool = TrackPool::with_seed(tuning.tracker.clone(), rotation, seed.wrapping_add(1));
    let mapper = CoordinateMapper::new(tuning.geometry, tuning.tracker.growth_factor);

    let components = OverlayComponents {
        reader,
        detector: build_detector(cli.detections.as_deref())?,
        renderer: Box::new(CpuQuadCompositor::new()),
        writer: Box::new(ImageFileWriter::new()),
        pool,
    };
    let executor: Box<dyn OverlayExecutor> = if cli.sequential {
        Box::new(SequentialOverlayExecutor::new())
    } else {
        Box::new(ThreadedOverlayExecutor::new())
    };

    let total = metadata.total_frames;
    let progress: Box<dyn Fn(usize, usize) -> bool + Send> = Box::new(move |current, _| {
        eprint!("\rProcessing frame {current}/{total}");
        true
    });

    let mut use_case = OverlayFacesUseCase::new(components, library, executor, mapper)
        .with_progress(progress)
        .with_logger(Box::new(StdoutPipelineLogger::default()));
    if let Some(max) = cli.max_frames {
        use_case = use_case.with_max_frames(max);
    }
    if cli.fps > 0.0 {
        use_case = use_case.with_frame_interval(Duration::from_secs_f64(1.0 / cli.fps));
    }
    if let Some(dir) = &cli.output {
        use_case = use_case.with_snapshots(dir.clone(), cli.snapshot_every);
    }

    let stats = use_case.execute(&metadata)?;
    eprintln!();
    if let Some(dir) = &cli.output {
        log::info!(
            "{} frames written to {}",
            stats.snapshots_written,
            dir.display()
        );
    }

    Ok(())
}

fn build_tuning(
    cli: &Cli,
    metadata: &VideoMetadata,
) -> Result<Tuning, Box<dyn std::error::Error>> {
    let mut tuning = match tuning_path(cli) {
        Some(path) => Tuning::load(&path)?,
        None => Tuning::default(),
    };

    if let Some(capacity) = cli.capacity {
        tuning.tracker.capacity = capacity;
    }
    if let Some(orientation) = cli.orientation {
        tuning.geometry.orientation = orientation;
    }
    // Frames are displayed in place, so capture and display share their size.
    let g = &mut tuning.geometry;
    g.capture_width = metadata.width;
    g.capture_height = metadata.height;
    g.display_width = metadata.width;
    g.display_height = metadata.height;

    tuning.validate()?;
    Ok(tuning)
}

fn tuning_path(cli: &Cli) -> Option<PathBuf> {
    if let Some(path) = &cli.tuning {
        return Some(path.clone());
    }
    let default = dirs::config_dir()?
        .join(CONFIG_DIR_NAME)
        .join(TUNING_FILE_NAME);
    default.is_file().then_some(default)
}

fn build_detector(
    detections: Option<&Path>,
) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    match detections {
        Some(path) => Ok(Box::new(ReplayFaceDetector::from_file(path)?)),
        None => {
            log::warn!("No --detections given; no faces will be found");
            Ok(Box::new(ReplayFaceDetector::new(Arc::new(HashMap::new()))))
        }
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.frames_dir.is_dir() {
        return Err(format!("Frames directory not found: {}", cli.frames_dir.display()).into());
    }
    if !cli.decorations.is_dir() {
        return Err(format!(
            "Decorations directory not found: {}",
            cli.decorations.display()
        )
        .into());
    }
    if let Some(path) = &cli.detections {
        if !path.is_file() {
            return Err(format!("Detections file not found: {}", path.display()).into());
        }
    }
    if let Some(path) = &cli.tuning {
        if !path.is_file() {
            return Err(format!("Tuning file not found: {}", path.display()).into());
        }
    }
    if !cli.fps.is_finite() || cli.fps < 0.0 {
        return Err(format!("FPS must be zero or positive, got {}", cli.fps).into());
    }
    if cli.snapshot_every == 0 {
        return Err("Snapshot interval must be at least 1".into());
    }
    if cli.capacity == Some(0) {
        return Err("Capacity must be at least 1".into());
    }
    if cli.max_frames == Some(0) {
        return Err("Max frames must be at least 1".into());
    }
    Ok(())
}
