use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::decoration::infrastructure::decoration_library::DecorationLibrary;
use crate::detection::domain::face_detector::FaceDetector;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::rendering::domain::quad_renderer::QuadRenderer;
use crate::shared::video_metadata::VideoMetadata;
use crate::tracking::domain::coordinate_mapper::CoordinateMapper;
use crate::tracking::domain::track_pool::TrackPool;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;

/// Configuration for one overlay run.
pub struct OverlayConfig {
    pub mapper: CoordinateMapper,
    /// Stop after this many frames.
    pub max_frames: Option<usize>,
    /// Minimum wall time per display frame.
    pub frame_interval: Option<Duration>,
    /// Save every n-th composited frame into `output_dir`; 0 disables.
    pub snapshot_every: usize,
    pub output_dir: Option<PathBuf>,
    pub on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    pub cancelled: Arc<AtomicBool>,
}

/// Totals for one overlay run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlayStats {
    pub frames: usize,
    /// Detection lists received from the detector.
    pub detection_batches: usize,
    pub tracks_created: usize,
    pub detections_dropped: usize,
    pub detections_skipped: usize,
    pub snapshots_written: usize,
}

/// Components consumed by a run.
pub struct OverlayComponents {
    pub reader: Box<dyn VideoReader>,
    pub detector: Box<dyn FaceDetector>,
    pub renderer: Box<dyn QuadRenderer>,
    pub writer: Box<dyn ImageWriter>,
    pub pool: TrackPool,
}

/// How the capture → detect → track → render loop is executed.
///
/// Port: infrastructure supplies a threaded implementation that matches the
/// live installation and a sequential one that detects on every frame.
pub trait OverlayExecutor: Send {
    fn execute(
        &self,
        components: OverlayComponents,
        library: &DecorationLibrary,
        metadata: &VideoMetadata,
        config: OverlayConfig,
        logger: &mut dyn PipelineLogger,
    ) -> Result<OverlayStats, Box<dyn std::error::Error>>;
}
