use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::decoration::infrastructure::decoration_library::DecorationLibrary;
use crate::shared::video_metadata::VideoMetadata;
use crate::tracking::domain::coordinate_mapper::CoordinateMapper;

use super::overlay_executor::{OverlayComponents, OverlayConfig, OverlayExecutor, OverlayStats};
use super::pipeline_logger::{NullPipelineLogger, PipelineLogger};

/// Orchestrates one decoration overlay run.
///
/// Wires the frame source, detector, track pool and renderer together and
/// delegates the loop to an `OverlayExecutor`. Single-use: `execute`
/// consumes the owned components, so a second call fails.
pub struct OverlayFacesUseCase {
    components: Option<OverlayComponents>,
    library: DecorationLibrary,
    executor: Box<dyn OverlayExecutor>,
    mapper: CoordinateMapper,
    logger: Box<dyn PipelineLogger>,
    max_frames: Option<usize>,
    frame_interval: Option<Duration>,
    snapshot_every: usize,
    output_dir: Option<PathBuf>,
    on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    cancelled: Arc<AtomicBool>,
}

impl OverlayFacesUseCase {
    pub fn new(
        components: OverlayComponents,
        library: DecorationLibrary,
        executor: Box<dyn OverlayExecutor>,
        mapper: CoordinateMapper,
    ) -> Self {
        Self {
            components: Some(components),
            library,
            executor,
            mapper,
            logger: Box::new(NullPipelineLogger),
            max_frames: None,
            frame_interval: None,
            snapshot_every: 0,
            output_dir: None,
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    /// Overrides the source frame rate for display pacing.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = Some(interval);
        self
    }

    pub fn with_snapshots(mut self, dir: PathBuf, every: usize) -> Self {
        self.output_dir = Some(dir);
        self.snapshot_every = every;
        self
    }

    /// Called with `(current, total)` after every frame; returning `false`
    /// ends the run.
    pub fn with_progress(mut self, callback: Box<dyn Fn(usize, usize) -> bool + Send>) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn execute(
        &mut self,
        metadata: &VideoMetadata,
    ) -> Result<OverlayStats, Box<dyn std::error::Error>> {
        let components = self.components.take().ok_or("Pipeline already executed")?;
        let config = OverlayConfig {
            mapper: self.mapper,
            max_frames: self.max_frames,
            frame_interval: self.frame_interval,
            snapshot_every: self.snapshot_every,
            output_dir: self.output_dir.clone(),
            on_progress: self.on_progress.take(),
            cancelled: self.cancelled.clone(),
        };

        self.logger.info(&format!(
            "Overlaying {} decorations on {}x{} frames ({} track slots)",
            self.library.len(),
            metadata.width,
            metadata.height,
            components.pool.capacity()
        ));
        let stats = self.executor.execute(
            components,
            &self.library,
            metadata,
            config,
            self.logger.as_mut(),
        )?;
        self.logger.info(&format!(
            "Processed {} frames: {} tracks created, {} detections dropped, {} snapshots",
            stats.frames,
            stats.tracks_created,
            stats.detections_dropped,
            stats.snapshots_written
        ));
        self.logger.summary();

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoration::domain::decoration_handle::DecorationHandle;
    use crate::decoration::domain::decoration_rotation::DecorationRotation;
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::pipeline::infrastructure::sequential_overlay_executor::SequentialOverlayExecutor;
    use crate::rendering::domain::quad_renderer::QuadRenderer;
    use crate::shared::frame::Frame;
    use crate::shared::orientation::Orientation;
    use crate::shared::region::Region;
    use crate::tracking::domain::coordinate_mapper::DisplayGeometry;
    use crate::tracking::domain::decorated_face::DecoratedFace;
    use crate::tracking::domain::track_pool::TrackPool;
    use crate::tracking::domain::tracker_tuning::TrackerTuning;
    use crate::video::domain::image_writer::ImageWriter;
    use crate::video::domain::video_reader::VideoReader;
    use image::RgbaImage;
    use std::path::Path;
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    // --- Stubs ---

    struct StubReader {
        frames: Vec<Frame>,
        closed: Arc<Mutex<bool>>,
    }

    impl VideoReader for StubReader {
        fn open(&mut self, _path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            Ok(metadata(self.frames.len()))
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            Box::new(self.frames.drain(..).map(Ok))
        }

        fn close(&mut self) {
            *self.closed.lock().unwrap() = true;
        }
    }

    struct CentreDetector;

    impl FaceDetector for CentreDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            Ok(vec![Region::new(12, 12, 8, 8)])
        }
    }

    struct CountingRenderer {
        calls: Arc<Mutex<usize>>,
    }

    impl QuadRenderer for CountingRenderer {
        fn draw_quad(
            &self,
            _frame: &mut Frame,
            _texture: &RgbaImage,
            _face: &DecoratedFace,
        ) -> Result<(), Box<dyn std::error::Error>> {
            *self.calls.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct CollectingWriter {
        paths: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl ImageWriter for CollectingWriter {
        fn write(
            &self,
            path: &Path,
            _frame: &Frame,
            _size: Option<(u32, u32)>,
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.paths.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    struct Observed {
        closed: Arc<Mutex<bool>>,
        draws: Arc<Mutex<usize>>,
        snapshots: Arc<Mutex<Vec<PathBuf>>>,
    }

    struct MessageLogger {
        messages: Arc<Mutex<Vec<String>>>,
    }

    impl PipelineLogger for MessageLogger {
        fn progress(&mut self, _current: usize, _total: usize) {}
        fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
        fn metric(&mut self, _name: &str, _value: f64) {}
        fn info(&mut self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    // --- Helpers ---

    fn metadata(count: usize) -> VideoMetadata {
        VideoMetadata {
            width: 32,
            height: 32,
            fps: 0.0,
            total_frames: count,
            source_path: None,
        }
    }

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(
            DisplayGeometry {
                capture_width: 32,
                capture_height: 32,
                display_width: 32,
                display_height: 32,
                detection_scale: 1.0,
                orientation: Orientation::Upright,
            },
            1.0,
        )
    }

    fn use_case(count: usize) -> (OverlayFacesUseCase, Observed) {
        let observed = Observed {
            closed: Arc::new(Mutex::new(false)),
            draws: Arc::new(Mutex::new(0)),
            snapshots: Arc::new(Mutex::new(Vec::new())),
        };
        let handles = (0..3).map(DecorationHandle::new).collect();
        let rotation = DecorationRotation::with_seed(handles, 5).unwrap();
        let components = OverlayComponents {
            reader: Box::new(StubReader {
                frames: (0..count)
                    .map(|i| Frame::new(vec![0u8; 32 * 32 * 3], 32, 32, 3, i))
                    .collect(),
                closed: observed.closed.clone(),
            }),
            detector: Box::new(CentreDetector),
            renderer: Box::new(CountingRenderer {
                calls: observed.draws.clone(),
            }),
            writer: Box::new(CollectingWriter {
                paths: observed.snapshots.clone(),
            }),
            pool: TrackPool::with_seed(TrackerTuning::default(), rotation, 9),
        };
        let library = DecorationLibrary::from_images(vec![RgbaImage::new(1, 1); 3]);
        let use_case = OverlayFacesUseCase::new(
            components,
            library,
            Box::new(SequentialOverlayExecutor::new()),
            mapper(),
        );
        (use_case, observed)
    }

    // --- Tests ---

    #[test]
    fn test_execute_runs_every_frame() {
        let (mut use_case, observed) = use_case(6);

        let stats = use_case.execute(&metadata(6)).unwrap();

        assert_eq!(stats.frames, 6);
        assert_eq!(stats.tracks_created, 1);
        assert_eq!(*observed.draws.lock().unwrap(), 6);
        assert!(*observed.closed.lock().unwrap());
    }

    #[test]
    fn test_second_execute_fails() {
        let (mut use_case, _) = use_case(2);
        use_case.execute(&metadata(2)).unwrap();

        let err = use_case.execute(&metadata(2)).unwrap_err();
        assert_eq!(err.to_string(), "Pipeline already executed");
    }

    #[test]
    fn test_max_frames_limits_run() {
        let (use_case, _) = use_case(10);
        let mut use_case = use_case.with_max_frames(4);

        let stats = use_case.execute(&metadata(10)).unwrap();

        assert_eq!(stats.frames, 4);
    }

    #[test]
    fn test_snapshots_written_to_output_dir() {
        let (use_case, observed) = use_case(5);
        let mut use_case = use_case.with_snapshots(PathBuf::from("/snapshots"), 2);

        let stats = use_case.execute(&metadata(5)).unwrap();

        assert_eq!(stats.snapshots_written, 2);
        let paths = observed.snapshots.lock().unwrap().clone();
        assert!(paths.iter().all(|p| p.starts_with("/snapshots")));
    }

    #[test]
    fn test_cancel_flag_stops_before_first_frame() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let (use_case, observed) = use_case(5);
        let mut use_case = use_case.with_cancel_flag(cancelled.clone());
        cancelled.store(true, Ordering::Relaxed);

        let stats = use_case.execute(&metadata(5)).unwrap();

        assert_eq!(stats.frames, 0);
        assert_eq!(*observed.draws.lock().unwrap(), 0);
    }

    #[test]
    fn test_progress_callback_receives_total() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let (use_case, _) = use_case(3);
        let mut use_case = use_case.with_progress(Box::new(move |current, total| {
            sink.lock().unwrap().push((current, total));
            true
        }));

        use_case.execute(&metadata(3)).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_start_and_finish_reported_through_logger() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let (use_case, _) = use_case(2);
        let mut use_case = use_case.with_logger(Box::new(MessageLogger {
            messages: messages.clone(),
        }));

        use_case.execute(&metadata(2)).unwrap();

        let messages = messages.lock().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0],
            "Overlaying 3 decorations on 32x32 frames (20 track slots)"
        );
        assert!(messages[1].starts_with("Processed 2 frames: 1 tracks created"));
    }
}
