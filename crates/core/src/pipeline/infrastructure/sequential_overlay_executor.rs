use crate::decoration::infrastructure::decoration_library::DecorationLibrary;
use crate::pipeline::overlay_executor::{
    OverlayComponents, OverlayConfig, OverlayExecutor, OverlayStats,
};
use crate::pipeline::overlay_stage::{
    prepare_detection_input, run_display_loop, DetectionBatch, OverlayStage,
};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::video_metadata::VideoMetadata;

/// Detects on every frame, inline, before tracking it.
///
/// Slower than [`super::threaded_overlay_executor::ThreadedOverlayExecutor`]
/// but reproducible: with seeded randomness the same input always yields the
/// same decorated frames. Suited to replaying recorded detections.
pub struct SequentialOverlayExecutor;

impl SequentialOverlayExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SequentialOverlayExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayExecutor for SequentialOverlayExecutor {
    fn execute(
        &self,
        components: OverlayComponents,
        library: &DecorationLibrary,
        metadata: &VideoMetadata,
        config: OverlayConfig,
        logger: &mut dyn PipelineLogger,
    ) -> Result<OverlayStats, Box<dyn std::error::Error>> {
        let OverlayComponents {
            mut reader,
            mut detector,
            renderer,
            writer,
            pool,
        } = components;
        let geometry = *config.mapper.geometry();

        let mut stage = OverlayStage::new(pool, renderer, writer, library, &config);
        let loop_result = run_display_loop(
            &mut *reader,
            &mut stage,
            metadata,
            &config,
            logger,
            |frame| {
                let input = match prepare_detection_input(frame, &geometry) {
                    Ok(input) => input,
                    Err(e) => {
                        log::warn!("Failed to prepare frame {}: {e}", frame.index());
                        return None;
                    }
                };
                match detector.detect(&input) {
                    Ok(regions) => Some(DetectionBatch {
                        frame_index: frame.index(),
                        regions,
                    }),
                    Err(e) => {
                        log::warn!("Detection failed on frame {}: {e}", frame.index());
                        None
                    }
                }
            },
        );
        reader.close();

        loop_result?;
        Ok(stage.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoration::domain::decoration_handle::DecorationHandle;
    use crate::decoration::domain::decoration_rotation::DecorationRotation;
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::detection::infrastructure::replay_face_detector::ReplayFaceDetector;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::rendering::domain::quad_renderer::QuadRenderer;
    use crate::shared::frame::Frame;
    use crate::shared::orientation::Orientation;
    use crate::shared::region::Region;
    use crate::tracking::domain::coordinate_mapper::{CoordinateMapper, DisplayGeometry};
    use crate::tracking::domain::decorated_face::DecoratedFace;
    use crate::tracking::domain::track_pool::TrackPool;
    use crate::tracking::domain::tracker_tuning::TrackerTuning;
    use crate::video::domain::image_writer::ImageWriter;
    use crate::video::domain::video_reader::VideoReader;
    use image::RgbaImage;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, Mutex};

    struct StubReader {
        frames: Vec<Frame>,
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

        fn close(&mut self) {}
    }

    /// Records which frame each quad was drawn on.
    struct RecordingRenderer {
        drawn: Arc<Mutex<Vec<(usize, DecoratedFace)>>>,
    }

    impl QuadRenderer for RecordingRenderer {
        fn draw_quad(
            &self,
            frame: &mut Frame,
            _texture: &RgbaImage,
            face: &DecoratedFace,
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.drawn.lock().unwrap().push((frame.index(), *face));
            Ok(())
        }
    }

    struct NoopWriter;

    impl ImageWriter for NoopWriter {
        fn write(
            &self,
            _path: &Path,
            _frame: &Frame,
            _size: Option<(u32, u32)>,
        ) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
    }

    fn metadata(count: usize) -> VideoMetadata {
        VideoMetadata {
            width: 64,
            height: 64,
            fps: 0.0,
            total_frames: count,
            source_path: None,
        }
    }

    fn config() -> OverlayConfig {
        let geometry = DisplayGeometry {
            capture_width: 64,
            capture_height: 64,
            display_width: 64,
            display_height: 64,
            detection_scale: 1.0,
            orientation: Orientation::Upright,
        };
        OverlayConfig {
            mapper: CoordinateMapper::new(geometry, 1.0),
            max_frames: None,
            frame_interval: None,
            snapshot_every: 0,
            output_dir: None,
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    fn run(
        detector: Box<dyn FaceDetector>,
        count: usize,
        config: OverlayConfig,
    ) -> (OverlayStats, Vec<(usize, DecoratedFace)>) {
        let drawn = Arc::new(Mutex::new(Vec::new()));
        let handles = (0..4).map(DecorationHandle::new).collect();
        let rotation = DecorationRotation::with_seed(handles, 17).unwrap();
        let tuning = TrackerTuning {
            capacity: 3,
            match_distance: 10.0,
            age_max: 2,
            age_empty_floor: -3,
            ..TrackerTuning::default()
        };
        let components = OverlayComponents {
            reader: Box::new(StubReader {
                frames: (0..count)
                    .map(|i| Frame::new(vec![0u8; 64 * 64 * 3], 64, 64, 3, i))
                    .collect(),
            }),
            detector,
            renderer: Box::new(RecordingRenderer {
                drawn: drawn.clone(),
            }),
            writer: Box::new(NoopWriter),
            pool: TrackPool::with_seed(tuning, rotation, 19),
        };
        let library = DecorationLibrary::from_images(vec![RgbaImage::new(2, 2); 4]);

        let stats = SequentialOverlayExecutor::new()
            .execute(
                components,
                &library,
                &metadata(count),
                config,
                &mut NullPipelineLogger,
            )
            .unwrap();
        let drawn = drawn.lock().unwrap().clone();
        (stats, drawn)
    }

    fn replay(entries: &[(usize, Vec<Region>)]) -> Box<dyn FaceDetector> {
        let recording: HashMap<usize, Vec<Region>> = entries.iter().cloned().collect();
        Box::new(ReplayFaceDetector::new(Arc::new(recording)))
    }

    #[test]
    fn test_track_outlives_detection_then_disappears() {
        // One face on frames 0-1; the slot is reclaimed on frame 5.
        let face = vec![Region::new(10, 10, 20, 20)];
        let detector = replay(&[(0, face.clone()), (1, face)]);

        let (stats, drawn) = run(detector, 10, config());

        assert_eq!(stats.frames, 10);
        assert_eq!(stats.detection_batches, 10);
        assert_eq!(stats.tracks_created, 1);
        let frames_drawn: Vec<usize> = drawn.iter().map(|(i, _)| *i).collect();
        assert_eq!(frames_drawn, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_runs_are_reproducible() {
        let entries = vec![
            (0, vec![Region::new(4, 4, 10, 10), Region::new(40, 40, 12, 12)]),
            (1, vec![Region::new(5, 4, 10, 10)]),
            (3, vec![Region::new(40, 41, 12, 12), Region::new(20, 2, 8, 8)]),
        ];

        let (first_stats, first) = run(replay(&entries), 8, config());
        let (second_stats, second) = run(replay(&entries), 8, config());

        assert_eq!(first_stats, second_stats);
        assert_eq!(first, second);
    }

    #[test]
    fn test_progress_callback_can_stop_run() {
        let config = OverlayConfig {
            on_progress: Some(Box::new(|current, _| current < 3)),
            ..config()
        };

        let (stats, _) = run(replay(&[]), 10, config);

        assert_eq!(stats.frames, 3);
    }
}
