use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::decoration::infrastructure::decoration_library::DecorationLibrary;
use crate::detection::domain::face_detector::FaceDetector;
use crate::pipeline::overlay_executor::{
    OverlayComponents, OverlayConfig, OverlayExecutor, OverlayStats,
};
use crate::pipeline::overlay_stage::{run_display_loop, DetectionBatch, OverlayStage};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::constants::DETECTION_CHANNEL_CAPACITY;
use crate::shared::shared_gray_buffer::SharedGrayBuffer;
use crate::shared::video_metadata::VideoMetadata;
use crate::tracking::domain::coordinate_mapper::DisplayGeometry;

/// Wait between polls when the detector has already seen the newest frame.
const IDLE_POLL: Duration = Duration::from_millis(1);

/// Runs detection on its own thread, decoupled from the display loop.
///
/// Layout: `display [publish → track → draw] ⇄ shared buffer → detect`
///
/// The display loop never waits for the detector. It publishes each frame's
/// grayscale into a [`SharedGrayBuffer`] and uses whichever detection list
/// arrived last, so rectangles may lag the displayed frame.
pub struct ThreadedOverlayExecutor {
    channel_capacity: usize,
}

impl ThreadedOverlayExecutor {
    pub fn new() -> Self {
        Self {
            channel_capacity: DETECTION_CHANNEL_CAPACITY,
        }
    }
}

impl Default for ThreadedOverlayExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayExecutor for ThreadedOverlayExecutor {
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
            detector,
            renderer,
            writer,
            pool,
        } = components;

        let buffer = Arc::new(SharedGrayBuffer::new());
        let stop = Arc::new(AtomicBool::new(false));
        let (batch_tx, batch_rx) = crossbeam_channel::bounded(self.channel_capacity);

        let detect_handle = spawn_detector(
            detector,
            buffer.clone(),
            *config.mapper.geometry(),
            batch_tx,
            stop.clone(),
            config.cancelled.clone(),
        );

        let mut stage = OverlayStage::new(pool, renderer, writer, library, &config);
        let loop_result = run_display_loop(
            &mut *reader,
            &mut stage,
            metadata,
            &config,
            logger,
            |frame| {
                buffer.publish(frame);
                batch_rx.try_iter().last()
            },
        );

        stop.store(true, Ordering::Relaxed);
        drop(batch_rx);
        reader.close();

        join_detector(detect_handle, loop_result)?;
        Ok(stage.finish())
    }
}

fn spawn_detector(
    mut detector: Box<dyn FaceDetector>,
    buffer: Arc<SharedGrayBuffer>,
    geometry: DisplayGeometry,
    batch_tx: crossbeam_channel::Sender<DetectionBatch>,
    stop: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<Box<dyn FaceDetector>> {
    std::thread::spawn(move || {
        let mut seen = 0;
        while !stop.load(Ordering::Relaxed) && !cancelled.load(Ordering::Relaxed) {
            let snapshot = match buffer.downscaled_snapshot(geometry.detection_scale, seen) {
                Ok(Some(snapshot)) => snapshot,
                Ok(None) => {
                    std::thread::sleep(IDLE_POLL);
                    continue;
                }
                Err(e) => {
                    log::warn!("Failed to prepare detection snapshot: {e}");
                    seen = buffer.generation();
                    continue;
                }
            };
            seen = snapshot.generation;

            let input = snapshot.frame.oriented(geometry.orientation);
            let regions = match detector.detect(&input) {
                Ok(regions) => regions,
                Err(e) => {
                    log::warn!("Detection failed on frame {}: {e}", input.index());
                    continue;
                }
            };
            log::debug!("Frame {}: {} detections", input.index(), regions.len());

            let batch = DetectionBatch {
                frame_index: input.index(),
                regions,
            };
            if batch_tx.send(batch).is_err() {
                break;
            }
        }
        detector
    })
}

/// Joins the detection thread; the display loop's error wins if both failed.
fn join_detector(
    handle: JoinHandle<Box<dyn FaceDetector>>,
    loop_result: Result<(), Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let joined = handle.join();
    loop_result?;
    joined.map(|_| ()).map_err(|_| "Detection thread panicked".into())
}
