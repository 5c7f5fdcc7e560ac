use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Instant;

use crate::decoration::infrastructure::decoration_library::DecorationLibrary;
use crate::pipeline::overlay_executor::{OverlayConfig, OverlayStats};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::rendering::domain::quad_renderer::QuadRenderer;
use crate::shared::constants::SNAPSHOT_FILE_PREFIX;
use crate::shared::frame::Frame;
use crate::shared::orientation::Orientation;
use crate::shared::region::Region;
use crate::shared::video_metadata::VideoMetadata;
use crate::tracking::domain::coordinate_mapper::{CoordinateMapper, DisplayGeometry};
use crate::tracking::domain::track_pool::TrackPool;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;

/// Detections for the snapshot taken from frame `frame_index`.
pub struct DetectionBatch {
    pub frame_index: usize,
    pub regions: Vec<Region>,
}

/// Grayscale, downscaled and oriented copy of `frame`, as the detector sees it.
pub fn prepare_detection_input(
    frame: &Frame,
    geometry: &DisplayGeometry,
) -> Result<Frame, Box<dyn std::error::Error>> {
    Ok(frame
        .to_grayscale()
        .downscaled(geometry.detection_scale)?
        .oriented(geometry.orientation))
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Display-side work for one frame: track, draw, snapshot.
pub struct OverlayStage<'a> {
    pool: TrackPool,
    mapper: CoordinateMapper,
    renderer: Box<dyn QuadRenderer>,
    writer: Box<dyn ImageWriter>,
    library: &'a DecorationLibrary,
    snapshot_every: usize,
    output_dir: Option<PathBuf>,
    latest: Option<DetectionBatch>,
    stats: OverlayStats,
}

impl<'a> OverlayStage<'a> {
    pub fn new(
        pool: TrackPool,
        renderer: Box<dyn QuadRenderer>,
        writer: Box<dyn ImageWriter>,
        library: &'a DecorationLibrary,
        config: &OverlayConfig,
    ) -> Self {
        Self {
            pool,
            mapper: config.mapper,
            renderer,
            writer,
            library,
            snapshot_every: config.snapshot_every,
            output_dir: config.output_dir.clone(),
            latest: None,
            stats: OverlayStats::default(),
        }
    }

    /// Replaces the detection list used from now on.
    pub fn receive(&mut self, batch: DetectionBatch) {
        self.stats.detection_batches += 1;
        self.latest = Some(batch);
    }

    /// Runs one frame against the most recent detection list.
    pub fn process(&mut self, frame: &mut Frame, logger: &mut dyn PipelineLogger) {
        let regions = self
            .latest
            .as_ref()
            .map(|b| b.regions.as_slice())
            .unwrap_or_default();
        if let Some(batch) = &self.latest {
            logger.metric(
                "detection_lag",
                frame.index().saturating_sub(batch.frame_index) as f64,
            );
        }

        let start = Instant::now();
        let report = self.pool.update_from_regions(regions, &self.mapper);
        logger.timing("track", elapsed_ms(start));
        logger.metric("visible_tracks", report.visible as f64);
        self.stats.tracks_created += report.created;
        self.stats.detections_dropped += report.dropped;
        self.stats.detections_skipped += report.skipped;

        let start = Instant::now();
        // A rotated capture is displayed upside down; display space assumes it.
        if self.mapper.geometry().orientation == Orientation::Rotated {
            frame.rotate_half_turn();
        }
        self.render(frame);
        logger.timing("render", elapsed_ms(start));

        self.stats.frames += 1;
        if self.snapshot_every > 0 && self.stats.frames % self.snapshot_every == 0 {
            self.snapshot(frame);
        }
    }

    pub fn pool(&self) -> &TrackPool {
        &self.pool
    }

    pub fn finish(self) -> OverlayStats {
        self.stats
    }

    fn render(&self, frame: &mut Frame) {
        for face in self.pool.decorated_faces() {
            let Some(texture) = self.library.get(face.decoration) else {
                log::warn!("Track {}: unknown {}", face.slot, face.decoration);
                continue;
            };
            if let Err(e) = self.renderer.draw_quad(frame, texture, &face) {
                let name = self.library.name(face.decoration).unwrap_or_default();
                log::warn!("Track {}: failed to draw '{name}': {e}", face.slot);
            }
        }
    }

    fn snapshot(&mut self, frame: &Frame) {
        let Some(dir) = &self.output_dir else {
            return;
        };
        let path = dir.join(format!("{SNAPSHOT_FILE_PREFIX}{:06}.png", frame.index()));
        match self.writer.write(&path, frame, None) {
            Ok(()) => self.stats.snapshots_written += 1,
            Err(e) => log::warn!("Failed to write snapshot {}: {e}", path.display()),
        }
    }
}

/// Pulls frames until the source ends, `max_frames` is reached, the run is
/// cancelled or the source fails.
///
/// `detections` is called once per frame before tracking and may hand back
/// a newer detection list; `None` keeps the previous one.
pub fn run_display_loop<F>(
    reader: &mut dyn VideoReader,
    stage: &mut OverlayStage<'_>,
    metadata: &VideoMetadata,
    config: &OverlayConfig,
    logger: &mut dyn PipelineLogger,
    mut detections: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnMut(&Frame) -> Option<DetectionBatch>,
{
    let total = match config.max_frames {
        Some(max) if metadata.total_frames > 0 => max.min(metadata.total_frames),
        Some(max) => max,
        None => metadata.total_frames,
    };
    let interval = config.frame_interval.or_else(|| metadata.frame_interval());
    let mut processed = 0;

    for frame_result in reader.frames() {
        if config.cancelled.load(Ordering::Relaxed) {
            log::info!("Overlay cancelled after {processed} frames");
            break;
        }
        if config.max_frames.is_some_and(|max| processed >= max) {
            break;
        }
        let started = Instant::now();

        let mut frame = frame_result?;
        if let Some(batch) = detections(&frame) {
            stage.receive(batch);
        }
        stage.process(&mut frame, logger);
        processed += 1;

        logger.timing("frame", elapsed_ms(started));
        logger.progress(processed, total);
        if let Some(callback) = &config.on_progress {
            if !callback(processed, total) {
                log::info!("Overlay stopped by progress callback");
                break;
            }
        }

        if let Some(remaining) = interval.and_then(|i| i.checked_sub(started.elapsed())) {
            std::thread::sleep(remaining);
        }
    }

    Ok(())
}
