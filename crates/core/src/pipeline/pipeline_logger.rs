use std::collections::BTreeMap;
use std::time::Instant;

/// Observer for the overlay runtime: progress, per-stage timings, metrics.
///
/// Keeps the display loop free of any particular output mechanism.
pub trait PipelineLogger: Send {
    /// `total` is 0 when the source length is unknown.
    fn progress(&mut self, current: usize, total: usize);

    /// Duration of one named stage for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Point-in-time value such as visible tracks or detection lag.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// End-of-run report. Default: nothing.
    fn summary(&self) {}
}

/// Discards everything. Used by tests and embedders with their own reporting.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

#[derive(Default)]
struct Series {
    count: usize,
    sum: f64,
    max: f64,
}

impl Series {
    fn push(&mut self, value: f64) {
        if self.count == 0 || value > self.max {
            self.max = value;
        }
        self.count += 1;
        self.sum += value;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Reports through the `log` facade, throttled to every `throttle_frames`
/// frames, and keeps running aggregates for the summary.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: BTreeMap<String, Series>,
    metrics: BTreeMap<String, Series>,
    start_time: Instant,
    frames: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            start_time: Instant::now(),
            frames: 0,
        }
    }

    /// Formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Overlay summary ({} frames, {elapsed_s:.1}s):",
            self.frames
        )];

        for (stage, series) in &self.timings {
            lines.push(format!(
                "  {stage:10}: avg {:6.2}ms  max {:7.2}ms",
                series.mean(),
                series.max
            ));
        }
        for (name, series) in &self.metrics {
            lines.push(format!(
                "  {name}: avg {:.1}  max {:.0}",
                series.mean(),
                series.max
            ));
        }
        if self.frames > 0 && elapsed_s > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} fps",
                self.frames as f64 / elapsed_s
            ));
        }

        Some(lines.join("\n"))
    }

    pub fn mean_timing(&self, stage: &str) -> Option<f64> {
        self.timings.get(stage).map(Series::mean)
    }

    pub fn max_metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).map(|s| s.max)
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames = current;
        if current % self.throttle_frames != 0 && current != total {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Frame {current}/{total} ({pct:.1}%)");
        } else {
            log::info!("Frame {current}");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 0);
        logger.timing("track", 1.0);
        logger.metric("visible_tracks", 2.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_mean() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("render", 2.0);
        logger.timing("render", 4.0);
        logger.timing("track", 1.0);

        assert_relative_eq!(logger.mean_timing("render").unwrap(), 3.0);
        assert_relative_eq!(logger.mean_timing("track").unwrap(), 1.0);
        assert!(logger.mean_timing("detect").is_none());
    }

    #[test]
    fn test_metric_max_handles_negatives() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.metric("lag", -3.0);
        logger.metric("lag", -1.0);
        logger.metric("lag", -2.0);
        assert_relative_eq!(logger.max_metric("lag").unwrap(), -1.0);
    }

    #[test]
    fn test_summary_lists_stages_and_metrics() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.progress(10, 10);
        logger.timing("render", 5.0);
        logger.metric("visible_tracks", 3.0);
        logger.metric("visible_tracks", 4.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.starts_with("Overlay summary (10 frames"));
        assert!(summary.contains("render"));
        assert!(summary.contains("visible_tracks: avg 3.5  max 4"));
    }

    #[test]
    fn test_empty_summary_is_none() {
        assert!(StdoutPipelineLogger::new(10).summary_string().is_none());
    }

    #[test]
    fn test_progress_tracks_frame_count_with_unknown_total() {
        let mut logger = StdoutPipelineLogger::new(5);
        for i in 1..=12 {
            logger.progress(i, 0);
        }
        assert_eq!(logger.frames, 12);
    }

    #[test]
    fn test_throttle_never_zero() {
        assert_eq!(StdoutPipelineLogger::new(0).throttle_frames, 1);
        assert_eq!(StdoutPipelineLogger::default().throttle_frames, 30);
    }
}
