use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    /// Nominal playback rate; 0 when the source carries none.
    pub fps: f64,
    pub total_frames: usize,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Seconds per frame at the nominal rate, if there is one.
    pub fn frame_interval(&self) -> Option<std::time::Duration> {
        (self.fps > 0.0).then(|| std::time::Duration::from_secs_f64(1.0 / self.fps))
    }
}
