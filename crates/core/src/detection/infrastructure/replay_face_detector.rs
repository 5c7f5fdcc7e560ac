use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Replays recorded detector output by frame index.
///
/// The recording is a JSON object keyed by frame index:
/// `{"0": [{"x": 10, "y": 20, "width": 40, "height": 40}], "3": []}`.
/// Frames missing from the recording have no faces.
pub struct ReplayFaceDetector {
    recording: Arc<HashMap<usize, Vec<Region>>>,
}

impl ReplayFaceDetector {
    pub fn new(recording: Arc<HashMap<usize, Vec<Region>>>) -> Self {
        Self { recording }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let recording: HashMap<usize, Vec<Region>> = serde_json::from_str(text)?;
        Ok(Self::new(Arc::new(recording)))
    }

    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read detections {}: {e}", path.display()))?;
        let detector = Self::from_json(&text)
            .map_err(|e| format!("Failed to parse detections {}: {e}", path.display()))?;
        log::info!(
            "Loaded detections for {} frames from {}",
            detector.recorded_frames(),
            path.display()
        );
        Ok(detector)
    }

    pub fn recorded_frames(&self) -> usize {
        self.recording.len()
    }
}

impl FaceDetector for ReplayFaceDetector {
    fn detect(&mut self, snapshot: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        Ok(self
            .recording
            .get(&snapshot.index())
            .cloned()
            .unwrap_or_default())
    }
}
