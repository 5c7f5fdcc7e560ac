use serde::{Deserialize, Serialize};

use super::scalar_smoother::{PidCoefficients, DEFAULT_POSITION_PID, DEFAULT_SIZE_PID};
use super::size_jitter::JitterTuning;

/// Tunables of the track pool and association engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerTuning {
    /// Maximum number of concurrently decorated faces.
    pub capacity: usize,
    /// Manhattan distance, in display pixels, below which a detection
    /// refreshes an existing track.
    pub match_distance: f64,
    /// Age given to a freshly matched track.
    pub age_max: i32,
    /// Negative age at which a slot is reclaimed.
    pub age_empty_floor: i32,
    /// Inflation applied to detected half extents.
    pub growth_factor: f64,
    pub jitter: JitterTuning,
    pub position_pid: PidCoefficients,
    pub size_pid: PidCoefficients,
    pub randomize_vertical_mirror: bool,
}

impl Default for TrackerTuning {
    fn default() -> Self {
        Self {
            capacity: 20,
            match_distance: 200.0,
            age_max: 5,
            age_empty_floor: -20,
            growth_factor: 1.3,
            jitter: JitterTuning::default(),
            position_pid: DEFAULT_POSITION_PID,
            size_pid: DEFAULT_SIZE_PID,
            randomize_vertical_mirror: false,
        }
    }
}

impl TrackerTuning {
    /// Frames from the last match until the slot is reclaimed.
    pub fn reclaim_frames(&self) -> u32 {
        (self.age_max as i64 - self.age_empty_floor as i64).max(0) as u32
    }
}
