use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::DEFAULT_ROTATION_WARMUP;
use crate::tracking::domain::coordinate_mapper::DisplayGeometry;
use crate::tracking::domain::tracker_tuning::TrackerTuning;

#[derive(Error, Debug)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Every tunable of a run. Missing JSON fields keep their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub tracker: TrackerTuning,
    pub geometry: DisplayGeometry,
    /// Rotation picks discarded before the first face is decorated.
    pub rotation_warmup: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tracker: TrackerTuning::default(),
            geometry: DisplayGeometry::default(),
            rotation_warmup: DEFAULT_ROTATION_WARMUP,
        }
    }
}

impl Tuning {
    /// Reads and validates a JSON tuning file.
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let text = fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning: Tuning = serde_json::from_str(&text).map_err(|source| TuningError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tuning.validate()?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let t = &self.tracker;
        let g = &self.geometry;
        let invalid = |msg: String| Err(TuningError::Invalid(msg));

        if t.capacity == 0 {
            return invalid("capacity must be at least 1".into());
        }
        if t.age_max < 1 {
            return invalid(format!("age_max must be at least 1, got {}", t.age_max));
        }
        if t.age_empty_floor >= 0 {
            return invalid(format!(
                "age_empty_floor must be negative, got {}",
                t.age_empty_floor
            ));
        }
        if t.match_distance.is_nan() || t.match_distance <= 0.0 {
            return invalid(format!(
                "match_distance must be positive, got {}",
                t.match_distance
            ));
        }
        if t.growth_factor.is_nan() || t.growth_factor <= 0.0 {
            return invalid(format!(
                "growth_factor must be positive, got {}",
                t.growth_factor
            ));
        }
        if t.jitter.noise_factor.is_nan() || t.jitter.noise_factor < 0.0 {
            return invalid(format!(
                "jitter.noise_factor must not be negative, got {}",
                t.jitter.noise_factor
            ));
        }
        if t.jitter.min_timeout < 0 || t.jitter.min_timeout > t.jitter.max_timeout {
            return invalid(format!(
                "jitter timeouts must satisfy 0 <= min <= max, got {}..{}",
                t.jitter.min_timeout, t.jitter.max_timeout
            ));
        }
        if g.capture_width == 0 || g.capture_height == 0 {
            return invalid("capture size must be non-zero".into());
        }
        if g.display_width == 0 || g.display_height == 0 {
            return invalid("display size must be non-zero".into());
        }
        if g.detection_scale.is_nan() || g.detection_scale <= 0.0 {
            return invalid(format!(
                "detection_scale must be positive, got {}",
                g.detection_scale
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::orientation::Orientation;
    use rstest::rstest;

    fn write(dir: &Path, text: &str) -> PathBuf {
        let path = dir.join("tuning.json");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.rotation_warmup, 100);
        assert_eq!(tuning.geometry.orientation, Orientation::Rotated);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            r#"{
                "tracker": { "capacity": 4, "jitter": { "noise_factor": 5.0 } },
                "geometry": { "orientation": "upright" }
            }"#,
        );

        let tuning = Tuning::load(&path).unwrap();

        assert_eq!(tuning.tracker.capacity, 4);
        assert_eq!(tuning.tracker.age_max, 5);
        assert_eq!(tuning.tracker.jitter.noise_factor, 5.0);
        assert_eq!(tuning.tracker.jitter.max_timeout, 30);
        assert_eq!(tuning.geometry.orientation, Orientation::Upright);
        assert_eq!(tuning.geometry.capture_width, 1920);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Tuning::load(Path::new("/nonexistent/tuning.json")).unwrap_err();
        assert!(matches!(err, TuningError::Io { .. }));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "{ not json");
        let err = Tuning::load(&path).unwrap_err();
        assert!(matches!(err, TuningError::Parse { .. }));
        assert!(err.to_string().contains("tuning.json"));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), r#"{ "tracker": { "capacity": 0 } }"#);
        let err = Tuning::load(&path).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
    }

    #[rstest]
    #[case::zero_capacity(|t: &mut Tuning| t.tracker.capacity = 0)]
    #[case::zero_age_max(|t: &mut Tuning| t.tracker.age_max = 0)]
    #[case::non_negative_floor(|t: &mut Tuning| t.tracker.age_empty_floor = 0)]
    #[case::zero_distance(|t: &mut Tuning| t.tracker.match_distance = 0.0)]
    #[case::nan_distance(|t: &mut Tuning| t.tracker.match_distance = f64::NAN)]
    #[case::negative_growth(|t: &mut Tuning| t.tracker.growth_factor = -1.0)]
    #[case::negative_noise(|t: &mut Tuning| t.tracker.jitter.noise_factor = -0.5)]
    #[case::inverted_timeouts(|t: &mut Tuning| t.tracker.jitter.min_timeout = 40)]
    #[case::negative_timeout(|t: &mut Tuning| t.tracker.jitter.min_timeout = -1)]
    #[case::zero_capture(|t: &mut Tuning| t.geometry.capture_width = 0)]
    #[case::zero_display(|t: &mut Tuning| t.geometry.display_height = 0)]
    #[case::zero_scale(|t: &mut Tuning| t.geometry.detection_scale = 0.0)]
    fn test_validate_rejects(#[case] mutate: fn(&mut Tuning)) {
        let mut tuning = Tuning::default();
        mutate(&mut tuning);
        assert!(matches!(tuning.validate(), Err(TuningError::Invalid(_))));
    }
}
