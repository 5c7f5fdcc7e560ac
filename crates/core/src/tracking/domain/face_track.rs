use rand::Rng;

use super::decorated_face::DecoratedFace;
use super::face_target::FaceTarget;
use super::scalar_smoother::ScalarSmoother;
use super::size_jitter::SizeJitter;
use super::tracker_tuning::TrackerTuning;
use crate::decoration::domain::decoration_handle::DecorationHandle;

/// Lifecycle of a pool slot, derived from its age.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackState {
    /// Free for a new detection.
    Empty,
    /// Matched within the last `age_max` frames.
    Active,
    /// Unmatched and shrinking, but still eligible for a match.
    Decaying,
}

/// One persistent face slot: four smoothed channels plus lifecycle state.
#[derive(Clone, Debug)]
pub struct FaceTrack {
    x: ScalarSmoother,
    y: ScalarSmoother,
    half_width: ScalarSmoother,
    half_height: ScalarSmoother,
    age: i32,
    decoration: Option<DecorationHandle>,
    mirror_horizontal: bool,
    mirror_vertical: bool,
    jitter: SizeJitter,
}

impl FaceTrack {
    pub fn empty(age_empty_floor: i32) -> Self {
        Self {
            x: ScalarSmoother::default(),
            y: ScalarSmoother::default(),
            half_width: ScalarSmoother::default(),
            half_height: ScalarSmoother::default(),
            age: age_empty_floor,
            decoration: None,
            mirror_horizontal: false,
            mirror_vertical: false,
            jitter: SizeJitter::default(),
        }
    }

    pub fn state(&self, age_empty_floor: i32) -> TrackState {
        if self.age <= age_empty_floor {
            TrackState::Empty
        } else if self.age > 0 {
            TrackState::Active
        } else {
            TrackState::Decaying
        }
    }

    pub fn is_empty(&self, age_empty_floor: i32) -> bool {
        self.state(age_empty_floor) == TrackState::Empty
    }

    /// Claims the slot for a new face.
    ///
    /// Position is hard-set; size grows from zero through the smoother so the
    /// decoration pops in rather than appearing at full size.
    pub fn start(
        &mut self,
        target: &FaceTarget,
        decoration: DecorationHandle,
        mirror_horizontal: bool,
        mirror_vertical: bool,
        tuning: &TrackerTuning,
    ) {
        self.x.assign(target.x);
        self.y.assign(target.y);
        self.half_width.assign(0.0);
        self.half_height.assign(0.0);

        self.decoration = Some(decoration);
        self.mirror_horizontal = mirror_horizontal;
        self.mirror_vertical = mirror_vertical;

        self.half_width.update(target.half_width, &tuning.size_pid);
        self.half_height.update(target.half_height, &tuning.size_pid);

        self.age = tuning.age_max;
    }

    /// Feeds a matching detection; size targets carry the current jitter.
    pub fn refresh(&mut self, target: &FaceTarget, tuning: &TrackerTuning) {
        self.x.update(target.x, &tuning.position_pid);
        self.y.update(target.y, &tuning.position_pid);
        self.half_width.update(
            target.half_width + self.jitter.width.amplitude(),
            &tuning.size_pid,
        );
        self.half_height.update(
            target.half_height + self.jitter.height.amplitude(),
            &tuning.size_pid,
        );
        self.age = tuning.age_max;
    }

    /// End-of-frame bookkeeping: age, shrink once past zero, tick jitter.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, tuning: &TrackerTuning) {
        if self.age > tuning.age_empty_floor {
            self.age -= 1;
        }

        if self.age < 0 {
            self.half_width.update(0.0, &tuning.size_pid);
            self.half_height.update(0.0, &tuning.size_pid);
        }

        self.jitter.tick(rng, &tuning.jitter);
    }

    pub fn distance_to(&self, target: &FaceTarget) -> f64 {
        target.distance_to(self.x.value(), self.y.value())
    }

    /// Render tuple for a visible track; `None` for empty or never-used slots.
    pub fn decorated(&self, slot: usize, age_empty_floor: i32) -> Option<DecoratedFace> {
        if self.is_empty(age_empty_floor) {
            return None;
        }
        let decoration = self.decoration?;
        Some(DecoratedFace {
            slot,
            center_x: self.x.value(),
            center_y: self.y.value(),
            half_width: self.half_width.value(),
            half_height: self.half_height.value(),
            decoration,
            mirror_horizontal: self.mirror_horizontal,
            mirror_vertical: self.mirror_vertical,
        })
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x.value(), self.y.value())
    }

    pub fn half_extent(&self) -> (f64, f64) {
        (self.half_width.value(), self.half_height.value())
    }

    pub fn decoration(&self) -> Option<DecorationHandle> {
        self.decoration
    }

    pub fn mirror(&self) -> (bool, bool) {
        (self.mirror_horizontal, self.mirror_vertical)
    }

    pub fn jitter(&self) -> &SizeJitter {
        &self.jitter
    }
}
