use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::coordinate_mapper::CoordinateMapper;
use super::decorated_face::DecoratedFace;
use super::face_target::FaceTarget;
use super::face_track::{FaceTrack, TrackState};
use super::tracker_tuning::TrackerTuning;
use crate::decoration::domain::decoration_rotation::DecorationRotation;
use crate::shared::region::Region;

/// Outcome of one frame of association.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub matched: usize,
    pub created: usize,
    /// Detections beyond capacity or with no free slot left.
    pub dropped: usize,
    /// Malformed rectangles ignored before association.
    pub skipped: usize,
    /// Tracks still visible after aging.
    pub visible: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Association {
    Matched(usize),
    Created(usize),
    Dropped,
}

/// Fixed-capacity arena of face tracks plus the per-frame association pass.
///
/// Matching is greedy first-fit: each detection, in input order, goes to the
/// lowest-indexed non-empty slot whose smoothed centre lies within
/// `match_distance` (Manhattan), not to the nearest one. Unmatched detections
/// claim the lowest-indexed empty slot, or are dropped when none is left.
pub struct TrackPool {
    tracks: Vec<FaceTrack>,
    tuning: TrackerTuning,
    rotation: DecorationRotation,
    rng: StdRng,
}

impl TrackPool {
    /// `rng` drives jitter and mirror flags; the rotation has its own source.
    pub fn new(tuning: TrackerTuning, rotation: DecorationRotation, rng: StdRng) -> Self {
        let tracks = (0..tuning.capacity)
            .map(|_| FaceTrack::empty(tuning.age_empty_floor))
            .collect();
        Self {
            tracks,
            tuning,
            rotation,
            rng,
        }
    }

    pub fn with_seed(tuning: TrackerTuning, rotation: DecorationRotation, seed: u64) -> Self {
        Self::new(tuning, rotation, StdRng::seed_from_u64(seed))
    }

    /// Runs one display frame against display-space targets.
    pub fn update(&mut self, targets: &[FaceTarget]) -> FrameReport {
        let mut report = FrameReport {
            dropped: targets.len().saturating_sub(self.capacity()),
            ..FrameReport::default()
        };

        for target in targets.iter().take(self.capacity()) {
            match self.associate(target) {
                Association::Matched(_) => report.matched += 1,
                Association::Created(slot) => {
                    log::debug!(
                        "Track {slot} created at ({:.1}, {:.1})",
                        target.x,
                        target.y
                    );
                    report.created += 1;
                }
                Association::Dropped => report.dropped += 1,
            }
        }

        if report.dropped > 0 {
            log::debug!("Dropped {} detections: pool full", report.dropped);
        }

        self.advance();
        report.visible = self.visible_count();
        report
    }

    /// Truncates raw detections to capacity, discards malformed rectangles,
    /// maps the rest to display space and runs [`TrackPool::update`].
    pub fn update_from_regions(
        &mut self,
        regions: &[Region],
        mapper: &CoordinateMapper,
    ) -> FrameReport {
        let considered = &regions[..regions.len().min(self.capacity())];
        let targets: Vec<FaceTarget> = considered
            .iter()
            .filter(|r| !r.is_degenerate())
            .map(|r| mapper.to_display(r))
            .collect();

        let mut report = self.update(&targets);
        report.skipped = considered.len() - targets.len();
        report.dropped += regions.len() - considered.len();
        report
    }

    /// Render tuples for every non-empty slot, in slot order.
    pub fn decorated_faces(&self) -> impl Iterator<Item = DecoratedFace> + '_ {
        let floor = self.tuning.age_empty_floor;
        self.tracks
            .iter()
            .enumerate()
            .filter_map(move |(slot, track)| track.decorated(slot, floor))
    }

    pub fn track(&self, slot: usize) -> Option<&FaceTrack> {
        self.tracks.get(slot)
    }

    pub fn state(&self, slot: usize) -> Option<TrackState> {
        self.tracks
            .get(slot)
            .map(|t| t.state(self.tuning.age_empty_floor))
    }

    pub fn capacity(&self) -> usize {
        self.tracks.len()
    }

    pub fn visible_count(&self) -> usize {
        let floor = self.tuning.age_empty_floor;
        self.tracks.iter().filter(|t| !t.is_empty(floor)).count()
    }

    pub fn tuning(&self) -> &TrackerTuning {
        &self.tuning
    }

    fn associate(&mut self, target: &FaceTarget) -> Association {
        if let Some(slot) = self.find_match(target) {
            self.tracks[slot].refresh(target, &self.tuning);
            return Association::Matched(slot);
        }

        let Some(slot) = self.first_empty() else {
            return Association::Dropped;
        };

        let decoration = self.rotation.next();
        let mirror_horizontal = self.rng.gen_bool(0.5);
        let mirror_vertical = self.tuning.randomize_vertical_mirror && self.rng.gen_bool(0.5);
        self.tracks[slot].start(
            target,
            decoration,
            mirror_horizontal,
            mirror_vertical,
            &self.tuning,
        );
        Association::Created(slot)
    }

    fn find_match(&self, target: &FaceTarget) -> Option<usize> {
        let floor = self.tuning.age_empty_floor;
        self.tracks.iter().position(|track| {
            !track.is_empty(floor) && track.distance_to(target) < self.tuning.match_distance
        })
    }

    fn first_empty(&self) -> Option<usize> {
        let floor = self.tuning.age_empty_floor;
        self.tracks.iter().position(|track| track.is_empty(floor))
    }

    fn advance(&mut self) {
        for track in &mut self.tracks {
            track.advance(&mut self.rng, &self.tuning);
        }
    }
}
