use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Finds faces in a detection snapshot.
///
/// The snapshot is the downscaled, oriented grayscale image. Rectangles come
/// back in its pixel space, in no particular order, possibly overlapping.
/// `&mut self` leaves room for detectors that keep state between calls.
pub trait FaceDetector: Send {
    fn detect(&mut self, snapshot: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
