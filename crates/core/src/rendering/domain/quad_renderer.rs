use image::RgbaImage;

use crate::shared::frame::Frame;
use crate::tracking::domain::decorated_face::DecoratedFace;

/// Draws one decoration over one face, in place.
///
/// The quad spans the face's four corners; the mirror flags flip the
/// texture horizontally and vertically.
pub trait QuadRenderer: Send {
    fn draw_quad(
        &self,
        frame: &mut Frame,
        texture: &RgbaImage,
        face: &DecoratedFace,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
