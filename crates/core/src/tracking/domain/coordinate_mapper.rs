use serde::{Deserialize, Serialize};

use super::face_target::FaceTarget;
use crate::shared::orientation::Orientation;
use crate::shared::region::Region;

/// Capture, detection and display geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayGeometry {
    pub capture_width: u32,
    pub capture_height: u32,
    pub display_width: u32,
    pub display_height: u32,
    /// Factor the grayscale snapshot is resized by before detection.
    pub detection_scale: f64,
    pub orientation: Orientation,
}

impl Default for DisplayGeometry {
    fn default() -> Self {
        Self {
            capture_width: 1920,
            capture_height: 1080,
            display_width: 1920,
            display_height: 1080,
            detection_scale: 0.5,
            orientation: Orientation::Rotated,
        }
    }
}

/// Converts detector rectangles into display-space face targets.
///
/// Undoes the detection-time downscale and orientation, re-centres the
/// rectangle, then inflates its half extents by `growth_factor` so the
/// decoration frames the whole head.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    geometry: DisplayGeometry,
    growth_factor: f64,
}

impl CoordinateMapper {
    pub fn new(geometry: DisplayGeometry, growth_factor: f64) -> Self {
        Self {
            geometry,
            growth_factor,
        }
    }

    pub fn geometry(&self) -> &DisplayGeometry {
        &self.geometry
    }

    pub fn to_display(&self, region: &Region) -> FaceTarget {
        let g = &self.geometry;
        let sx = g.display_width as f64 / g.capture_width as f64;
        let sy = g.display_height as f64 / g.capture_height as f64;
        let s = g.detection_scale;
        let (rx, ry) = (region.x as f64, region.y as f64);
        let (rw, rh) = (region.width as f64, region.height as f64);

        let (x, y, w, h) = match g.orientation {
            Orientation::Rotated => {
                let w = rh * sx / 2.0 / s;
                let h = rw * sy / 2.0 / s;
                let x = ry * sx / s + w;
                let y = g.display_height as f64 - rx * sy / s - h;
                (x, y, w, h)
            }
            Orientation::Upright => {
                let w = rw * sx / 2.0 / s;
                let h = rh * sy / 2.0 / s;
                (rx * sx / s + w, ry * sy / s + h, w, h)
            }
        };

        FaceTarget::new(x, y, w * self.growth_factor, h * self.growth_factor)
    }
}
