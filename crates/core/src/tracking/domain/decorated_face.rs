use crate::decoration::domain::decoration_handle::DecorationHandle;

/// Everything the renderer needs to draw one tracked face for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecoratedFace {
    pub slot: usize,
    pub center_x: f64,
    pub center_y: f64,
    pub half_width: f64,
    pub half_height: f64,
    pub decoration: DecorationHandle,
    pub mirror_horizontal: bool,
    pub mirror_vertical: bool,
}

impl DecoratedFace {
    /// Quad corners: top-left, bottom-left, bottom-right, top-right.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let (x, y) = (self.center_x, self.center_y);
        let (w, h) = (self.half_width, self.half_height);
        [(x - w, y - h), (x - w, y + h), (x + w, y + h), (x + w, y - h)]
    }

    pub fn has_area(&self) -> bool {
        self.half_width > 0.0 && self.half_height > 0.0
    }
}
