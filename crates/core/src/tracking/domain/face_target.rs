/// Where a detection says a face is, in display pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceTarget {
    pub x: f64,
    pub y: f64,
    pub half_width: f64,
    pub half_height: f64,
}

impl FaceTarget {
    pub fn new(x: f64, y: f64, half_width: f64, half_height: f64) -> Self {
        Self {
            x,
            y,
            half_width,
            half_height,
        }
    }

    /// Manhattan distance between centres.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (self.x - x).abs() + (self.y - y).abs()
    }
}
