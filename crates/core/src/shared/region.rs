use serde::{Deserialize, Serialize};

/// Axis-aligned detector output in detection-image pixels.
///
/// `(x, y)` is the top-left corner of the downscaled, oriented image the
/// detector ran on; conversion to display space is the coordinate mapper's job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle with no area cannot be tracked and is skipped.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::zero_width(Region::new(0, 0, 0, 10), true)]
    #[case::zero_height(Region::new(0, 0, 10, 0), true)]
    #[case::negative_width(Region::new(5, 5, -3, 10), true)]
    #[case::normal(Region::new(5, 5, 3, 10), false)]
    fn test_is_degenerate(#[case] region: Region, #[case] expected: bool) {
        assert_eq!(region.is_degenerate(), expected);
    }

    #[test]
    fn test_deserializes_from_json() {
        let region: Region =
            serde_json::from_str(r#"{"x": 1, "y": 2, "width": 3, "height": 4}"#).unwrap();
        assert_eq!(region, Region::new(1, 2, 3, 4));
    }
}
