use serde::{Deserialize, Serialize};

/// How the detection image is laid out relative to the captured frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Detection runs on the frame as captured.
    Upright,
    /// Detection runs on the frame transposed then flipped vertically, for a
    /// camera mounted a quarter turn from the display.
    #[default]
    Rotated,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Upright => write!(f, "upright"),
            Orientation::Rotated => write!(f, "rotated"),
        }
    }
}

impl std::str::FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upright" => Ok(Orientation::Upright),
            "rotated" => Ok(Orientation::Rotated),
            other => Err(format!(
                "Orientation must be 'upright' or 'rotated', got '{other}'"
            )),
        }
    }
}
