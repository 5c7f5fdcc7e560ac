/// Frame source file types, matched case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Decorations must carry alpha, so only PNG is accepted.
pub const DECORATION_EXTENSIONS: &[&str] = &["png"];

/// Rotation picks discarded at startup so the first faces do not always get
/// the head of the sorted decoration list.
pub const DEFAULT_ROTATION_WARMUP: usize = 100;

/// Detection lists buffered between the detection thread and the display loop.
pub const DETECTION_CHANNEL_CAPACITY: usize = 4;

pub const SNAPSHOT_FILE_PREFIX: &str = "frame_";

pub const TUNING_FILE_NAME: &str = "tuning.json";
pub const CONFIG_DIR_NAME: &str = "Narkissos";
