pub mod decoration;
pub mod detection;
pub mod pipeline;
pub mod rendering;
pub mod shared;
pub mod tracking;
pub mod video;
