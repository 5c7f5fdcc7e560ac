pub mod clock_seed;
pub mod constants;
pub mod file_listing;
pub mod frame;
pub mod orientation;
pub mod region;
pub mod shared_gray_buffer;
pub mod tuning;
pub mod video_metadata;
