pub mod decoration_handle;
pub mod decoration_rotation;
