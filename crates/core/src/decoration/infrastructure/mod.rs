pub mod decoration_library;
