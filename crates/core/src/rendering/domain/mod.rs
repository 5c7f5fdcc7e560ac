pub mod quad_renderer;
