pub mod cpu_quad_compositor;
