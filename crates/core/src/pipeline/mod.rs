pub mod infrastructure;
pub mod overlay_executor;
pub mod overlay_faces_use_case;
pub mod overlay_stage;
pub mod pipeline_logger;
