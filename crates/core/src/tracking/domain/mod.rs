pub mod coordinate_mapper;
pub mod decorated_face;
pub mod face_target;
pub mod face_track;
pub mod scalar_smoother;
pub mod size_jitter;
pub mod track_pool;
pub mod tracker_tuning;
