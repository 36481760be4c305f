pub mod constants;
pub mod conversion;
pub mod events;
pub mod head_direction;
pub mod kinematics;
pub mod object_frame;
pub mod object_vector;
pub mod processing;
pub mod readers;
pub mod run_phase;
pub mod spatial_info;
pub mod track_errors;
pub mod trajectory;
