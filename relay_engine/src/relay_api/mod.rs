pub mod errors;
pub mod status_api;
pub mod status_objects;
