pub mod backend_kind;
pub mod detection_backend;
