pub mod client_context_service;
pub mod log_fields;
pub mod logger_service;
pub mod pull_secret_service;
pub mod release_image_service;
