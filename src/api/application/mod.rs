pub mod handlers;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use handlers::application_config;
pub use service::ApplicationService;
