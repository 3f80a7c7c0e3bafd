pub mod handlers;

pub use handlers::profile_config;
