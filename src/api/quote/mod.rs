pub mod handlers;
pub mod models;

pub use handlers::quote_config;
