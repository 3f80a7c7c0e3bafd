pub mod handlers;
pub mod storage;

pub use handlers::upload_config;
pub use storage::UploadStore;
