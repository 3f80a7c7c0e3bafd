pub mod application;
pub mod auth;
pub mod error;
pub mod health;
pub mod job;
pub mod profile;
pub mod quote;
pub mod upload;
pub mod validation;
