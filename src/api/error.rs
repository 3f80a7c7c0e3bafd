use actix_web::{HttpResponse, ResponseError};
use std::fmt;
use tracing::{error, warn};

use crate::api::application::models::ApplicationStatus;
use crate::api::validation::ErrorResponse;

/// Service-level errors shared by every handler module.
#[derive(Debug)]
pub enum ServiceError {
    /// Database operation failed
    DatabaseError(sqlx::Error),

    /// Validation failed
    ValidationError(String),

    /// A referenced record does not exist
    NotFound(String),

    /// The user already has an application for this job
    DuplicateApplication,

    /// The application has already been decided
    IllegalTransition(ApplicationStatus),

    /// Missing or invalid bearer token
    Unauthorized(&'static str),

    /// Authenticated, but not allowed to touch this resource
    Forbidden,

    /// The plan-generation upstream failed or returned garbage
    PlanGeneration(String),

    /// Writing an uploaded file failed
    Storage(std::io::Error),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::DatabaseError(e) => write!(f, "Database error: {}", e),
            ServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ServiceError::NotFound(what) => write!(f, "{} not found", what),
            ServiceError::DuplicateApplication => {
                write!(f, "An application for this job already exists")
            }
            ServiceError::IllegalTransition(current) => {
                write!(f, "Application is already {}", current.as_str())
            }
            ServiceError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ServiceError::Forbidden => write!(f, "Forbidden"),
            ServiceError::PlanGeneration(msg) => write!(f, "Plan generation failed: {}", msg),
            ServiceError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::DatabaseError(err)
    }
}

impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::DatabaseError(e) => {
                error!("Database error: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to process request".to_string(),
                    fields: serde_json::json!({"message": "Database error occurred"}),
                })
            }
            ServiceError::ValidationError(msg) => {
                warn!("Validation error: {}", msg);
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Validation failed".to_string(),
                    fields: serde_json::json!({"message": msg}),
                })
            }
            ServiceError::NotFound(what) => {
                warn!("{} not found", what);
                HttpResponse::NotFound().json(ErrorResponse {
                    error: "Not found".to_string(),
                    fields: serde_json::json!({"message": format!("{} not found", what)}),
                })
            }
            ServiceError::DuplicateApplication => {
                warn!("Duplicate application rejected");
                HttpResponse::Conflict().json(ErrorResponse {
                    error: "Duplicate application".to_string(),
                    fields: serde_json::json!({
                        "message": "You have already applied for this job"
                    }),
                })
            }
            ServiceError::IllegalTransition(current) => {
                warn!("Illegal status transition from {}", current.as_str());
                HttpResponse::Conflict().json(ErrorResponse {
                    error: "Illegal status transition".to_string(),
                    fields: serde_json::json!({
                        "message": format!(
                            "Application is already {} and can no longer change",
                            current.as_str()
                        )
                    }),
                })
            }
            ServiceError::Unauthorized(msg) => {
                warn!("Unauthorized request: {}", msg);
                HttpResponse::Unauthorized().json(ErrorResponse {
                    error: "Unauthorized".to_string(),
                    fields: serde_json::json!({"message": *msg}),
                })
            }
            ServiceError::Forbidden => {
                warn!("Forbidden request");
                HttpResponse::Forbidden().json(ErrorResponse {
                    error: "Forbidden".to_string(),
                    fields: serde_json::json!({
                        "message": "You do not have access to this resource"
                    }),
                })
            }
            ServiceError::PlanGeneration(msg) => {
                error!("Plan generation failed: {}", msg);
                HttpResponse::BadGateway().json(ErrorResponse {
                    error: "Plan generation failed".to_string(),
                    fields: serde_json::json!({
                        "message": "We had trouble generating your plan. \
                                    Please check your inputs or try again later."
                    }),
                })
            }
            ServiceError::Storage(e) => {
                error!("Upload failed: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Upload failed".to_string(),
                    fields: serde_json::json!({
                        "message": "Something went wrong during the file upload"
                    }),
                })
            }
        }
    }
}
