use serde::Serialize;
use uuid::Uuid;

/// Response for single job creation
#[derive(Serialize)]
pub struct JobCreatedResponse {
    pub message: String,
    pub id: Uuid,
}

/// Response for updates and deletions
#[derive(Serialize)]
pub struct StatusMessage {
    pub message: String,
}
