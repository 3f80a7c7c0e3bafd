use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Raw job row: the stored document plus its key. Normalization into
/// the canonical shape happens in the schema adapter, not here.
#[derive(Debug, FromRow)]
pub struct JobDocRow {
    pub id: Uuid,
    pub doc: Value,
}

/// Database representation of an application. `applicant_name` and
/// `status` are nullable because legacy imports may lack them.
#[derive(Debug, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: String,
    pub applicant_name: Option<String>,
    pub job_title: Option<String>,
    pub status: Option<String>,
    pub applied_at: DateTime<Utc>,
}

/// Database representation of a user profile document.
#[derive(Debug, FromRow, Serialize)]
pub struct UserProfileRow {
    pub user_id: String,
    pub profile: Value,
    pub updated_at: DateTime<Utc>,
}
