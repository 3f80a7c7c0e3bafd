use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::models::ApplicationRow;

/// Review status of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<ApplicationStatus> {
        match raw {
            "Pending" => Some(ApplicationStatus::Pending),
            "Accepted" => Some(ApplicationStatus::Accepted),
            "Rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }

    /// Pending is the only state an application may leave. Accepted
    /// and Rejected are terminal.
    pub fn may_transition_to(&self, next: ApplicationStatus) -> bool {
        matches!(self, ApplicationStatus::Pending) && next != ApplicationStatus::Pending
    }
}

/// Canonical application shape returned to callers. Missing status
/// coalesces to Pending and a missing display name to a placeholder.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: String,
    pub applicant_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        Application {
            id: row.id,
            job_id: row.job_id,
            user_id: row.user_id,
            applicant_name: row
                .applicant_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Anonymous".to_string()),
            job_title: row.job_title,
            status: row
                .status
                .as_deref()
                .and_then(ApplicationStatus::parse)
                .unwrap_or(ApplicationStatus::Pending),
            applied_at: row.applied_at,
        }
    }
}

/// Body for a cleaner applying to a job.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    #[validate(length(
        min = 1,
        max = 120,
        message = "Applicant name must be between 1 and 120 characters"
    ))]
    pub applicant_name: String,
}

/// Body for an administrator's decision on an application.
#[derive(Debug, Deserialize, Validate)]
pub struct DecisionRequest {
    pub status: ApplicationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: Option<&str>, name: Option<&str>) -> ApplicationRow {
        ApplicationRow {
            id: Uuid::nil(),
            job_id: Uuid::nil(),
            user_id: "uid-1".to_string(),
            applicant_name: name.map(str::to_string),
            job_title: None,
            status: status.map(str::to_string),
            applied_at: Utc::now(),
        }
    }

    #[test]
    fn missing_status_coalesces_to_pending() {
        let application = Application::from(row(None, Some("Dana")));
        assert_eq!(application.status, ApplicationStatus::Pending);
    }

    #[test]
    fn missing_name_gets_placeholder() {
        let application = Application::from(row(Some("Accepted"), None));
        assert_eq!(application.applicant_name, "Anonymous");
        assert_eq!(application.status, ApplicationStatus::Accepted);

        let blank = Application::from(row(None, Some("")));
        assert_eq!(blank.applicant_name, "Anonymous");
    }

    #[test]
    fn only_pending_may_transition() {
        use ApplicationStatus::*;
        assert!(Pending.may_transition_to(Accepted));
        assert!(Pending.may_transition_to(Rejected));
        assert!(!Pending.may_transition_to(Pending));
        assert!(!Accepted.may_transition_to(Rejected));
        assert!(!Rejected.may_transition_to(Accepted));
    }
}
