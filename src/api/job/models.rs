use serde::Deserialize;
use validator::Validate;

use crate::schema::job_record::{AdminStage, JobPatch, NewJob, UrgencyTag};

/// Body for creating a job.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewJobRequest {
    #[validate(length(
        min = 3,
        max = 120,
        message = "Title must be between 3 and 120 characters"
    ))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub date: Option<String>,
    pub time: Option<String>,
    #[validate(range(min = 0.0, message = "Payment must not be negative"))]
    pub payment: f64,
    pub admin_stage: Option<AdminStage>,
    pub cleaners_needed: Option<u32>,
    pub category: Option<String>,
    pub duration: Option<String>,
    pub area: Option<String>,
    pub status: Option<UrgencyTag>,
    #[validate(range(min = 0.0, message = "Secondary payment must not be negative"))]
    pub secondary_payment: Option<f64>,
}

impl NewJobRequest {
    pub fn into_new_job(self) -> NewJob {
        NewJob {
            title: self.title,
            description: self.description,
            location: self.location,
            date: self.date,
            time: self.time,
            payment: self.payment,
            admin_stage: self.admin_stage.unwrap_or(AdminStage::Open),
            cleaners_needed: self.cleaners_needed,
            category: self.category,
            duration: self.duration,
            area: self.area,
            status: self.status,
            secondary_payment: self.secondary_payment,
        }
    }
}

/// Body for a partial job update. Every field is optional; omitted
/// fields keep their stored values, except the secondary payment
/// which is cleared when absent.
#[derive(Debug, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobPatchRequest {
    #[validate(length(
        min = 3,
        max = 120,
        message = "Title must be between 3 and 120 characters"
    ))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[validate(range(min = 0.0, message = "Payment must not be negative"))]
    pub payment: Option<f64>,
    pub admin_stage: Option<AdminStage>,
    pub cleaners_needed: Option<u32>,
    pub assigned_to: Option<String>,
    pub category: Option<String>,
    pub duration: Option<String>,
    pub area: Option<String>,
    pub status: Option<UrgencyTag>,
    #[validate(range(min = 0.0, message = "Secondary payment must not be negative"))]
    pub secondary_payment: Option<f64>,
}

impl JobPatchRequest {
    pub fn into_patch(self) -> JobPatch {
        JobPatch {
            title: self.title,
            description: self.description,
            location: self.location,
            date: self.date,
            time: self.time,
            payment: self.payment,
            admin_stage: self.admin_stage,
            cleaners_needed: self.cleaners_needed,
            assigned_to: self.assigned_to,
            category: self.category,
            duration: self.duration,
            area: self.area,
            status: self.status,
            secondary_payment: self.secondary_payment,
        }
    }
}

/// Optional `?stage=` query on the job listing. Accepts a single
/// stage or a comma-separated set.
#[derive(Debug, Deserialize)]
pub struct StageQuery {
    pub stage: Option<String>,
}

pub fn parse_stage_filter(raw: &str) -> Result<Vec<AdminStage>, String> {
    let mut stages = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match AdminStage::parse(part) {
            Some(stage) => stages.push(stage),
            None => return Err(format!("Unknown stage: {}", part)),
        }
    }
    if stages.is_empty() {
        return Err("No stage given".to_string());
    }
    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_stage_parses() {
        assert_eq!(
            parse_stage_filter("Completed").unwrap(),
            vec![AdminStage::Completed]
        );
    }

    #[test]
    fn comma_separated_stages_parse() {
        assert_eq!(
            parse_stage_filter("Open, Closed").unwrap(),
            vec![AdminStage::Open, AdminStage::Closed]
        );
    }

    #[test]
    fn unknown_stage_is_an_error() {
        assert!(parse_stage_filter("Archived").is_err());
        assert!(parse_stage_filter("").is_err());
    }

    #[test]
    fn new_job_request_defaults_stage_to_open() {
        let request = NewJobRequest {
            title: "Clean".to_string(),
            description: String::new(),
            location: String::new(),
            date: None,
            time: None,
            payment: 100.0,
            admin_stage: None,
            cleaners_needed: None,
            category: None,
            duration: None,
            area: None,
            status: None,
            secondary_payment: None,
        };
        assert_eq!(request.into_new_job().admin_stage, AdminStage::Open);
    }
}
