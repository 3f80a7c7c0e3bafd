use sqlx::{Pool, Postgres};
use tracing::{error, info};
use uuid::Uuid;

use super::models::{Application, ApplicationStatus};
use crate::api::error::ServiceError;
use crate::db::application_repository::{ApplicationRepository, StatusUpdate};
use crate::db::job_repository::JobRepository;

/// Application service containing business logic
pub struct ApplicationService {
    pool: Pool<Postgres>,
}

impl ApplicationService {
    /// Create a new ApplicationService instance
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Apply for a job. The job must exist; its current title is
    /// snapshotted onto the application. The storage-level uniqueness
    /// constraint rejects a second application for the same
    /// (job, user) pair.
    pub async fn apply(
        &self,
        job_id: Uuid,
        user_id: &str,
        applicant_name: &str,
    ) -> Result<Uuid, ServiceError> {
        let job = JobRepository::fetch_job_by_id(&self.pool, job_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Job".to_string()))?;

        let inserted =
            ApplicationRepository::apply_for_job(&self.pool, job_id, user_id, applicant_name, &job.title)
                .await?;

        match inserted {
            Some(id) => {
                info!("Service: {} applied for job {}", user_id, job_id);
                Ok(id)
            }
            None => Err(ServiceError::DuplicateApplication),
        }
    }

    /// Record an administrator's decision.
    pub async fn decide(&self, id: Uuid, status: ApplicationStatus) -> Result<(), ServiceError> {
        match ApplicationRepository::update_status(&self.pool, id, status).await? {
            StatusUpdate::Updated => {
                info!("Service: Application {} moved to {}", id, status.as_str());
                Ok(())
            }
            StatusUpdate::NotFound => Err(ServiceError::NotFound("Application".to_string())),
            StatusUpdate::IllegalTransition(current) => {
                Err(ServiceError::IllegalTransition(current))
            }
        }
    }

    /// One user's applications. Read failures degrade to empty.
    pub async fn list_for_user(&self, user_id: &str) -> Vec<Application> {
        match ApplicationRepository::fetch_by_user(&self.pool, user_id).await {
            Ok(applications) => applications,
            Err(e) => {
                error!("Failed to fetch applications for {}: {}", user_id, e);
                Vec::new()
            }
        }
    }

    /// Every application, for the admin review queue. Read failures
    /// degrade to empty.
    pub async fn list_all(&self) -> Vec<Application> {
        match ApplicationRepository::fetch_all(&self.pool).await {
            Ok(applications) => applications,
            Err(e) => {
                error!("Failed to fetch applications: {}", e);
                Vec::new()
            }
        }
    }
}
