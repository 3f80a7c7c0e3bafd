use sqlx::{Pool, Postgres};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::error::ServiceError;
use crate::db::job_repository::JobRepository;
use crate::schema::job_record::{AdminStage, Job, JobPatch, NewJob};

/// Job service containing business logic
pub struct JobService {
    pool: Pool<Postgres>,
}

impl JobService {
    /// Create a new JobService instance
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List jobs, optionally filtered to a set of stages. Read
    /// failures degrade to an empty list rather than an error page;
    /// the failure is logged.
    pub async fn list_jobs(&self, stages: Option<&[AdminStage]>) -> Vec<Job> {
        match JobRepository::fetch_jobs(&self.pool, stages).await {
            Ok(jobs) => jobs,
            Err(e) => {
                error!("Failed to fetch jobs: {}", e);
                Vec::new()
            }
        }
    }

    /// Fetch one job. Read failures degrade to absent.
    pub async fn get_job(&self, id: Uuid) -> Option<Job> {
        match JobRepository::fetch_job_by_id(&self.pool, id).await {
            Ok(job) => job,
            Err(e) => {
                error!("Failed to fetch job {}: {}", id, e);
                None
            }
        }
    }

    pub async fn create_job(&self, job: NewJob) -> Result<Uuid, ServiceError> {
        info!("Service: Creating job with title={}", job.title);
        let id = JobRepository::create_job(&self.pool, &job).await?;
        info!("Service: Job created successfully with id={}", id);
        Ok(id)
    }

    pub async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<(), ServiceError> {
        let found = JobRepository::update_job(&self.pool, id, &patch).await?;
        if !found {
            return Err(ServiceError::NotFound("Job".to_string()));
        }
        info!("Service: Job {} updated", id);
        Ok(())
    }

    /// Delete a job and its applications atomically.
    pub async fn delete_job(&self, id: Uuid) -> Result<(), ServiceError> {
        let found = JobRepository::delete_job(&self.pool, id).await?;
        if !found {
            return Err(ServiceError::NotFound("Job".to_string()));
        }
        info!("Service: Job {} deleted with its applications", id);
        Ok(())
    }
}
