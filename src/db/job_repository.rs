use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::db::models::JobDocRow;
use crate::schema::job_record::{self, AdminStage, Job, JobPatch, NewJob};

/// Repository for job database operations. Jobs are stored as JSONB
/// documents; every read goes through the schema adapter so callers
/// only ever see the canonical shape.
pub struct JobRepository;

impl JobRepository {
    /// Fetch all jobs, optionally restricted to a set of lifecycle
    /// stages. Filtering happens after normalization because legacy
    /// documents spell stages inconsistently.
    pub async fn fetch_jobs(
        pool: &Pool<Postgres>,
        stages: Option<&[AdminStage]>,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let rows = sqlx::query_as::<_, JobDocRow>("SELECT id, doc FROM jobs ORDER BY created_at")
            .fetch_all(pool)
            .await?;

        debug!("Fetched {} job rows", rows.len());

        let jobs = rows
            .iter()
            .map(|row| job_record::normalize(row.id, &row.doc))
            .filter(|job| match stages {
                Some(stages) => stages.contains(&job.admin_stage),
                None => true,
            })
            .collect();

        Ok(jobs)
    }

    /// Fetch a single job by id. An unknown id is `Ok(None)`, not an
    /// error.
    pub async fn fetch_job_by_id(
        pool: &Pool<Postgres>,
        id: Uuid,
    ) -> Result<Option<Job>, sqlx::Error> {
        let row = sqlx::query_as::<_, JobDocRow>("SELECT id, doc FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|row| job_record::normalize(row.id, &row.doc)))
    }

    /// Insert a new canonical job document and return its id.
    pub async fn create_job(pool: &Pool<Postgres>, job: &NewJob) -> Result<Uuid, sqlx::Error> {
        debug!("Creating job: title={}", job.title);

        let row: (Uuid,) = sqlx::query_as("INSERT INTO jobs (doc) VALUES ($1) RETURNING id")
            .bind(job.to_document())
            .fetch_one(pool)
            .await?;

        debug!("Job created with id={}", row.0);
        Ok(row.0)
    }

    /// Merge a partial update into the stored document. The row is
    /// locked for the read-modify-write so concurrent edits cannot
    /// interleave. Returns false when the job does not exist.
    pub async fn update_job(
        pool: &Pool<Postgres>,
        id: Uuid,
        patch: &JobPatch,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let row = sqlx::query_as::<_, JobDocRow>(
            "SELECT id, doc FROM jobs WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(false);
        };

        let updated = patch.apply_to(&row.doc);
        sqlx::query("UPDATE jobs SET doc = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(updated)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("Job {} updated", id);
        Ok(true)
    }

    /// Delete a job and every application referencing it in a single
    /// transaction: either both disappear or neither does, so no
    /// orphaned applications can survive a successful call. Returns
    /// false when the job does not exist.
    pub async fn delete_job(pool: &Pool<Postgres>, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let applications_deleted = sqlx::query("DELETE FROM applications WHERE job_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let jobs_deleted = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if jobs_deleted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        debug!(
            "Job {} deleted along with {} applications",
            id, applications_deleted
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::application_repository::ApplicationRepository;

    async fn test_pool() -> Pool<Postgres> {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required for db tests");
        let pool = crate::db::connection::get_connection(&url, 2)
            .await
            .expect("connect");
        crate::db::migrations::run_migrations(&pool)
            .await
            .expect("migrate");
        pool
    }

    fn sample_job(title: &str) -> NewJob {
        NewJob {
            title: title.to_string(),
            description: "Test job".to_string(),
            location: "Sydney".to_string(),
            date: Some("2030-01-15".to_string()),
            time: Some("09:00".to_string()),
            payment: 150.0,
            admin_stage: AdminStage::Open,
            cleaners_needed: None,
            category: None,
            duration: None,
            area: None,
            status: None,
            secondary_payment: None,
        }
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
    async fn delete_job_removes_job_and_its_applications() {
        let pool = test_pool().await;

        let job_id = JobRepository::create_job(&pool, &sample_job("Cascade delete test"))
            .await
            .unwrap();
        ApplicationRepository::apply_for_job(&pool, job_id, "cascade-user", "Dana", "x")
            .await
            .unwrap()
            .expect("first application inserts");

        assert!(JobRepository::delete_job(&pool, job_id).await.unwrap());

        assert!(JobRepository::fetch_job_by_id(&pool, job_id)
            .await
            .unwrap()
            .is_none());
        let remaining: (i64,) =
            sqlx::query_as("SELECT count(*) FROM applications WHERE job_id = $1")
                .bind(job_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(remaining.0, 0);
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
    async fn stage_filter_only_returns_matching_jobs() {
        let pool = test_pool().await;

        let mut completed = sample_job("Stage filter test");
        completed.admin_stage = AdminStage::Completed;
        let completed_id = JobRepository::create_job(&pool, &completed).await.unwrap();
        let open_id = JobRepository::create_job(&pool, &sample_job("Stage filter open"))
            .await
            .unwrap();

        let jobs = JobRepository::fetch_jobs(&pool, Some(&[AdminStage::Completed]))
            .await
            .unwrap();
        assert!(jobs.iter().all(|j| j.admin_stage == AdminStage::Completed));
        assert!(jobs.iter().any(|j| j.id == completed_id));
        assert!(jobs.iter().all(|j| j.id != open_id));

        JobRepository::delete_job(&pool, completed_id).await.unwrap();
        JobRepository::delete_job(&pool, open_id).await.unwrap();
    }
}
