use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::api::application::models::{Application, ApplicationStatus};
use crate::db::models::ApplicationRow;

/// Outcome of a status decision.
#[derive(Debug, PartialEq, Eq)]
pub enum StatusUpdate {
    Updated,
    NotFound,
    /// The application has already left Pending; the stored status is
    /// reported so the caller can say what blocked the change.
    IllegalTransition(ApplicationStatus),
}

/// Repository for application database operations.
pub struct ApplicationRepository;

impl ApplicationRepository {
    /// Insert a Pending application with a server-assigned timestamp.
    ///
    /// The (job_id, user_id) UNIQUE constraint makes the insert
    /// conditional at the storage layer, so two concurrent applies
    /// from the same user cannot both succeed. Returns `Ok(None)`
    /// when an application for this pair already exists.
    pub async fn apply_for_job(
        pool: &Pool<Postgres>,
        job_id: Uuid,
        user_id: &str,
        applicant_name: &str,
        job_title: &str,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let inserted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO applications (job_id, user_id, applicant_name, job_title, status)
            VALUES ($1, $2, $3, $4, 'Pending')
            ON CONFLICT ON CONSTRAINT applications_job_user_unique DO NOTHING
            RETURNING id
            "#,
        )
        .bind(job_id)
        .bind(user_id)
        .bind(applicant_name)
        .bind(job_title)
        .fetch_optional(pool)
        .await?;

        match &inserted {
            Some((id,)) => debug!("Application {} created for job {}", id, job_id),
            None => debug!("Duplicate application for job {} by {}", job_id, user_id),
        }

        Ok(inserted.map(|(id,)| id))
    }

    /// Apply an administrator's decision. The stored status is read
    /// under a row lock and the transition machine enforced before
    /// writing: Pending may become Accepted or Rejected, terminal
    /// states never change.
    pub async fn update_status(
        pool: &Pool<Postgres>,
        id: Uuid,
        next: ApplicationStatus,
    ) -> Result<StatusUpdate, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current: Option<(Option<String>,)> =
            sqlx::query_as("SELECT status FROM applications WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((stored,)) = current else {
            tx.rollback().await?;
            return Ok(StatusUpdate::NotFound);
        };

        let current = stored
            .as_deref()
            .and_then(ApplicationStatus::parse)
            .unwrap_or(ApplicationStatus::Pending);

        if !current.may_transition_to(next) {
            tx.rollback().await?;
            return Ok(StatusUpdate::IllegalTransition(current));
        }

        sqlx::query("UPDATE applications SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(next.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("Application {} moved to {}", id, next.as_str());
        Ok(StatusUpdate::Updated)
    }

    /// All applications submitted by one user, newest first.
    pub async fn fetch_by_user(
        pool: &Pool<Postgres>,
        user_id: &str,
    ) -> Result<Vec<Application>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, job_id, user_id, applicant_name, job_title, status, applied_at
            FROM applications
            WHERE user_id = $1
            ORDER BY applied_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Application::from).collect())
    }

    /// Every application, newest first, for the admin review queue.
    pub async fn fetch_all(pool: &Pool<Postgres>) -> Result<Vec<Application>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, job_id, user_id, applicant_name, job_title, status, applied_at
            FROM applications
            ORDER BY applied_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Application::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::job_repository::JobRepository;
    use crate::schema::job_record::{AdminStage, NewJob};

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

    async fn seed_job(pool: &Pool<Postgres>, title: &str) -> Uuid {
        let job = NewJob {
            title: title.to_string(),
            description: String::new(),
            location: String::new(),
            date: None,
            time: None,
            payment: 100.0,
            admin_stage: AdminStage::Open,
            cleaners_needed: None,
            category: None,
            duration: None,
            area: None,
            status: None,
            secondary_payment: None,
        };
        JobRepository::create_job(pool, &job).await.unwrap()
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
    async fn second_application_for_same_pair_is_rejected() {
        let pool = test_pool().await;
        let job_id = seed_job(&pool, "Uniqueness test").await;

        let first =
            ApplicationRepository::apply_for_job(&pool, job_id, "dup-user", "Dana", "Uniqueness")
                .await
                .unwrap();
        assert!(first.is_some());

        let second =
            ApplicationRepository::apply_for_job(&pool, job_id, "dup-user", "Dana", "Uniqueness")
                .await
                .unwrap();
        assert!(second.is_none());

        JobRepository::delete_job(&pool, job_id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
    async fn decided_application_is_terminal() {
        let pool = test_pool().await;
        let job_id = seed_job(&pool, "Transition test").await;

        let id = ApplicationRepository::apply_for_job(&pool, job_id, "term-user", "Dana", "t")
            .await
            .unwrap()
            .unwrap();

        let first = ApplicationRepository::update_status(&pool, id, ApplicationStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(first, StatusUpdate::Updated);

        let second = ApplicationRepository::update_status(&pool, id, ApplicationStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(
            second,
            StatusUpdate::IllegalTransition(ApplicationStatus::Accepted)
        );

        JobRepository::delete_job(&pool, job_id).await.unwrap();
    }
}
