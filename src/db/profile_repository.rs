use serde_json::Value;
use sqlx::{Pool, Postgres};
use tracing::debug;

use crate::db::models::UserProfileRow;

/// Repository for per-user profile documents.
pub struct ProfileRepository;

impl ProfileRepository {
    /// Fetch a profile document; unknown users are `Ok(None)`.
    pub async fn fetch_user_profile(
        pool: &Pool<Postgres>,
        user_id: &str,
    ) -> Result<Option<UserProfileRow>, sqlx::Error> {
        sqlx::query_as::<_, UserProfileRow>(
            "SELECT user_id, profile, updated_at FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Merge-set a partial profile update. The JSONB concatenation
    /// preserves stored fields that the partial update does not carry,
    /// and creates the row on first write.
    pub async fn update_user_profile(
        pool: &Pool<Postgres>,
        user_id: &str,
        partial: &Value,
    ) -> Result<UserProfileRow, sqlx::Error> {
        let row = sqlx::query_as::<_, UserProfileRow>(
            r#"
            INSERT INTO users (user_id, profile)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
            SET profile = users.profile || EXCLUDED.profile,
                updated_at = now()
            RETURNING user_id, profile, updated_at
            "#,
        )
        .bind(user_id)
        .bind(partial)
        .fetch_one(pool)
        .await?;

        debug!("Profile for {} updated", user_id);
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

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

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
    async fn partial_update_preserves_existing_fields() {
        let pool = test_pool().await;
        let uid = format!("merge-user-{}", uuid::Uuid::new_v4());

        ProfileRepository::update_user_profile(
            &pool,
            &uid,
            &json!({ "name": "Dana", "phone": "0400 000 000" }),
        )
        .await
        .unwrap();

        let row = ProfileRepository::update_user_profile(
            &pool,
            &uid,
            &json!({ "phone": "0400 111 111" }),
        )
        .await
        .unwrap();

        assert_eq!(row.profile["name"], json!("Dana"));
        assert_eq!(row.profile["phone"], json!("0400 111 111"));

        sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(&uid)
            .execute(&pool)
            .await
            .unwrap();
    }
}
