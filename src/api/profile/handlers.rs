use actix_web::{
    HttpResponse, Responder, get, put,
    web::{Data, Json, ServiceConfig, scope},
};
use serde_json::Value;
use sqlx::{Pool, Postgres};
use tracing::error;

use crate::api::auth::Identity;
use crate::api::error::ServiceError;
use crate::db::profile_repository::ProfileRepository;

/// The caller's profile document. Unknown users (and failed reads,
/// which degrade to absent) get a 404.
#[get("")]
async fn get_profile(
    ident: Identity,
    pool: Data<Pool<Postgres>>,
) -> Result<HttpResponse, ServiceError> {
    let row = match ProfileRepository::fetch_user_profile(&pool, &ident.uid).await {
        Ok(row) => row,
        Err(e) => {
            error!("Failed to fetch profile for {}: {}", ident.uid, e);
            None
        }
    };

    match row {
        Some(row) => Ok(HttpResponse::Ok().json(row)),
        None => Err(ServiceError::NotFound("Profile".to_string())),
    }
}

/// Merge a partial profile update. Fields absent from the body keep
/// their stored values; the row is created on first write.
#[put("")]
async fn update_profile(
    ident: Identity,
    pool: Data<Pool<Postgres>>,
    body: Json<Value>,
) -> Result<impl Responder, ServiceError> {
    let partial = body.into_inner();
    if !partial.is_object() {
        return Err(ServiceError::ValidationError(
            "Profile update must be a JSON object".to_string(),
        ));
    }

    let row = ProfileRepository::update_user_profile(&pool, &ident.uid, &partial).await?;
    Ok(HttpResponse::Ok().json(row))
}

pub fn profile_config(config: &mut ServiceConfig) {
    config.service(scope("profile").service(get_profile).service(update_profile));
}
