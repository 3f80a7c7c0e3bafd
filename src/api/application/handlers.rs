use actix_web::{
    HttpResponse, Responder, get, patch, post,
    web::{Data, Path, ServiceConfig, scope},
};
use actix_web_validator::Json;
use serde::Serialize;
use uuid::Uuid;

use super::models::{ApplyRequest, DecisionRequest};
use super::service::ApplicationService;
use crate::api::auth::Identity;
use crate::api::error::ServiceError;
use crate::api::job::dto::StatusMessage;

#[derive(Serialize)]
struct ApplicationCreatedResponse {
    message: String,
    id: Uuid,
}

/// Mounted inside the `jobs` scope: POST /jobs/{id}/applications.
#[post("/{id}/applications")]
pub async fn apply_for_job(
    ident: Identity,
    service: Data<ApplicationService>,
    job_id: Path<Uuid>,
    body: Json<ApplyRequest>,
) -> Result<impl Responder, ServiceError> {
    let id = service
        .apply(job_id.into_inner(), &ident.uid, &body.applicant_name)
        .await?;

    Ok(HttpResponse::Created().json(ApplicationCreatedResponse {
        message: "Application submitted".to_string(),
        id,
    }))
}

/// Admin review queue.
#[get("")]
async fn list_applications(
    ident: Identity,
    service: Data<ApplicationService>,
) -> Result<HttpResponse, ServiceError> {
    ident.require_admin()?;
    Ok(HttpResponse::Ok().json(service.list_all().await))
}

/// The caller's own applications.
#[get("/mine")]
async fn my_applications(ident: Identity, service: Data<ApplicationService>) -> impl Responder {
    HttpResponse::Ok().json(service.list_for_user(&ident.uid).await)
}

#[patch("/{id}")]
async fn decide_application(
    ident: Identity,
    service: Data<ApplicationService>,
    id: Path<Uuid>,
    body: Json<DecisionRequest>,
) -> Result<impl Responder, ServiceError> {
    ident.require_admin()?;

    service.decide(id.into_inner(), body.status).await?;
    Ok(HttpResponse::Ok().json(StatusMessage {
        message: "Application updated".to_string(),
    }))
}

pub fn application_config(config: &mut ServiceConfig) {
    config.service(
        scope("applications")
            .service(my_applications)
            .service(list_applications)
            .service(decide_application),
    );
}
