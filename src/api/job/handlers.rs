use actix_web::{
    HttpResponse, Responder, delete, get, patch, post,
    web::{Data, Path, Query, ServiceConfig, scope},
};
use actix_web_validator::Json;
use uuid::Uuid;

use super::dto::{JobCreatedResponse, StatusMessage};
use super::models::{JobPatchRequest, NewJobRequest, StageQuery, parse_stage_filter};
use super::service::JobService;
use crate::api::application::handlers::apply_for_job;
use crate::api::auth::Identity;
use crate::api::error::ServiceError;

/// Public job listing (cleaner opportunities board). `?stage=` may
/// name one stage or a comma-separated set.
#[get("")]
async fn list_jobs(
    service: Data<JobService>,
    query: Query<StageQuery>,
) -> Result<HttpResponse, ServiceError> {
    let stages = match &query.stage {
        Some(raw) => Some(parse_stage_filter(raw).map_err(ServiceError::ValidationError)?),
        None => None,
    };

    let jobs = service.list_jobs(stages.as_deref()).await;
    Ok(HttpResponse::Ok().json(jobs))
}

#[get("/{id}")]
async fn get_job(service: Data<JobService>, id: Path<Uuid>) -> Result<HttpResponse, ServiceError> {
    match service.get_job(id.into_inner()).await {
        Some(job) => Ok(HttpResponse::Ok().json(job)),
        None => Err(ServiceError::NotFound("Job".to_string())),
    }
}

#[post("")]
async fn create_job(
    ident: Identity,
    service: Data<JobService>,
    body: Json<NewJobRequest>,
) -> Result<impl Responder, ServiceError> {
    ident.require_admin()?;

    let id = service.create_job(body.into_inner().into_new_job()).await?;
    Ok(HttpResponse::Created().json(JobCreatedResponse {
        message: "Job created successfully".to_string(),
        id,
    }))
}

#[patch("/{id}")]
async fn update_job(
    ident: Identity,
    service: Data<JobService>,
    id: Path<Uuid>,
    body: Json<JobPatchRequest>,
) -> Result<impl Responder, ServiceError> {
    ident.require_admin()?;

    service
        .update_job(id.into_inner(), body.into_inner().into_patch())
        .await?;
    Ok(HttpResponse::Ok().json(StatusMessage {
        message: "Job updated successfully".to_string(),
    }))
}

#[delete("/{id}")]
async fn delete_job(
    ident: Identity,
    service: Data<JobService>,
    id: Path<Uuid>,
) -> Result<impl Responder, ServiceError> {
    ident.require_admin()?;

    service.delete_job(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(StatusMessage {
        message: "Job and its applications deleted".to_string(),
    }))
}

pub fn job_config(config: &mut ServiceConfig) {
    config.service(
        scope("jobs")
            .service(list_jobs)
            .service(create_job)
            // lives in the application module, mounted under /jobs
            .service(apply_for_job)
            .service(get_job)
            .service(update_job)
            .service(delete_job),
    );
}
