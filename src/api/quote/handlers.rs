use actix_web::{
    HttpResponse, Responder, post,
    web::{Data, ServiceConfig, scope},
};
use actix_web_validator::Json;

use super::models::QuoteRequest;
use crate::api::error::ServiceError;
use crate::plan::PlanClient;

/// Public quote generator backing the marketing "custom plan" form.
/// The upstream failure message is deliberately generic; details go
/// to the log only.
#[post("")]
async fn generate_quote(
    client: Data<PlanClient>,
    body: Json<QuoteRequest>,
) -> Result<impl Responder, ServiceError> {
    let plan = client
        .generate(&body.into_inner().into_input())
        .await
        .map_err(|e| ServiceError::PlanGeneration(e.to_string()))?;

    Ok(HttpResponse::Ok().json(plan))
}

pub fn quote_config(config: &mut ServiceConfig) {
    config.service(scope("quote").service(generate_quote));
}
