use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use actix_web::{
    HttpResponse, Responder, post,
    web::{Data, ServiceConfig, scope},
};
use serde::Serialize;

use super::storage::UploadStore;
use crate::api::auth::Identity;
use crate::api::error::ServiceError;

#[derive(MultipartForm)]
pub struct UploadForm {
    /// Declared storage path, e.g. `profile_pictures/{uid}`.
    pub path: Text<String>,
    pub file: TempFile,
}

#[derive(Serialize)]
struct UploadResponse {
    #[serde(rename = "downloadURL")]
    download_url: String,
}

/// Authenticated file upload. The declared path must sit under one of
/// the caller's own bucket folders; anything else is rejected before
/// a byte is written.
#[post("")]
async fn upload_file(
    ident: Identity,
    store: Data<UploadStore>,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> Result<impl Responder, ServiceError> {
    let rel_path = form.path.trim().to_string();
    if !UploadStore::allowed_path(&rel_path, &ident.uid) {
        return Err(ServiceError::Forbidden);
    }

    let download_url = store
        .store(&rel_path, form.file.file.path())
        .map_err(ServiceError::Storage)?;

    Ok(HttpResponse::Ok().json(UploadResponse { download_url }))
}

pub fn upload_config(config: &mut ServiceConfig) {
    config.service(scope("uploads").service(upload_file));
}
