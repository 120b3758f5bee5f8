//! File upload routes

use crate::app_config::AppConfig;
use crate::middleware::CurrentUser;
use crate::storage::StorageBackend;
use crate::upload::{accept_upload_name, secure_filename};
use crate::web::error::ChatError;
use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpResponse, Responder};
use futures::{StreamExt, TryStreamExt};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(upload_file).service(view_upload);
}

fn read_error(err: actix_multipart::MultipartError) -> ChatError {
    log::error!("upload_file: multipart read error: {}", err);
    ChatError::BadRequest("Error interpreting user input.".to_string())
}

/// POST /upload - Store the multipart field `file` in the upload folder
#[post("/upload")]
pub async fn upload_file(
    client: CurrentUser,
    config: web::Data<AppConfig>,
    storage: web::Data<dyn StorageBackend>,
    mut payload: Multipart,
) -> Result<impl Responder, ChatError> {
    let max_size = config.upload.max_size_bytes();

    while let Some(mut field) = payload.try_next().await.map_err(read_error)? {
        let (field_name, original_name) = {
            let disposition = field.content_disposition();
            (
                disposition.get_name().map(str::to_owned),
                disposition.get_filename().map(str::to_owned),
            )
        };

        // Only a part named `file` that carries a filename counts as the upload.
        let original_name = match (field_name.as_deref(), original_name) {
            (Some("file"), Some(original_name)) => original_name,
            _ => {
                while let Some(chunk) = field.next().await {
                    chunk.map_err(read_error)?;
                }
                continue;
            }
        };

        let filename = accept_upload_name(&original_name, &config.upload.allowed_extensions)
            .ok_or_else(|| {
                log::debug!("upload_file: refused {:?}", original_name);
                ChatError::InvalidUpload("File type not allowed".to_string())
            })?;

        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let bytes = chunk.map_err(read_error)?;
            if buf.len() + bytes.len() > max_size {
                return Err(ChatError::UploadTooLarge(max_size));
            }
            buf.extend_from_slice(&bytes);
        }

        storage.put_object(buf, &filename).await?;
        log::info!("{} ({}) uploaded {}", client.get_name(), client.get_id(), filename);

        return Ok(HttpResponse::Created().json(serde_json::json!({ "filename": filename })));
    }

    Err(ChatError::InvalidUpload("No file part".to_string()))
}

/// GET /uploads/{filename} - Serve a previously uploaded file
#[get("/uploads/{filename}")]
pub async fn view_upload(
    _client: CurrentUser,
    storage: web::Data<dyn StorageBackend>,
    filename: web::Path<String>,
) -> Result<impl Responder, ChatError> {
    let filename = filename.into_inner();

    // Uploads are always stored under their sanitized name.
    if filename.is_empty() || secure_filename(&filename) != filename {
        return Err(ChatError::NotFound);
    }

    if !storage.exists(&filename).await? {
        log::debug!("view_upload: no stored file {:?}", filename);
        return Err(ChatError::NotFound);
    }

    let object = storage.get_object(&filename).await?;

    Ok(HttpResponse::Ok()
        .content_type(object.content_type)
        .no_chunking(object.content_length)
        .streaming(object.body))
}
