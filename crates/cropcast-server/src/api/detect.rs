//! `POST /detect`: classify one uploaded leaf image.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, Resource, web};
use cropcast_common::CropcastError;
use cropcast_vision::DiseaseModel;
use futures::StreamExt;
use tracing::{debug, info};

use crate::{
    error::AppError,
    model::{
        DetectState,
        constants::{IMAGE_FIELD, NO_IMAGE_UPLOADED},
    },
};

/// The `image` field of a multipart upload.
#[derive(Debug)]
pub struct ImageUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Find the `image` file part and read it into memory.
///
/// Only parts carrying a filename count as uploads; a plain form value named
/// `image` is skipped. Returns `Ok(None)` when the form has no such part or
/// is not a readable multipart body at all.
pub async fn read_image_field(
    payload: &mut Multipart,
    max_bytes: usize,
) -> Result<Option<ImageUpload>, CropcastError> {
    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => {
                debug!(error = %e, "Unreadable multipart body");
                return Ok(None);
            }
        };

        let is_image = field
            .content_disposition()
            .is_some_and(|cd| {
                cd.get_name() == Some(IMAGE_FIELD) && cd.get_filename().is_some()
            });
        if !is_image {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| {
                    CropcastError::InvalidField(format!("Failed to read form field: {}", e))
                })?;
            }
            continue;
        }

        let mut upload = ImageUpload {
            filename: field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string),
            content_type: field.content_type().map(|mime| mime.to_string()),
            bytes: Vec::new(),
        };
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                CropcastError::InvalidField(format!("Failed to read upload: {}", e))
            })?;
            if upload.bytes.len() + chunk.len() > max_bytes {
                return Err(CropcastError::InvalidField(format!(
                    "Image exceeds the {} byte upload limit",
                    max_bytes
                )));
            }
            upload.bytes.extend_from_slice(&chunk);
        }
        return Ok(Some(upload));
    }
    Ok(None)
}

pub async fn detect<M: DiseaseModel + 'static>(
    state: web::Data<DetectState<M>>,
    mut payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let upload = read_image_field(&mut payload, state.max_upload_bytes)
        .await?
        .ok_or_else(|| CropcastError::MissingInput(NO_IMAGE_UPLOADED.to_string()))?;

    info!(
        filename = upload.filename.as_deref().unwrap_or(""),
        content_type = upload.content_type.as_deref().unwrap_or(""),
        size = upload.bytes.len(),
        "Received file"
    );

    let response = cropcast_vision::detect(&upload.bytes, &state.classifier, &state.labels)?;
    Ok(HttpResponse::Ok().json(response))
}

pub fn routes<M: DiseaseModel + 'static>() -> Resource {
    web::resource("/detect").route(web::post().to(detect::<M>))
}
