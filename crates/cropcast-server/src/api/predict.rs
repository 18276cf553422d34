//! `POST /predict`: days until harvest from four numeric features.

use actix_web::{HttpResponse, Resource, web};

use crate::{error::AppError, model::HarvestState};

pub async fn predict(
    state: web::Data<HarvestState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let response = cropcast_harvest::predict(&body, state.model.as_ref())?;
    Ok(HttpResponse::Ok().json(response))
}

pub fn routes() -> Resource {
    web::resource("/predict").route(web::post().to(predict))
}
