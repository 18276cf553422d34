// Error handling for the HTTP layer
// Maps the shared CropcastError taxonomy onto actix-web responses

use std::fmt::{Display, Formatter};

use actix_web::{HttpResponse, http::StatusCode};
use tracing::{debug, error};

pub use cropcast_common::error::CropcastError;
use cropcast_common::model::ErrorBody;

// Local wrapper for application errors to implement actix-web error handling
// (Cannot impl foreign trait for foreign type due to orphan rules)
#[derive(Debug)]
pub struct AppError {
    inner: anyhow::Error,
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError { inner: value }
    }
}

impl From<CropcastError> for AppError {
    fn from(value: CropcastError) -> Self {
        AppError {
            inner: value.into(),
        }
    }
}

impl AppError {
    pub fn downcast_ref<E: std::error::Error + Send + Sync + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

impl actix_web::error::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        let code = self
            .downcast_ref::<CropcastError>()
            .map(CropcastError::status_code)
            .unwrap_or(500);
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = self.inner.to_string();
        let client_error = self
            .downcast_ref::<CropcastError>()
            .is_some_and(CropcastError::is_client_error);
        if client_error {
            debug!(status = status.as_u16(), error = %message, "Request rejected");
        } else {
            error!(status = status.as_u16(), error = %message, "Request failed");
        }
        HttpResponse::build(status).json(ErrorBody::new(message))
    }
}
