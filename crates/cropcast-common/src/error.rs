//! Error types for Cropcast
//!
//! `CropcastError` enumerates every way a request or a startup step can fail.
//! The HTTP layer maps each variant to a status code via [`CropcastError::status_code`].

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum CropcastError {
    /// An expected multipart field or JSON key is absent.
    #[error("{0}")]
    MissingInput(String),

    /// Sniffed image signature is not on the allow-list. `None` when nothing matched.
    #[error("Unsupported image type: {}", .0.as_deref().unwrap_or("None"))]
    UnsupportedFormat(Option<String>),

    /// Request body is malformed or a field has the wrong type.
    #[error("{0}")]
    InvalidField(String),

    /// Decode, resize, tensor construction or model invocation failed.
    #[error("{0}")]
    InferenceFailure(String),

    /// Reading or writing a model artifact failed.
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// An offline training run could not complete.
    #[error("training error: {0}")]
    Training(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl CropcastError {
    pub fn missing_field(name: &str) -> Self {
        CropcastError::MissingInput(format!("Missing field: {}", name))
    }

    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            CropcastError::MissingInput(_)
            | CropcastError::UnsupportedFormat(_)
            | CropcastError::InvalidField(_) => 400,
            CropcastError::InferenceFailure(_)
            | CropcastError::ModelLoad(_)
            | CropcastError::Training(_)
            | CropcastError::ConfigError(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

pub type Result<T> = std::result::Result<T, CropcastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_display() {
        let err = CropcastError::UnsupportedFormat(None);
        assert_eq!(format!("{}", err), "Unsupported image type: None");

        let err = CropcastError::UnsupportedFormat(Some("gif".to_string()));
        assert_eq!(format!("{}", err), "Unsupported image type: gif");
    }

    #[test]
    fn test_message_variants_display_raw_message() {
        let err = CropcastError::MissingInput("No image uploaded".to_string());
        assert_eq!(format!("{}", err), "No image uploaded");

        let err = CropcastError::InferenceFailure("shape mismatch".to_string());
        assert_eq!(format!("{}", err), "shape mismatch");

        let err = CropcastError::missing_field("crop");
        assert_eq!(format!("{}", err), "Missing field: crop");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CropcastError::missing_field("crop").status_code(), 400);
        assert_eq!(CropcastError::UnsupportedFormat(None).status_code(), 400);
        assert_eq!(
            CropcastError::InvalidField("bad".to_string()).status_code(),
            400
        );
        assert_eq!(
            CropcastError::InferenceFailure("boom".to_string()).status_code(),
            500
        );
        assert_eq!(CropcastError::ModelLoad("gone".to_string()).status_code(), 500);
        assert_eq!(CropcastError::Training("diverged".to_string()).status_code(), 500);
    }

    #[test]
    fn test_is_client_error() {
        assert!(CropcastError::UnsupportedFormat(None).is_client_error());
        assert!(!CropcastError::InferenceFailure("x".to_string()).is_client_error());
        assert!(!CropcastError::Training("x".to_string()).is_client_error());
    }

    #[test]
    fn test_error_into_anyhow_downcast() {
        let err: anyhow::Error = CropcastError::missing_field("rainfall").into();
        let inner = err.downcast_ref::<CropcastError>();
        assert!(matches!(inner, Some(CropcastError::MissingInput(_))));
    }
}
