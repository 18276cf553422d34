//! Shared fixtures for the HTTP integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::http::header;
use cropcast_common::{CropcastError, Result};
use cropcast_harvest::{HarvestFeatures, HarvestModel};
use cropcast_vision::{DiseaseModel, ImageTensor};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

pub const BOUNDARY: &str = "cropcast-test-boundary";

pub fn multipart_content_type() -> (header::HeaderName, String) {
    (
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    )
}

/// One multipart form part.
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub bytes: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, filename: &'a str, bytes: &'a [u8]) -> Self {
        Self {
            name,
            filename: Some(filename),
            content_type: Some("application/octet-stream"),
            bytes,
        }
    }

    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            filename: None,
            content_type: None,
            bytes: value.as_bytes(),
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(filename) = part.filename {
            disposition.push_str(&format!("; filename=\"{}\"", filename));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

pub fn red_image(format: ImageFormat) -> Vec<u8> {
    encode(
        DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 50, Rgb([255, 0, 0]))),
        format,
    )
}

/// Disease model returning fixed probabilities and counting invocations.
#[derive(Clone)]
pub struct StubClassifier {
    probabilities: Vec<f32>,
    calls: Arc<AtomicUsize>,
}

impl StubClassifier {
    pub fn new(probabilities: Vec<f32>) -> Self {
        Self {
            probabilities,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DiseaseModel for StubClassifier {
    fn predict_class_probabilities(&self, _tensor: &ImageTensor) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.probabilities.clone())
    }

    fn num_classes(&self) -> usize {
        self.probabilities.len()
    }
}

/// Disease model whose inference always fails.
#[derive(Clone)]
pub struct BrokenClassifier;

impl DiseaseModel for BrokenClassifier {
    fn predict_class_probabilities(&self, _tensor: &ImageTensor) -> Result<Vec<f32>> {
        Err(CropcastError::InferenceFailure("backend unavailable".to_string()))
    }

    fn num_classes(&self) -> usize {
        3
    }
}

/// Harvest model echoing a fixed prediction.
pub struct FixedHarvest(pub f64);

impl HarvestModel for FixedHarvest {
    fn predict_scalar(&self, _features: &HarvestFeatures) -> Result<f64> {
        Ok(self.0)
    }
}
