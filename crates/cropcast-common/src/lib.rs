//! Cropcast Common - Shared types used by both inference services
//!
//! This crate provides:
//! - The error taxonomy shared by the image and tabular services
//! - JSON response bodies

pub mod error;
pub mod model;

// Re-exports for convenience
pub use error::{CropcastError, Result};
pub use model::{DetectionResponse, ErrorBody, HarvestResponse};
