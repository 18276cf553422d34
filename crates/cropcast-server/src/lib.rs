// Main library module for Cropcast - HTTP inference services for crop disease
// detection and harvest-day prediction

pub mod api; // Request handlers
pub mod error; // Error handling and types
pub mod model; // Configuration and handler state
pub mod startup; // Logging and server setup

pub use error::AppError;
pub use model::{Configuration, DetectState, HarvestState, Service};
