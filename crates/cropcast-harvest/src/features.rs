//! Extraction of the four model features from a JSON request body.

use cropcast_common::{CropcastError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Feature names in the column order the regressor was fitted with.
pub const FEATURE_NAMES: [&str; 4] = ["rainfall", "temperature", "soil_type", "crop"];

/// One row of regressor input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarvestFeatures {
    pub rainfall: f64,
    pub temperature: f64,
    pub soil_type: f64,
    pub crop: f64,
}

impl HarvestFeatures {
    pub fn new(rainfall: f64, temperature: f64, soil_type: f64, crop: f64) -> Self {
        Self {
            rainfall,
            temperature,
            soil_type,
            crop,
        }
    }

    /// Extract and validate the features from a parsed JSON body.
    ///
    /// Extra keys are ignored. Every named feature must be present and numeric.
    pub fn from_json(body: &Value) -> Result<Self> {
        let object = body.as_object().ok_or_else(|| {
            CropcastError::InvalidField("Request body must be a JSON object".to_string())
        })?;

        let mut row = [0.0f64; 4];
        for (slot, name) in row.iter_mut().zip(FEATURE_NAMES) {
            let value = object
                .get(name)
                .ok_or_else(|| CropcastError::missing_field(name))?;
            *slot = value.as_f64().ok_or_else(|| {
                CropcastError::InvalidField(format!("Field '{}' must be a number", name))
            })?;
        }
        Ok(Self::from_row(row))
    }

    /// Parse a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| CropcastError::InvalidField(format!("Invalid JSON body: {}", e)))?;
        Self::from_json(&value)
    }

    pub fn from_row(row: [f64; 4]) -> Self {
        Self::new(row[0], row[1], row[2], row[3])
    }

    /// Values in [`FEATURE_NAMES`] order.
    pub fn to_row(&self) -> Vec<f64> {
        vec![self.rainfall, self.temperature, self.soil_type, self.crop]
    }
}
