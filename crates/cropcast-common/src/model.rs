//! JSON response bodies returned by the inference services.

use serde::{Deserialize, Serialize};

/// Body of every error response: `{ "error": <message> }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Successful `/detect` response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    /// Class label taken from the class label table
    pub prediction: String,
    /// Maximum class probability as a percentage, rounded to two decimals
    pub confidence: f64,
}

/// Successful `/predict` response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestResponse {
    pub predicted_days_until_harvest: i64,
}
