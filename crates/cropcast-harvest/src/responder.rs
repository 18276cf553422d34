//! Turns a raw regressor output into a `/predict` response.

use cropcast_common::{CropcastError, HarvestResponse, Result};

/// Truncate toward zero, the way an integer cast of the prediction behaves.
pub fn respond(prediction: f64) -> Result<HarvestResponse> {
    if !prediction.is_finite() {
        return Err(CropcastError::InferenceFailure(format!(
            "regressor produced a non-finite value: {}",
            prediction
        )));
    }
    Ok(HarvestResponse {
        predicted_days_until_harvest: prediction.trunc() as i64,
    })
}
