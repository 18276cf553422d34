//! Turns a class-probability vector into a `/detect` response.

use cropcast_common::{CropcastError, DetectionResponse, Result};

use crate::labels::ClassLabelTable;

/// Index of the largest value; ties go to the lowest index.
///
/// NaN entries never win. Returns `None` for an empty slice or one holding
/// only NaN.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

/// Probability as a percentage rounded to two decimals, clamped to `[0, 100]`.
pub fn confidence_percentage(probability: f32) -> f64 {
    let percentage = (probability as f64 * 100.0).clamp(0.0, 100.0);
    (percentage * 100.0).round() / 100.0
}

/// Pick the winning class and format it.
pub fn respond(probabilities: &[f32], labels: &ClassLabelTable) -> Result<DetectionResponse> {
    let index = argmax(probabilities).ok_or_else(|| {
        CropcastError::InferenceFailure("model returned no class probabilities".to_string())
    })?;
    let label = labels.get(index).ok_or_else(|| {
        CropcastError::InferenceFailure(format!(
            "class index {} out of range for {} labels",
            index,
            labels.len()
        ))
    })?;

    Ok(DetectionResponse {
        prediction: label.to_string(),
        confidence: confidence_percentage(probabilities[index]),
    })
}
