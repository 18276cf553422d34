//! The fixed synthetic dataset the harvest regressor is fitted on.

use serde::{Deserialize, Serialize};

use crate::features::HarvestFeatures;

/// One labeled observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarvestSample {
    pub features: HarvestFeatures,
    pub days_until_harvest: f64,
}

const ROWS: [([f64; 4], f64); 4] = [
    ([100.0, 25.0, 1.0, 0.0], 90.0),
    ([150.0, 28.0, 2.0, 1.0], 120.0),
    ([200.0, 30.0, 1.0, 0.0], 85.0),
    ([250.0, 32.0, 2.0, 1.0], 130.0),
];

pub fn synthetic_dataset() -> Vec<HarvestSample> {
    ROWS.iter()
        .map(|&(row, days_until_harvest)| HarvestSample {
            features: HarvestFeatures::from_row(row),
            days_until_harvest,
        })
        .collect()
}

/// Split samples into a feature matrix (row-major) and target vector.
pub fn to_matrix(samples: &[HarvestSample]) -> (Vec<Vec<f64>>, Vec<f64>) {
    samples
        .iter()
        .map(|sample| (sample.features.to_row(), sample.days_until_harvest))
        .unzip()
}
