//! Model handle for the harvest-day regressor.

use std::path::Path;

use cropcast_common::{CropcastError, Result};
use smartcore::{
    ensemble::random_forest_regressor::{RandomForestRegressor, RandomForestRegressorParameters},
    linalg::basic::matrix::DenseMatrix,
};
use tracing::info;

use crate::{dataset, features::HarvestFeatures};

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// A loaded predictor that scores one feature row.
pub trait HarvestModel {
    fn predict_scalar(&self, features: &HarvestFeatures) -> Result<f64>;
}

/// Random forest fitted on [`dataset::synthetic_dataset`] or loaded from disk.
#[derive(Debug)]
pub struct ForestRegressor {
    forest: Forest,
}

impl ForestRegressor {
    /// Fit a forest with default parameters on `samples`.
    pub fn fit(samples: &[dataset::HarvestSample]) -> Result<Self> {
        if samples.is_empty() {
            return Err(CropcastError::Training(
                "cannot fit a regressor on an empty dataset".to_string(),
            ));
        }
        let (rows, targets) = dataset::to_matrix(samples);
        let x = DenseMatrix::from_2d_vec(&rows);
        let forest = RandomForestRegressor::fit(&x, &targets, RandomForestRegressorParameters::default())
            .map_err(|e| CropcastError::Training(format!("forest fit failed: {}", e)))?;
        Ok(Self { forest })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|e| {
            CropcastError::ModelLoad(format!("failed to read {}: {}", path.display(), e))
        })?;
        let forest: Forest = serde_json::from_slice(&content).map_err(|e| {
            CropcastError::ModelLoad(format!("invalid model file {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), "Loaded harvest regressor");
        Ok(Self { forest })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_vec(&self.forest)
            .map_err(|e| CropcastError::ModelLoad(format!("failed to serialize model: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            CropcastError::ModelLoad(format!("failed to write {}: {}", path.display(), e))
        })
    }
}

impl HarvestModel for ForestRegressor {
    fn predict_scalar(&self, features: &HarvestFeatures) -> Result<f64> {
        let x = DenseMatrix::from_2d_vec(&vec![features.to_row()]);
        let predictions = self
            .forest
            .predict(&x)
            .map_err(|e| CropcastError::InferenceFailure(e.to_string()))?;
        predictions.first().copied().ok_or_else(|| {
            CropcastError::InferenceFailure("regressor returned no prediction".to_string())
        })
    }
}
