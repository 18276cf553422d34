//! Cropcast Harvest - days-until-harvest regression
//!
//! Request path: [`HarvestFeatures`] pulls the four numeric fields out of the
//! JSON body, a [`HarvestModel`] predicts a scalar, and
//! [`respond`](responder::respond) truncates it to whole days.

pub mod dataset;
pub mod features;
pub mod regressor;
pub mod responder;

use std::path::Path;

use cropcast_common::{HarvestResponse, Result};
use tracing::{debug, info};

pub use dataset::{HarvestSample, synthetic_dataset};
pub use features::{FEATURE_NAMES, HarvestFeatures};
pub use regressor::{ForestRegressor, HarvestModel};

/// File name of the serialized regressor inside a model directory.
pub const MODEL_FILE_NAME: &str = "harvest_predictor.json";

/// Score one raw request body end to end.
pub fn predict<M: HarvestModel + ?Sized>(body: &[u8], model: &M) -> Result<HarvestResponse> {
    let features = HarvestFeatures::from_slice(body)?;
    let prediction = model.predict_scalar(&features)?;
    debug!(?features, prediction, "Predicted harvest");
    responder::respond(prediction)
}

/// Fit the regressor on the synthetic dataset and write it to `path`.
pub fn train_and_save(path: impl AsRef<Path>) -> Result<ForestRegressor> {
    let path = path.as_ref();
    let model = ForestRegressor::fit(&synthetic_dataset())?;
    model.save(path)?;
    info!(path = %path.display(), "Model saved");
    Ok(model)
}
