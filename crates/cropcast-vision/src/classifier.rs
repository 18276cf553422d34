//! Model handle for the disease classifier.

use std::path::Path;

use burn::{
    backend::NdArray,
    store::{ModuleSnapshot, SafetensorsStore},
    tensor::{Tensor, TensorData, backend::Backend},
};
use cropcast_common::{CropcastError, Result};
use tracing::info;

use crate::{
    network::CropDiseaseNet,
    preprocess::{INPUT_SHAPE, ImageTensor},
};

/// CPU backend used for serving.
pub type ServingBackend = NdArray<f32>;

/// A loaded predictor that scores one preprocessed image.
pub trait DiseaseModel {
    /// Probabilities over the class dimension for a single image.
    fn predict_class_probabilities(&self, tensor: &ImageTensor) -> Result<Vec<f32>>;

    /// Length of the vector returned by [`Self::predict_class_probabilities`].
    fn num_classes(&self) -> usize;
}

/// [`CropDiseaseNet`] weights on the CPU backend.
///
/// Cloning copies the weights; the HTTP layer gives each worker its own copy.
#[derive(Debug, Clone)]
pub struct BurnClassifier<B: Backend = ServingBackend> {
    model: CropDiseaseNet<B>,
    device: B::Device,
}

impl<B: Backend> BurnClassifier<B> {
    pub fn new(model: CropDiseaseNet<B>, device: B::Device) -> Self {
        Self { model, device }
    }

    /// Load safetensors weights for a network with `num_classes` outputs.
    pub fn load(path: impl AsRef<Path>, num_classes: usize, device: B::Device) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CropcastError::ModelLoad(format!(
                "model file {} does not exist",
                path.display()
            )));
        }

        let mut model = CropDiseaseNet::<B>::init(num_classes, &device);
        let mut store = SafetensorsStore::from_file(path);
        model.load_from(&mut store).map_err(|e| {
            CropcastError::ModelLoad(format!("failed to load {}: {:?}", path.display(), e))
        })?;

        info!(
            path = %path.display(),
            num_classes,
            "Loaded crop disease classifier"
        );
        Ok(Self::new(model, device))
    }

    /// Persist the weights as safetensors.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_network(&self.model, path)
    }

    pub fn network(&self) -> &CropDiseaseNet<B> {
        &self.model
    }
}

/// Write `model` to `path` in safetensors format.
pub fn save_network<B: Backend>(model: &CropDiseaseNet<B>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut store = SafetensorsStore::from_file(path);
    model.save_into(&mut store).map_err(|e| {
        CropcastError::ModelLoad(format!("failed to write {}: {:?}", path.display(), e))
    })
}

impl<B: Backend> DiseaseModel for BurnClassifier<B> {
    fn predict_class_probabilities(&self, tensor: &ImageTensor) -> Result<Vec<f32>> {
        let data = TensorData::new(tensor.to_vec(), INPUT_SHAPE);
        let input = Tensor::<B, 4>::from_data(data, &self.device);
        let probabilities = self.model.forward(input);

        let values = probabilities
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| CropcastError::InferenceFailure(format!("{:?}", e)))?;
        if values.len() != self.num_classes() {
            return Err(CropcastError::InferenceFailure(format!(
                "expected {} class probabilities, got {}",
                self.num_classes(),
                values.len()
            )));
        }
        Ok(values)
    }

    fn num_classes(&self) -> usize {
        self.model.num_classes()
    }
}
