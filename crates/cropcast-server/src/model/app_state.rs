//! Per-service state injected into request handlers.
//!
//! Both states are built once at startup and never mutated afterwards.

use std::sync::Arc;

use cropcast_harvest::HarvestModel;
use cropcast_vision::{ClassLabelTable, DiseaseModel};

/// State of the image classification service.
///
/// The classifier is owned per actix worker (each worker clones it), the
/// label table is shared.
pub struct DetectState<M> {
    pub classifier: M,
    pub labels: Arc<ClassLabelTable>,
    pub max_upload_bytes: usize,
}

impl<M: DiseaseModel> DetectState<M> {
    pub fn new(classifier: M, labels: Arc<ClassLabelTable>, max_upload_bytes: usize) -> Self {
        Self {
            classifier,
            labels,
            max_upload_bytes,
        }
    }
}

impl<M> std::fmt::Debug for DetectState<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectState")
            .field("classifier", &"<DiseaseModel>")
            .field("labels", &self.labels.len())
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

/// State of the harvest regression service.
#[derive(Clone)]
pub struct HarvestState {
    pub model: Arc<dyn HarvestModel + Send + Sync>,
}

impl HarvestState {
    pub fn new(model: Arc<dyn HarvestModel + Send + Sync>) -> Self {
        Self { model }
    }
}

impl std::fmt::Debug for HarvestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarvestState")
            .field("model", &"<HarvestModel>")
            .finish()
    }
}
