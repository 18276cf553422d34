//! Cropcast Vision - crop disease detection from leaf images
//!
//! Request path: [`preprocess`](preprocess::preprocess) validates the upload
//! signature and builds a (1, 128, 128, 3) tensor, a [`DiseaseModel`] scores it,
//! and [`respond`](responder::respond) maps the best class through the
//! [`ClassLabelTable`].

pub mod classifier;
pub mod labels;
pub mod network;
pub mod preprocess;
pub mod responder;
pub mod sniff;
pub mod training;

use cropcast_common::{DetectionResponse, Result};
use tracing::debug;

pub use classifier::{BurnClassifier, DiseaseModel, ServingBackend};
pub use labels::ClassLabelTable;
pub use network::CropDiseaseNet;
pub use preprocess::{ImageTensor, preprocess};
pub use sniff::{ImageKind, sniff};

/// File name of the classifier weights inside a model directory.
pub const MODEL_FILE_NAME: &str = "crop_disease_model.safetensors";

/// File name of the class label table inside a model directory.
pub const CLASS_NAMES_FILE_NAME: &str = "class_names.json";

/// Score one uploaded image end to end.
///
/// The model is never invoked when the signature check fails.
pub fn detect<M: DiseaseModel + ?Sized>(
    bytes: &[u8],
    model: &M,
    labels: &ClassLabelTable,
) -> Result<DetectionResponse> {
    let tensor = preprocess(bytes)?;
    let probabilities = model.predict_class_probabilities(&tensor)?;
    let response = responder::respond(&probabilities, labels)?;
    debug!(
        prediction = %response.prediction,
        confidence = response.confidence,
        "Classified image"
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::Cursor;

    use cropcast_common::CropcastError;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    use super::*;

    struct CountingModel {
        probabilities: Vec<f32>,
        calls: Cell<usize>,
    }

    impl DiseaseModel for CountingModel {
        fn predict_class_probabilities(&self, tensor: &ImageTensor) -> Result<Vec<f32>> {
            assert_eq!(tensor.shape(), preprocess::INPUT_SHAPE);
            self.calls.set(self.calls.get() + 1);
            Ok(self.probabilities.clone())
        }

        fn num_classes(&self) -> usize {
            self.probabilities.len()
        }
    }

    fn red_jpeg() -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 50, Rgb([255, 0, 0])));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Jpeg).unwrap();
        buffer.into_inner()
    }

    fn labels() -> ClassLabelTable {
        ClassLabelTable::new(vec![
            "Pepper__bell___Bacterial_spot".to_string(),
            "Potato___Late_blight".to_string(),
            "Tomato_healthy".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn test_detect_red_jpeg() {
        let model = CountingModel {
            probabilities: vec![0.1, 0.6543, 0.2457],
            calls: Cell::new(0),
        };
        let response = detect(&red_jpeg(), &model, &labels()).unwrap();
        assert_eq!(response.prediction, "Potato___Late_blight");
        assert_eq!(response.confidence, 65.43);
        assert_eq!(model.calls.get(), 1);
    }

    #[test]
    fn test_detect_rejects_before_inference() {
        let model = CountingModel {
            probabilities: vec![1.0, 0.0, 0.0],
            calls: Cell::new(0),
        };
        let err = detect(b"plain text pretending to be a jpg", &model, &labels()).unwrap_err();
        assert!(matches!(err, CropcastError::UnsupportedFormat(None)));
        assert_eq!(model.calls.get(), 0);
    }

    #[test]
    fn test_detect_with_untrained_network() {
        let device = Default::default();
        let model = BurnClassifier::<ServingBackend>::new(CropDiseaseNet::init(3, &device), device);
        let table = labels();
        table.ensure_matches(model.num_classes()).unwrap();

        let response = detect(&red_jpeg(), &model, &table).unwrap();
        assert!(table.names().contains(&response.prediction));
        assert!((0.0..=100.0).contains(&response.confidence));
    }
}
