//! Offline training of [`CropDiseaseNet`] on a directory-structured dataset.
//!
//! The dataset layout is `<root>/<class name>/<image file>`. Class names are
//! the sorted subdirectory names, so index `i` of the resulting
//! [`ClassLabelTable`] matches output `i` of the trained network.

use std::path::{Path, PathBuf};

use burn::{
    backend::{Autodiff, NdArray},
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{ElementConversion, Int, Tensor, TensorData, backend::Backend},
};
use cropcast_common::{CropcastError, Result};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::{info, warn};

use crate::{
    classifier::{BurnClassifier, save_network},
    labels::ClassLabelTable,
    network::CropDiseaseNet,
    preprocess::{CHANNELS, INPUT_SIZE, ImageTensor, preprocess},
    responder::argmax,
};

pub type TrainingBackend = Autodiff<NdArray<f32>>;

const IMAGE_LEN: usize = INPUT_SIZE * INPUT_SIZE * CHANNELS;

/// Hyper-parameters of a training run.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            batch_size: 32,
            learning_rate: 1e-3,
            seed: 42,
        }
    }
}

/// Preprocessed images with their class indices.
#[derive(Debug, Clone, Default)]
pub struct LabeledImages {
    pub images: Vec<ImageTensor>,
    pub targets: Vec<usize>,
}

impl LabeledImages {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn push(&mut self, image: ImageTensor, target: usize) {
        self.images.push(image);
        self.targets.push(target);
    }
}

/// Sorted names of the subdirectories of `root`.
pub fn discover_classes(root: &Path) -> Result<ClassLabelTable> {
    let entries = std::fs::read_dir(root).map_err(|e| {
        CropcastError::Training(format!("failed to read {}: {}", root.display(), e))
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CropcastError::Training(e.to_string()))?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    ClassLabelTable::new(names)
}

fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| CropcastError::Training(format!("failed to read {}: {}", dir.display(), e)))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Load every decodable image under `root` using the class order of `classes`.
///
/// Files that fail preprocessing are skipped with a warning. A class
/// directory missing from `root` contributes no samples.
pub fn load_dataset(root: &Path, classes: &ClassLabelTable) -> Result<LabeledImages> {
    let mut dataset = LabeledImages::default();
    for (target, name) in classes.names().iter().enumerate() {
        let class_dir = root.join(name);
        if !class_dir.is_dir() {
            warn!(class = %name, root = %root.display(), "Class directory missing");
            continue;
        }
        for file in sorted_files(&class_dir)? {
            let bytes = match std::fs::read(&file) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "Skipping unreadable file");
                    continue;
                }
            };
            match preprocess(&bytes) {
                Ok(tensor) => dataset.push(tensor, target),
                Err(e) => warn!(file = %file.display(), error = %e, "Skipping image"),
            }
        }
    }
    info!(
        root = %root.display(),
        samples = dataset.len(),
        classes = classes.len(),
        "Loaded image dataset"
    );
    Ok(dataset)
}

fn batch_tensor<B: Backend>(
    dataset: &LabeledImages,
    indices: &[usize],
    device: &B::Device,
) -> (Tensor<B, 4>, Vec<usize>) {
    let mut values = Vec::with_capacity(indices.len() * IMAGE_LEN);
    let mut targets = Vec::with_capacity(indices.len());
    for &index in indices {
        values.extend(dataset.images[index].view().iter().copied());
        targets.push(dataset.targets[index]);
    }
    let data = TensorData::new(values, [indices.len(), INPUT_SIZE, INPUT_SIZE, CHANNELS]);
    (Tensor::from_data(data, device), targets)
}

/// Fraction of `dataset` that `model` classifies correctly.
pub fn evaluate<B: Backend>(
    model: &CropDiseaseNet<B>,
    dataset: &LabeledImages,
    batch_size: usize,
    device: &B::Device,
) -> Result<f64> {
    if dataset.is_empty() {
        return Ok(0.0);
    }
    let num_classes = model.num_classes();
    let indices: Vec<usize> = (0..dataset.len()).collect();
    let mut correct = 0usize;

    for chunk in indices.chunks(batch_size.max(1)) {
        let (images, targets) = batch_tensor::<B>(dataset, chunk, device);
        let probabilities = model
            .forward(images)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| CropcastError::Training(format!("{:?}", e)))?;
        for (row, target) in probabilities.chunks(num_classes).zip(targets) {
            if argmax(row) == Some(target) {
                correct += 1;
            }
        }
    }
    Ok(correct as f64 / dataset.len() as f64)
}

/// Train a fresh network on `train`, reporting accuracy on `validation` each epoch.
pub fn train(
    train: &LabeledImages,
    validation: &LabeledImages,
    num_classes: usize,
    config: &TrainingConfig,
) -> Result<BurnClassifier> {
    if train.is_empty() {
        return Err(CropcastError::Training(
            "training dataset contains no images".to_string(),
        ));
    }

    let device = Default::default();
    let mut model = CropDiseaseNet::<TrainingBackend>::init(num_classes, &device);
    let mut optimizer = AdamConfig::new().init::<TrainingBackend, CropDiseaseNet<TrainingBackend>>();
    let loss_fn = CrossEntropyLossConfig::new().init(&device);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut order: Vec<usize> = (0..train.len()).collect();

    for epoch in 1..=config.epochs {
        order.shuffle(&mut rng);
        let mut total_loss = 0.0f64;
        let mut batches = 0usize;

        for chunk in order.chunks(config.batch_size.max(1)) {
            let (images, targets) = batch_tensor::<TrainingBackend>(train, chunk, &device);
            let targets: Vec<i64> = targets.into_iter().map(|t| t as i64).collect();
            let targets = Tensor::<TrainingBackend, 1, Int>::from_data(
                TensorData::new(targets, [chunk.len()]),
                &device,
            );

            let logits = model.forward_logits(images);
            let loss = loss_fn.forward(logits, targets);
            let loss_value: f64 = loss.clone().into_scalar().elem();

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optimizer.step(config.learning_rate, model, grads);

            total_loss += loss_value;
            batches += 1;
        }

        let inner = model.valid();
        let accuracy = evaluate(&inner, validation, config.batch_size, &device)?;
        info!(
            epoch,
            epochs = config.epochs,
            loss = total_loss / batches.max(1) as f64,
            val_accuracy = accuracy,
            "Finished epoch"
        );
    }

    Ok(BurnClassifier::new(model.valid(), device))
}

/// Train on `<train_dir>` and write weights plus class names to `output_dir`.
pub fn train_from_directories(
    train_dir: &Path,
    val_dir: &Path,
    output_dir: &Path,
    config: &TrainingConfig,
) -> Result<ClassLabelTable> {
    let classes = discover_classes(train_dir)?;
    let train_set = load_dataset(train_dir, &classes)?;
    let val_set = load_dataset(val_dir, &classes)?;

    let classifier = train(&train_set, &val_set, classes.len(), config)?;

    std::fs::create_dir_all(output_dir).map_err(|e| {
        CropcastError::ModelLoad(format!("failed to create {}: {}", output_dir.display(), e))
    })?;
    let model_path = output_dir.join(crate::MODEL_FILE_NAME);
    let labels_path = output_dir.join(crate::CLASS_NAMES_FILE_NAME);
    save_network(classifier.network(), &model_path)?;
    classes.save(&labels_path)?;

    info!(
        model = %model_path.display(),
        labels = %labels_path.display(),
        "Model trained and saved"
    );
    Ok(classes)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    use super::*;
    use crate::classifier::{DiseaseModel, ServingBackend};

    fn write_png(path: &Path, color: [u8; 3]) {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb(color)));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        std::fs::write(path, buffer.into_inner()).unwrap();
    }

    fn make_dataset(root: &Path) {
        for (class, color) in [("healthy", [0, 200, 0]), ("rust", [180, 90, 20])] {
            let dir = root.join(class);
            std::fs::create_dir_all(&dir).unwrap();
            write_png(&dir.join("a.png"), color);
            write_png(&dir.join("b.png"), color);
        }
        std::fs::write(root.join("healthy").join("notes.txt"), "not an image").unwrap();
        std::fs::write(root.join("README"), "top-level files are not classes").unwrap();
    }

    #[test]
    fn test_discover_classes_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["tomato_blight", "corn_rust", "healthy"] {
            std::fs::create_dir_all(dir.path().join(name)).unwrap();
        }
        let classes = discover_classes(dir.path()).unwrap();
        assert_eq!(classes.names(), ["corn_rust", "healthy", "tomato_blight"]);
    }

    #[test]
    fn test_discover_classes_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_classes(dir.path()).is_err());
    }

    #[test]
    fn test_discover_classes_missing_root() {
        let err = discover_classes(Path::new("/nonexistent/dataset/train")).unwrap_err();
        assert!(matches!(err, CropcastError::Training(_)));
    }

    #[test]
    fn test_load_dataset_skips_non_images() {
        let dir = tempfile::tempdir().unwrap();
        make_dataset(dir.path());
        let classes = discover_classes(dir.path()).unwrap();
        let dataset = load_dataset(dir.path(), &classes).unwrap();
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.targets, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_train_from_directories_writes_artifacts() {
        let data = tempfile::tempdir().unwrap();
        make_dataset(data.path());
        let output = tempfile::tempdir().unwrap();

        let config = TrainingConfig {
            epochs: 1,
            batch_size: 2,
            ..Default::default()
        };
        let classes =
            train_from_directories(data.path(), data.path(), output.path(), &config).unwrap();
        assert_eq!(classes.len(), 2);

        let labels = ClassLabelTable::load(output.path().join(crate::CLASS_NAMES_FILE_NAME)).unwrap();
        assert_eq!(labels, classes);

        let classifier = BurnClassifier::<ServingBackend>::load(
            output.path().join(crate::MODEL_FILE_NAME),
            labels.len(),
            Default::default(),
        )
        .unwrap();
        assert_eq!(classifier.num_classes(), 2);
    }

    #[test]
    fn test_train_rejects_empty_dataset() {
        let empty = LabeledImages::default();
        let err = train(&empty, &empty, 2, &TrainingConfig::default()).unwrap_err();
        assert!(matches!(err, CropcastError::Training(_)));
        assert!(err.to_string().contains("no images"));
    }
}
