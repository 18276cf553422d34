//! Convolutional network used for crop disease classification.

use burn::{
    module::Module,
    nn::{
        Dropout, DropoutConfig, Linear, LinearConfig, Relu,
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
    },
    tensor::{Tensor, activation::softmax, backend::Backend},
};

use crate::preprocess::{CHANNELS, INPUT_SIZE};

const CONV1_FILTERS: usize = 32;
const CONV2_FILTERS: usize = 64;
const KERNEL: [usize; 2] = [3, 3];
const POOL: [usize; 2] = [2, 2];
const HIDDEN_UNITS: usize = 128;
const DROPOUT: f64 = 0.5;

/// Side length of the feature map entering the dense layers:
/// 128 -conv-> 126 -pool-> 63 -conv-> 61 -pool-> 30.
pub const FEATURE_SIDE: usize = ((INPUT_SIZE - 2) / 2 - 2) / 2;

/// Number of features after flattening the last pooling layer.
pub const FLATTENED_FEATURES: usize = CONV2_FILTERS * FEATURE_SIDE * FEATURE_SIDE;

#[derive(Module, Debug)]
pub struct CropDiseaseNet<B: Backend> {
    conv1: Conv2d<B>,
    pool1: MaxPool2d,
    conv2: Conv2d<B>,
    pool2: MaxPool2d,
    dense: Linear<B>,
    dropout: Dropout,
    logits: Linear<B>,
    activation: Relu,
}

impl<B: Backend> CropDiseaseNet<B> {
    pub fn init(num_classes: usize, device: &B::Device) -> Self {
        Self {
            conv1: Conv2dConfig::new([CHANNELS, CONV1_FILTERS], KERNEL).init(device),
            pool1: MaxPool2dConfig::new(POOL).with_strides(POOL).init(),
            conv2: Conv2dConfig::new([CONV1_FILTERS, CONV2_FILTERS], KERNEL).init(device),
            pool2: MaxPool2dConfig::new(POOL).with_strides(POOL).init(),
            dense: LinearConfig::new(FLATTENED_FEATURES, HIDDEN_UNITS).init(device),
            dropout: DropoutConfig::new(DROPOUT).init(),
            logits: LinearConfig::new(HIDDEN_UNITS, num_classes).init(device),
            activation: Relu::new(),
        }
    }

    /// Width of the output layer.
    pub fn num_classes(&self) -> usize {
        let [_, classes] = self.logits.weight.dims();
        classes
    }

    /// Unnormalized class scores for an NHWC batch of shape (batch, 128, 128, 3).
    pub fn forward_logits(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = images.permute([0, 3, 1, 2]);

        let x = self.activation.forward(self.conv1.forward(x));
        let x = self.pool1.forward(x);
        let x = self.activation.forward(self.conv2.forward(x));
        let x = self.pool2.forward(x);

        let x: Tensor<B, 2> = x.flatten(1, 3);
        let x = self.activation.forward(self.dense.forward(x));
        let x = self.dropout.forward(x);
        self.logits.forward(x)
    }

    /// Class probabilities, shape (batch, num_classes).
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        softmax(self.forward_logits(images), 1)
    }
}
