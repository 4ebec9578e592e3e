// ============================================================
// Layer 5 — Digit CNN
// ============================================================
// The fixed topology:
//
//   input            [b, 1, 28, 28]
//   conv1 3x3 → relu [b, 32, 26, 26]
//   conv2 3x3 → relu [b, 32, 24, 24]
//   max-pool 2x2     [b, 32, 12, 12]
//   dropout 0.25
//   flatten          [b, 4608]
//   fc1 → relu       [b, 128]
//   dropout 0.5
//   fc2              [b, 10]
//   softmax
//
// Only the dropout rates are configurable. Layer sizes are
// constants because the exported .dat files carry no shape
// information and the consumer hardcodes them.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig, Initializer, Linear, LinearConfig, Relu,
    },
    prelude::*,
    tensor::activation::{log_softmax, softmax},
};

use crate::domain::digit::{IMAGE_CHANNELS, IMAGE_HEIGHT, NUM_CLASSES};

/// Filters in each convolution
pub const CONV_FILTERS: usize = 32;
/// Square convolution kernel side
pub const KERNEL_SIZE: usize = 3;
/// Square max-pool window side
pub const POOL_SIZE: usize = 2;
/// Units in the hidden dense layer
pub const HIDDEN_UNITS: usize = 128;

/// Spatial side after two valid convolutions and the pool: (28 - 2 - 2) / 2
pub const POOLED_SIDE: usize = (IMAGE_HEIGHT - 2 * (KERNEL_SIZE - 1)) / POOL_SIZE;
/// Inputs of fc1: 32 * 12 * 12
pub const FLATTENED_FEATURES: usize = CONV_FILTERS * POOLED_SIDE * POOLED_SIDE;

// Keras' default glorot_uniform
const WEIGHT_INIT: Initializer = Initializer::XavierUniform { gain: 1.0 };

#[derive(Config, Debug)]
pub struct DigitCnnConfig {
    /// Drop probability after the pooling stage
    #[config(default = 0.25)]
    pub conv_dropout: f64,
    /// Drop probability after fc1
    #[config(default = 0.5)]
    pub dense_dropout: f64,
}

impl DigitCnnConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DigitCnn<B> {
        let kernel = [KERNEL_SIZE, KERNEL_SIZE];

        DigitCnn {
            conv1: Conv2dConfig::new([IMAGE_CHANNELS, CONV_FILTERS], kernel)
                .with_initializer(WEIGHT_INIT)
                .init(device),
            conv2: Conv2dConfig::new([CONV_FILTERS, CONV_FILTERS], kernel)
                .with_initializer(WEIGHT_INIT)
                .init(device),
            pool: MaxPool2dConfig::new([POOL_SIZE, POOL_SIZE]).init(),
            conv_dropout: DropoutConfig::new(self.conv_dropout).init(),
            fc1: LinearConfig::new(FLATTENED_FEATURES, HIDDEN_UNITS)
                .with_initializer(WEIGHT_INIT)
                .init(device),
            dense_dropout: DropoutConfig::new(self.dense_dropout).init(),
            fc2: LinearConfig::new(HIDDEN_UNITS, NUM_CLASSES)
                .with_initializer(WEIGHT_INIT)
                .init(device),
            activation: Relu::new(),
        }
    }
}

#[derive(Module, Debug)]
pub struct DigitCnn<B: Backend> {
    pub conv1:         Conv2d<B>,
    pub conv2:         Conv2d<B>,
    pub pool:          MaxPool2d,
    pub conv_dropout:  Dropout,
    pub fc1:           Linear<B>,
    pub dense_dropout: Dropout,
    pub fc2:           Linear<B>,
    pub activation:    Relu,
}

/// Result of a forward pass with loss
pub struct DigitOutput<B: Backend> {
    /// Mean categorical cross-entropy over the batch, shape [1]
    pub loss:    Tensor<B, 1>,
    /// Pre-softmax scores, [batch, 10]
    pub logits:  Tensor<B, 2>,
    /// One-hot targets, [batch, 10]
    pub targets: Tensor<B, 2>,
}

impl<B: Backend> DigitCnn<B> {
    /// images: [batch, 1, 28, 28] → logits: [batch, 10]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.activation.forward(self.conv1.forward(images));
        let x = self.activation.forward(self.conv2.forward(x));
        let x = self.pool.forward(x);
        let x = self.conv_dropout.forward(x);

        // Flatten in (h, w, c) order. fc1's input axis then matches a
        // channels-last feature map, which is what an [oC kH kW iC]
        // consumer expects when fc1 is exported.
        let x = x.permute([0, 2, 3, 1]).flatten::<2>(1, 3);

        let x = self.activation.forward(self.fc1.forward(x));
        let x = self.dense_dropout.forward(x);
        self.fc2.forward(x)
    }

    /// Class probabilities, the softmax of `forward`
    pub fn forward_classification(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        softmax(self.forward(images), 1)
    }

    pub fn forward_loss(&self, images: Tensor<B, 4>, targets: Tensor<B, 2>) -> DigitOutput<B> {
        let logits = self.forward(images);
        let loss   = categorical_cross_entropy(logits.clone(), targets.clone());
        DigitOutput { loss, logits, targets }
    }
}

/// Mean over the batch of `-sum(target * log(softmax(logits)))`.
pub fn categorical_cross_entropy<B: Backend>(
    logits:  Tensor<B, 2>,
    targets: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let log_probs = log_softmax(logits, 1);
    (targets * log_probs).sum_dim(1).neg().mean()
}

/// Number of rows whose arg-max matches the one-hot target.
pub fn count_correct<B: Backend>(logits: Tensor<B, 2>, targets: Tensor<B, 2>) -> usize {
    let predicted = logits.argmax(1);
    let expected  = targets.argmax(1);
    let correct: i64 = predicted.equal(expected).int().sum().into_scalar().elem::<i64>();
    correct as usize
}
