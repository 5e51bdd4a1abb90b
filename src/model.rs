//! Model container and the fixed CIFAR-10 architecture factory
//!
//! This module provides the [`Model`] container for a sequential layer stack
//! and [`build_custom_model`], which assembles the fixed 10-class CNN
//! topology: three convolutional blocks of increasing width (32, 64, 128
//! filters), each with two batch-normalized ReLU convolutions, 2×2 max
//! pooling and dropout, followed by flatten and a 10-way softmax dense head.

use crate::config::Hyperparameters;
use crate::layers::{
    Activation, ActivationLayer, BatchNormLayer, Conv2DLayer, DenseLayer, DropoutLayer,
    FlattenLayer, Layer, MaxPool2DLayer, Padding,
};
use crate::utils::SimpleRng;
use std::error::Error;
use std::fmt::Write as _;

/// Number of output classes.
pub const NUM_CLASSES: usize = 10;

// Fixed architecture hyperparameters. The L2 strength on conv kernels is a
// constant of the topology, independent of the weight-decay training
// hyperparameter.
const KERNEL_SIZE: usize = 3;
const POOL_SIZE: usize = 2;
const CONV_L2_STRENGTH: f32 = 1e-4;
const BN_EPSILON: f32 = 1e-3;
const BN_MOMENTUM: f32 = 0.99;
const BLOCK_FILTERS: [usize; 3] = [32, 64, 128];
const BLOCK_DROP_RATES: [f32; 3] = [0.2, 0.3, 0.4];

/// Input shape as channels × height × width (e.g. 3×32×32 for CIFAR-10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputShape {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
}

impl InputShape {
    /// Create an input shape.
    pub fn new(channels: usize, height: usize, width: usize) -> Self {
        Self {
            channels,
            height,
            width,
        }
    }

    /// Total values per sample: channels × height × width.
    pub fn flattened_size(&self) -> usize {
        self.channels * self.height * self.width
    }
}

/// A sequential neural network model.
///
/// Owns an ordered layer stack plus the input shape and the pass-through
/// training hyperparameters it was built with.
pub struct Model {
    layers: Vec<Box<dyn Layer>>,
    input_shape: InputShape,
    hyperparams: Hyperparameters,
}

impl Model {
    /// Forward propagation through the whole stack.
    ///
    /// Runs every layer in order, sizing intermediate buffers from the layer
    /// output sizes, and returns the final output
    /// (batch_size × output_size values).
    ///
    /// # Panics
    ///
    /// Panics if `input.len()` is not `batch_size` times the flattened input
    /// shape.
    pub fn forward(&self, input: &[f32], batch_size: usize) -> Vec<f32> {
        assert_eq!(
            input.len(),
            batch_size * self.input_shape.flattened_size(),
            "input len mismatch in Model::forward"
        );

        let mut current = input.to_vec();
        for layer in &self.layers {
            let mut next = vec![0.0f32; batch_size * layer.output_size()];
            layer.forward(&current, &mut next, batch_size);
            current = next;
        }
        current
    }

    /// Set training/inference mode on every layer.
    pub fn set_training(&mut self, training: bool) {
        for layer in &mut self.layers {
            layer.set_training(training);
        }
    }

    /// Number of layers in the stack.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Total trainable parameters across all layers.
    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|l| l.parameter_count()).sum()
    }

    /// Output values per sample (the number of classes for this topology).
    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.output_size())
    }

    /// The input shape the model was built for.
    pub fn input_shape(&self) -> InputShape {
        self.input_shape
    }

    /// The training hyperparameters the model was built with.
    pub fn hyperparameters(&self) -> Hyperparameters {
        self.hyperparams
    }

    /// Immutable view of the layer stack.
    pub fn layers(&self) -> &[Box<dyn Layer>] {
        &self.layers
    }

    /// Summed L2 penalty of all regularized convolution kernels.
    pub fn regularization_loss(&self) -> f32 {
        self.layers.iter().map(|l| l.l2_penalty()).sum()
    }

    /// Per-layer summary table with the trainable-parameter total.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:<12} {:>12} {:>12}", "layer", "output", "params");
        for layer in &self.layers {
            let _ = writeln!(
                out,
                "{:<12} {:>12} {:>12}",
                layer.name(),
                layer.output_size(),
                layer.parameter_count()
            );
        }
        let _ = writeln!(out, "total parameters: {}", self.parameter_count());
        out
    }
}

/// Builds the fixed CIFAR-10 classification model.
///
/// Assembles the sequential topology from the input shape:
///
/// - Three blocks, with 32, 64 and 128 filters respectively:
///   Conv2D 3×3 same (L2 1e-4) → BatchNorm → ReLU →
///   Conv2D 3×3 valid (L2 1e-4) → BatchNorm → ReLU →
///   MaxPool 2×2 → Dropout (0.2 / 0.3 / 0.4)
/// - Flatten → Dense(10) → Softmax
///
/// The hyperparameters are validated and stored on the returned model; they
/// do not affect the topology. Weights are initialized from `rng`.
///
/// # Errors
///
/// Returns an error if the hyperparameters are out of range, any input
/// dimension is zero, or the spatial dimensions are too small to survive the
/// three convolution/pooling stages.
///
/// # Examples
///
/// ```
/// use cifar_cnn::config::Hyperparameters;
/// use cifar_cnn::model::{build_custom_model, InputShape, NUM_CLASSES};
/// use cifar_cnn::utils::SimpleRng;
///
/// let mut rng = SimpleRng::new(42);
/// let hp = Hyperparameters::new(0.01, 1e-4, 0.9);
/// let model = build_custom_model(InputShape::new(3, 32, 32), hp, &mut rng).unwrap();
/// assert_eq!(model.output_size(), NUM_CLASSES);
/// ```
pub fn build_custom_model(
    input_shape: InputShape,
    hyperparams: Hyperparameters,
    rng: &mut SimpleRng,
) -> Result<Model, Box<dyn Error>> {
    hyperparams.validate()?;
    if input_shape.channels == 0 || input_shape.height == 0 || input_shape.width == 0 {
        return Err(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "input shape dimensions must be greater than 0",
        )));
    }

    let mut layers: Vec<Box<dyn Layer>> = Vec::new();
    let mut channels = input_shape.channels;
    let mut height = input_shape.height;
    let mut width = input_shape.width;

    for (block, (&filters, &drop_rate)) in BLOCK_FILTERS
        .iter()
        .zip(BLOCK_DROP_RATES.iter())
        .enumerate()
    {
        // Same-padded convolution keeps the spatial dimensions; the valid one
        // shrinks them by kernel_size - 1, and pooling halves them.
        if height < KERNEL_SIZE - 1 + POOL_SIZE || width < KERNEL_SIZE - 1 + POOL_SIZE {
            return Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "input {}x{} too small for convolutional block {} ({}x{} remaining)",
                    input_shape.height, input_shape.width, block, height, width
                ),
            )));
        }

        layers.push(Box::new(Conv2DLayer::new(
            channels,
            filters,
            KERNEL_SIZE,
            Padding::Same,
            height,
            width,
            CONV_L2_STRENGTH,
            rng,
        )));
        layers.push(Box::new(BatchNormLayer::new(
            filters, height, width, BN_EPSILON, BN_MOMENTUM,
        )));
        layers.push(Box::new(ActivationLayer::new(
            filters * height * width,
            Activation::Relu,
        )));

        layers.push(Box::new(Conv2DLayer::new(
            filters,
            filters,
            KERNEL_SIZE,
            Padding::Valid,
            height,
            width,
            CONV_L2_STRENGTH,
            rng,
        )));
        height -= KERNEL_SIZE - 1;
        width -= KERNEL_SIZE - 1;
        layers.push(Box::new(BatchNormLayer::new(
            filters, height, width, BN_EPSILON, BN_MOMENTUM,
        )));
        layers.push(Box::new(ActivationLayer::new(
            filters * height * width,
            Activation::Relu,
        )));

        layers.push(Box::new(MaxPool2DLayer::new(
            filters, height, width, POOL_SIZE,
        )));
        height = (height - POOL_SIZE) / POOL_SIZE + 1;
        width = (width - POOL_SIZE) / POOL_SIZE + 1;

        layers.push(Box::new(DropoutLayer::new(
            filters * height * width,
            drop_rate,
            rng,
        )));

        channels = filters;
    }

    let flattened = channels * height * width;
    layers.push(Box::new(FlattenLayer::new(flattened)));
    layers.push(Box::new(DenseLayer::new(flattened, NUM_CLASSES, rng)));
    layers.push(Box::new(ActivationLayer::new(
        NUM_CLASSES,
        Activation::Softmax,
    )));

    Ok(Model {
        layers,
        input_shape,
        hyperparams,
    })
}
