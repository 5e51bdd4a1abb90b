//! Architecture configuration structures
//!
//! This module provides configuration structures for defining layer stacks
//! via JSON configuration files, enabling architecture experimentation
//! without code changes. The fixed CIFAR-10 topology in [`crate::model`] is
//! the programmatic counterpart; this path builds arbitrary stacks from the
//! same layer set.

use crate::layers::{
    Activation, ActivationLayer, BatchNormLayer, Conv2DLayer, DenseLayer, DropoutLayer,
    FlattenLayer, Layer, MaxPool2DLayer, Padding,
};
use crate::utils::SimpleRng;
use serde::Deserialize;
use std::error::Error;
use std::fs;

fn default_bn_epsilon() -> f32 {
    1e-3
}

fn default_bn_momentum() -> f32 {
    0.99
}

/// Configuration for a single layer in the stack.
///
/// The `layer_type` field selects the variant; each variant carries the
/// parameters its layer requires. Spatial layers take explicit input
/// dimensions so the configuration is self-describing.
///
/// # Examples
///
/// ```json
/// {
///   "layer_type": "conv2d",
///   "in_channels": 3,
///   "out_channels": 32,
///   "kernel_size": 3,
///   "padding": "same",
///   "input_height": 32,
///   "input_width": 32,
///   "l2_strength": 1e-4
/// }
/// ```
///
/// ```json
/// {
///   "layer_type": "dropout",
///   "size": 512,
///   "drop_rate": 0.2
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "layer_type", rename_all = "snake_case")]
pub enum LayerConfig {
    Conv2d {
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        /// Padding mode, "same" or "valid" (default: valid)
        #[serde(default)]
        padding: Padding,
        input_height: usize,
        input_width: usize,
        /// L2 penalty strength on kernel weights (default: 0.0, unregularized)
        #[serde(default)]
        l2_strength: f32,
    },
    Batchnorm {
        channels: usize,
        height: usize,
        width: usize,
        /// Numerical stability constant (default: 1e-3)
        #[serde(default = "default_bn_epsilon")]
        epsilon: f32,
        /// Running statistics EMA momentum (default: 0.99)
        #[serde(default = "default_bn_momentum")]
        momentum: f32,
    },
    Activation {
        size: usize,
        /// Activation function, "relu" or "softmax"
        function: Activation,
    },
    Maxpool2d {
        channels: usize,
        input_height: usize,
        input_width: usize,
        pool_size: usize,
    },
    Dropout {
        size: usize,
        drop_rate: f32,
    },
    Flatten {
        size: usize,
    },
    Dense {
        input_size: usize,
        output_size: usize,
    },
}

/// Configuration for an entire layer stack.
///
/// Layers are applied in the order they appear in the configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchitectureConfig {
    /// Sequence of layer configurations defining the network structure
    pub layers: Vec<LayerConfig>,
}

fn invalid_data(message: String) -> Box<dyn Error> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    ))
}

/// Loads an architecture configuration from a JSON file.
///
/// Reads the file at `path`, deserializes its JSON contents into an
/// [`ArchitectureConfig`], and validates the configuration.
///
/// # Returns
///
/// `Ok(ArchitectureConfig)` on success, or an error if the file cannot be
/// read, the JSON is invalid, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use cifar_cnn::architecture::load_architecture;
///
/// let arch = load_architecture("config/architectures/cifar10_cnn.json").unwrap();
/// assert!(!arch.layers.is_empty());
/// ```
pub fn load_architecture(path: &str) -> Result<ArchitectureConfig, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let config: ArchitectureConfig = serde_json::from_str(&contents)?;
    validate_architecture(&config)?;
    Ok(config)
}

/// Flattened input size of a layer configuration.
fn layer_input_size(layer: &LayerConfig) -> usize {
    match layer {
        LayerConfig::Conv2d {
            in_channels,
            input_height,
            input_width,
            ..
        } => in_channels * input_height * input_width,
        LayerConfig::Batchnorm {
            channels,
            height,
            width,
            ..
        } => channels * height * width,
        LayerConfig::Activation { size, .. } => *size,
        LayerConfig::Maxpool2d {
            channels,
            input_height,
            input_width,
            ..
        } => channels * input_height * input_width,
        LayerConfig::Dropout { size, .. } => *size,
        LayerConfig::Flatten { size } => *size,
        LayerConfig::Dense { input_size, .. } => *input_size,
    }
}

/// Flattened output size of a layer configuration.
fn layer_output_size(layer: &LayerConfig) -> usize {
    match layer {
        LayerConfig::Conv2d {
            out_channels,
            kernel_size,
            padding,
            input_height,
            input_width,
            ..
        } => {
            let pad = padding.amount(*kernel_size);
            let out_h = input_height + 2 * pad - kernel_size + 1;
            let out_w = input_width + 2 * pad - kernel_size + 1;
            out_channels * out_h * out_w
        }
        LayerConfig::Maxpool2d {
            channels,
            input_height,
            input_width,
            pool_size,
        } => {
            let out_h = (input_height - pool_size) / pool_size + 1;
            let out_w = (input_width - pool_size) / pool_size + 1;
            channels * out_h * out_w
        }
        LayerConfig::Dense { output_size, .. } => *output_size,
        // Normalization, activation, dropout and flatten preserve size.
        other => layer_input_size(other),
    }
}

/// Validates a single layer configuration.
///
/// Checks that dimensions are non-zero and parameter values are within valid
/// ranges. Errors name the offending layer index.
fn validate_layer(layer: &LayerConfig, index: usize) -> Result<(), Box<dyn Error>> {
    match layer {
        LayerConfig::Conv2d {
            in_channels,
            out_channels,
            kernel_size,
            padding,
            input_height,
            input_width,
            l2_strength,
        } => {
            if *in_channels == 0 || *out_channels == 0 {
                return Err(invalid_data(format!(
                    "Layer {}: channel counts must be greater than 0",
                    index
                )));
            }
            if *kernel_size == 0 {
                return Err(invalid_data(format!(
                    "Layer {}: kernel_size must be greater than 0",
                    index
                )));
            }
            if *input_height == 0 || *input_width == 0 {
                return Err(invalid_data(format!(
                    "Layer {}: input dimensions must be greater than 0",
                    index
                )));
            }
            if *padding == Padding::Same && kernel_size % 2 == 0 {
                return Err(invalid_data(format!(
                    "Layer {}: same padding requires an odd kernel_size",
                    index
                )));
            }
            let pad = padding.amount(*kernel_size);
            if *kernel_size > input_height + 2 * pad || *kernel_size > input_width + 2 * pad {
                return Err(invalid_data(format!(
                    "Layer {}: kernel_size {} does not fit {}x{} input",
                    index, kernel_size, input_height, input_width
                )));
            }
            if *l2_strength < 0.0 {
                return Err(invalid_data(format!(
                    "Layer {}: l2_strength must be non-negative",
                    index
                )));
            }
        }
        LayerConfig::Batchnorm {
            channels,
            height,
            width,
            epsilon,
            momentum,
        } => {
            if *channels == 0 || *height == 0 || *width == 0 {
                return Err(invalid_data(format!(
                    "Layer {}: dimensions must be greater than 0",
                    index
                )));
            }
            if *epsilon <= 0.0 {
                return Err(invalid_data(format!(
                    "Layer {}: epsilon must be positive",
                    index
                )));
            }
            if !(0.0..=1.0).contains(momentum) {
                return Err(invalid_data(format!(
                    "Layer {}: momentum must be in range [0.0, 1.0]",
                    index
                )));
            }
        }
        LayerConfig::Activation { size, .. } => {
            if *size == 0 {
                return Err(invalid_data(format!(
                    "Layer {}: size must be greater than 0",
                    index
                )));
            }
        }
        LayerConfig::Maxpool2d {
            channels,
            input_height,
            input_width,
            pool_size,
        } => {
            if *channels == 0 || *input_height == 0 || *input_width == 0 {
                return Err(invalid_data(format!(
                    "Layer {}: dimensions must be greater than 0",
                    index
                )));
            }
            if *pool_size == 0 {
                return Err(invalid_data(format!(
                    "Layer {}: pool_size must be greater than 0",
                    index
                )));
            }
            if pool_size > input_height || pool_size > input_width {
                return Err(invalid_data(format!(
                    "Layer {}: pool_size {} larger than {}x{} input",
                    index, pool_size, input_height, input_width
                )));
            }
        }
        LayerConfig::Dropout { size, drop_rate } => {
            if *size == 0 {
                return Err(invalid_data(format!(
                    "Layer {}: size must be greater than 0",
                    index
                )));
            }
            if !(0.0..1.0).contains(drop_rate) {
                return Err(invalid_data(format!(
                    "Layer {}: drop_rate must be in range [0.0, 1.0)",
                    index
                )));
            }
        }
        LayerConfig::Flatten { size } => {
            if *size == 0 {
                return Err(invalid_data(format!(
                    "Layer {}: size must be greater than 0",
                    index
                )));
            }
        }
        LayerConfig::Dense {
            input_size,
            output_size,
        } => {
            if *input_size == 0 || *output_size == 0 {
                return Err(invalid_data(format!(
                    "Layer {}: sizes must be greater than 0",
                    index
                )));
            }
        }
    }

    Ok(())
}

/// Validates an architecture configuration.
///
/// Checks that:
/// - The architecture has at least one layer
/// - Each layer's parameters are valid for its type
/// - Layer connections line up (flattened output size of layer i matches
///   the flattened input size of layer i+1)
///
/// # Errors
///
/// Returns an error with a descriptive, layer-indexed message if validation
/// fails.
pub fn validate_architecture(config: &ArchitectureConfig) -> Result<(), Box<dyn Error>> {
    if config.layers.is_empty() {
        return Err(invalid_data(
            "Architecture must have at least one layer".to_string(),
        ));
    }

    for (i, layer) in config.layers.iter().enumerate() {
        validate_layer(layer, i)?;
    }

    for i in 0..config.layers.len() - 1 {
        let current_output = layer_output_size(&config.layers[i]);
        let next_input = layer_input_size(&config.layers[i + 1]);

        if current_output != next_input {
            return Err(invalid_data(format!(
                "Layer connection mismatch: Layer {} output size ({}) does not match Layer {} input size ({})",
                i, current_output, i + 1, next_input
            )));
        }
    }

    Ok(())
}

/// Builds a layer stack from an architecture configuration.
///
/// Each configured layer is instantiated in order, with weights initialized
/// from `rng` where applicable.
///
/// # Returns
///
/// A vector of boxed trait objects implementing [`Layer`], ordered as
/// specified in the configuration.
///
/// # Errors
///
/// Returns an error if the configuration fails validation.
///
/// # Examples
///
/// ```no_run
/// use cifar_cnn::architecture::{build_model_from_config, load_architecture};
/// use cifar_cnn::utils::SimpleRng;
///
/// let config = load_architecture("config/architectures/cifar10_cnn.json").unwrap();
/// let mut rng = SimpleRng::new(42);
/// let layers = build_model_from_config(&config, &mut rng).unwrap();
/// assert_eq!(layers.len(), config.layers.len());
/// ```
pub fn build_model_from_config(
    config: &ArchitectureConfig,
    rng: &mut SimpleRng,
) -> Result<Vec<Box<dyn Layer>>, Box<dyn Error>> {
    validate_architecture(config)?;

    let mut layers: Vec<Box<dyn Layer>> = Vec::with_capacity(config.layers.len());

    for layer_config in &config.layers {
        match *layer_config {
            LayerConfig::Conv2d {
                in_channels,
                out_channels,
                kernel_size,
                padding,
                input_height,
                input_width,
                l2_strength,
            } => {
                layers.push(Box::new(Conv2DLayer::new(
                    in_channels,
                    out_channels,
                    kernel_size,
                    padding,
                    input_height,
                    input_width,
                    l2_strength,
                    rng,
                )));
            }
            LayerConfig::Batchnorm {
                channels,
                height,
                width,
                epsilon,
                momentum,
            } => {
                layers.push(Box::new(BatchNormLayer::new(
                    channels, height, width, epsilon, momentum,
                )));
            }
            LayerConfig::Activation { size, function } => {
                layers.push(Box::new(ActivationLayer::new(size, function)));
            }
            LayerConfig::Maxpool2d {
                channels,
                input_height,
                input_width,
                pool_size,
            } => {
                layers.push(Box::new(MaxPool2DLayer::new(
                    channels,
                    input_height,
                    input_width,
                    pool_size,
                )));
            }
            LayerConfig::Dropout { size, drop_rate } => {
                layers.push(Box::new(DropoutLayer::new(size, drop_rate, rng)));
            }
            LayerConfig::Flatten { size } => {
                layers.push(Box::new(FlattenLayer::new(size)));
            }
            LayerConfig::Dense {
                input_size,
                output_size,
            } => {
                layers.push(Box::new(DenseLayer::new(input_size, output_size, rng)));
            }
        }
    }

    Ok(layers)
}
