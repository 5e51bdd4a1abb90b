//! Layer trait definition for neural network layers
//!
//! This module defines the core Layer trait that all layer types must implement.
//! The trait provides a common interface for forward propagation, shape
//! bookkeeping, and training/inference mode switching.

/// Core trait for neural network layers.
///
/// All layer types (Conv2D, BatchNorm, MaxPool2D, etc.) implement this trait
/// to provide a uniform interface for stacking into a sequential model.
///
/// Layers work with f32 data in flat row-major buffers: each sample occupies
/// `input_size()` consecutive values, and a batch of `batch_size` samples is
/// `batch_size * input_size()` values. Spatial layers interpret a sample as
/// channels × height × width in channel-major order.
///
/// # Example
///
/// ```ignore
/// // Forward pass through a layer
/// let mut output = vec![0.0f32; batch_size * layer.output_size()];
/// layer.forward(&input, &mut output, batch_size);
/// ```
pub trait Layer {
    /// Forward propagation through the layer.
    ///
    /// Computes the layer output given input data. The layer applies its
    /// transformation (e.g., convolution, normalization, pooling) and writes
    /// results into `output`.
    ///
    /// # Arguments
    ///
    /// * `input` - Input data flattened as a 1D array (batch_size × input_size)
    /// * `output` - Output buffer to store results (batch_size × output_size)
    /// * `batch_size` - Number of samples in the batch
    ///
    /// # Panics
    ///
    /// Implementations may panic if input/output dimensions don't match expected sizes.
    fn forward(&self, input: &[f32], output: &mut [f32], batch_size: usize);

    /// Get the input size of the layer.
    ///
    /// Returns the expected number of input values per sample.
    fn input_size(&self) -> usize;

    /// Get the output size of the layer.
    ///
    /// Returns the number of output values per sample.
    fn output_size(&self) -> usize;

    /// Get the number of trainable parameters in the layer.
    ///
    /// Returns the total count of weights and biases. For example, a dense
    /// layer has input_size × output_size weights plus output_size biases.
    /// Layers without parameters (pooling, dropout, flatten) return 0.
    fn parameter_count(&self) -> usize;

    /// Current L2 regularization penalty contributed by this layer.
    ///
    /// Zero for unregularized layers; convolution layers with a kernel
    /// regularizer return strength × Σ w².
    fn l2_penalty(&self) -> f32 {
        0.0
    }

    /// Set whether the layer is in training mode.
    ///
    /// Batch normalization and dropout behave differently during training
    /// and inference; layers without mode-dependent behavior ignore this.
    fn set_training(&mut self, _training: bool) {}

    /// Short human-readable layer name for model summaries.
    fn name(&self) -> &'static str;
}
