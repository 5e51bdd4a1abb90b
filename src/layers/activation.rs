//! Activation layer implementation
//!
//! Wraps the shared activation helpers as a stackable layer so a sequential
//! model can interleave activations between parameterized layers.

use crate::layers::Layer;
use crate::utils::activations::{relu_inplace, softmax_rows};
use serde::Deserialize;

/// Activation function applied by an [`ActivationLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Rectified linear unit: max(0, x), elementwise.
    Relu,
    /// Row-wise softmax over each sample's values.
    Softmax,
}

/// Element- or row-wise activation applied as its own layer.
///
/// Has no trainable parameters and preserves dimensions.
pub struct ActivationLayer {
    size: usize,
    activation: Activation,
}

impl ActivationLayer {
    /// Create an activation layer over `size` values per sample.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn new(size: usize, activation: Activation) -> Self {
        assert!(size > 0, "size must be greater than 0");
        Self { size, activation }
    }

    /// Get the activation function this layer applies.
    pub fn activation(&self) -> Activation {
        self.activation
    }
}

impl Layer for ActivationLayer {
    fn forward(&self, input: &[f32], output: &mut [f32], batch_size: usize) {
        let total_size = batch_size * self.size;
        assert_eq!(
            input.len(),
            total_size,
            "input len mismatch: expected {}, got {}",
            total_size,
            input.len()
        );
        assert_eq!(
            output.len(),
            total_size,
            "output len mismatch: expected {}, got {}",
            total_size,
            output.len()
        );

        output.copy_from_slice(input);
        match self.activation {
            Activation::Relu => relu_inplace(output),
            Activation::Softmax => softmax_rows(output, batch_size, self.size),
        }
    }

    fn input_size(&self) -> usize {
        self.size
    }

    fn output_size(&self) -> usize {
        self.size
    }

    fn parameter_count(&self) -> usize {
        0
    }

    fn name(&self) -> &'static str {
        match self.activation {
            Activation::Relu => "relu",
            Activation::Softmax => "softmax",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relu_layer_forward() {
        let layer = ActivationLayer::new(4, Activation::Relu);

        let input = vec![-1.0, 0.0, 2.0, -3.0];
        let mut output = vec![0.0f32; 4];
        layer.forward(&input, &mut output, 1);

        assert_eq!(output, vec![0.0, 0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_softmax_layer_rows_sum_to_one() {
        let layer = ActivationLayer::new(3, Activation::Softmax);

        let input = vec![1.0, 2.0, 3.0, -1.0, 0.0, 1.0];
        let mut output = vec![0.0f32; 6];
        layer.forward(&input, &mut output, 2);

        let row0: f32 = output[..3].iter().sum();
        let row1: f32 = output[3..].iter().sum();
        assert!((row0 - 1.0).abs() < 1e-6);
        assert!((row1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_activation_layer_has_no_parameters() {
        let layer = ActivationLayer::new(10, Activation::Softmax);
        assert_eq!(layer.parameter_count(), 0);
        assert_eq!(layer.input_size(), layer.output_size());
    }
}
