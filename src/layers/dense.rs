//! Dense (fully connected) layer implementation
//!
//! This module provides a DenseLayer (also known as Linear or Fully Connected
//! layer) that performs the transformation: output = input × weights + biases

use crate::layers::Layer;
use crate::utils::SimpleRng;

/// Dense (fully connected) layer with weights and biases.
///
/// Performs the linear transformation: y = xW + b
/// where x is the input (batch_size × input_size),
/// W is the weight matrix (input_size × output_size),
/// and b is the bias vector (output_size).
///
/// # Example
///
/// ```
/// use cifar_cnn::layers::{DenseLayer, Layer};
/// use cifar_cnn::utils::SimpleRng;
///
/// let mut rng = SimpleRng::new(42);
/// let layer = DenseLayer::new(512, 10, &mut rng);
/// assert_eq!(layer.input_size(), 512);
/// assert_eq!(layer.output_size(), 10);
/// ```
pub struct DenseLayer {
    input_size: usize,
    output_size: usize,
    weights: Vec<f32>, // row-major [input_size * output_size]
    biases: Vec<f32>,  // [output_size]
}

impl DenseLayer {
    /// Create a new DenseLayer with Xavier initialization.
    ///
    /// Weights are sampled uniformly from [-limit, limit] where
    /// limit = sqrt(6 / (input_size + output_size)). Biases start at zero.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn new(input_size: usize, output_size: usize, rng: &mut SimpleRng) -> Self {
        assert!(input_size > 0, "input_size must be greater than 0");
        assert!(output_size > 0, "output_size must be greater than 0");

        let mut weights = vec![0.0f32; input_size * output_size];
        let limit = (6.0f32 / (input_size + output_size) as f32).sqrt();

        for value in &mut weights {
            *value = rng.gen_range_f32(-limit, limit);
        }

        Self {
            input_size,
            output_size,
            weights,
            biases: vec![0.0f32; output_size],
        }
    }
}

impl Layer for DenseLayer {
    fn forward(&self, input: &[f32], output: &mut [f32], batch_size: usize) {
        assert_eq!(
            input.len(),
            batch_size * self.input_size,
            "input len mismatch in DenseLayer::forward"
        );
        assert_eq!(
            output.len(),
            batch_size * self.output_size,
            "output len mismatch in DenseLayer::forward"
        );

        for b in 0..batch_size {
            let in_base = b * self.input_size;
            let out_base = b * self.output_size;

            for o in 0..self.output_size {
                let mut sum = self.biases[o];
                for i in 0..self.input_size {
                    sum += input[in_base + i] * self.weights[i * self.output_size + o];
                }
                output[out_base + o] = sum;
            }
        }
    }

    fn input_size(&self) -> usize {
        self.input_size
    }

    fn output_size(&self) -> usize {
        self.output_size
    }

    fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    fn name(&self) -> &'static str {
        "dense"
    }
}
