//! Batch normalization layer implementation
//!
//! This module provides a BatchNormLayer that normalizes feature maps
//! per channel across the batch and spatial dimensions, improving training
//! stability and enabling higher learning rates.
//!
//! # Batch Normalization Theory
//!
//! Batch normalization normalizes activations to zero mean and unit variance,
//! then applies learnable scale (gamma) and shift (beta) parameters:
//!
//! 1. Compute statistics: mean μ and variance σ² per channel, across the
//!    batch and all spatial positions
//! 2. Normalize: x_norm = (x - μ) / sqrt(σ² + ε)
//! 3. Scale and shift: y = γ * x_norm + β
//!
//! During training the layer uses batch statistics and updates running
//! statistics via exponential moving average; during inference it uses the
//! accumulated running statistics instead.
//!
//! # References
//!
//! Ioffe, S., & Szegedy, C. (2015). Batch Normalization: Accelerating Deep
//! Network Training by Reducing Internal Covariate Shift. ICML.

use crate::layers::Layer;
use std::cell::RefCell;

/// Batch normalization layer with learnable per-channel scale and shift.
///
/// Operates on channel-major feature maps (channels × height × width per
/// sample). Statistics are computed per channel over the batch and spatial
/// positions, matching the convolutional form of batch normalization. With
/// `height = width = 1` this degenerates to per-feature normalization.
///
/// # Example
///
/// ```
/// use cifar_cnn::layers::{BatchNormLayer, Layer};
///
/// let mut layer = BatchNormLayer::new(32, 16, 16, 1e-3, 0.99);
/// layer.set_training(false);
/// assert_eq!(layer.input_size(), 32 * 16 * 16);
/// assert_eq!(layer.parameter_count(), 64);  // 32 gamma + 32 beta
/// ```
pub struct BatchNormLayer {
    channels: usize,
    height: usize,
    width: usize,
    epsilon: f32,
    momentum: f32,
    training: bool,

    // Learnable parameters, one per channel
    gamma: Vec<f32>,
    beta: Vec<f32>,

    // Running statistics (updated during training, used during inference).
    // RefCell needed for interior mutability during forward pass.
    running_mean: RefCell<Vec<f32>>,
    running_var: RefCell<Vec<f32>>,
}

impl BatchNormLayer {
    /// Creates a new batch normalization layer.
    ///
    /// Gamma is initialized to 1.0 (no scaling) and beta to 0.0 (no shift).
    /// Running mean starts at 0.0 and running variance at 1.0, so an
    /// untrained layer normalizes against a standard-normal assumption at
    /// inference. The layer starts in training mode.
    ///
    /// # Arguments
    ///
    /// * `channels` - Number of channels to normalize over
    /// * `height` - Spatial height of each feature map (1 for dense features)
    /// * `width` - Spatial width of each feature map (1 for dense features)
    /// * `epsilon` - Small constant for numerical stability (typical: 1e-3 to 1e-5)
    /// * `momentum` - Momentum for running statistics EMA (typical: 0.9 or 0.99)
    ///
    /// # Panics
    ///
    /// Panics if any dimension is zero, `epsilon` is not positive, or
    /// `momentum` is outside [0.0, 1.0].
    pub fn new(channels: usize, height: usize, width: usize, epsilon: f32, momentum: f32) -> Self {
        assert!(channels > 0, "channels must be greater than 0");
        assert!(height > 0 && width > 0, "spatial dimensions must be greater than 0");
        assert!(epsilon > 0.0, "epsilon must be positive");
        assert!(
            (0.0..=1.0).contains(&momentum),
            "momentum must be in range [0.0, 1.0]"
        );

        Self {
            channels,
            height,
            width,
            epsilon,
            momentum,
            training: true,
            gamma: vec![1.0f32; channels],
            beta: vec![0.0f32; channels],
            running_mean: RefCell::new(vec![0.0f32; channels]),
            running_var: RefCell::new(vec![1.0f32; channels]),
        }
    }

    /// Get whether the layer is in training mode.
    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Get the epsilon value used for numerical stability.
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Get the momentum for running statistics updates.
    ///
    /// Used as: running = momentum * running + (1 - momentum) * batch.
    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    /// Get the number of normalized channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Immutable view of the layer's gamma (scale) parameters.
    pub fn gamma(&self) -> &[f32] {
        &self.gamma
    }

    /// Immutable view of the layer's beta (shift) parameters.
    pub fn beta(&self) -> &[f32] {
        &self.beta
    }

    /// Get a copy of the running mean statistics.
    pub fn running_mean(&self) -> Vec<f32> {
        self.running_mean.borrow().clone()
    }

    /// Get a copy of the running variance statistics.
    pub fn running_var(&self) -> Vec<f32> {
        self.running_var.borrow().clone()
    }
}

impl Layer for BatchNormLayer {
    /// Forward propagation through the batch normalization layer.
    ///
    /// During training, computes per-channel batch statistics over the batch
    /// and spatial positions, normalizes, applies gamma/beta, and updates the
    /// running statistics. During inference, normalizes with the accumulated
    /// running statistics, giving deterministic outputs.
    fn forward(&self, input: &[f32], output: &mut [f32], batch_size: usize) {
        let spatial = self.height * self.width;
        let sample_size = self.channels * spatial;
        let total_size = batch_size * sample_size;
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

        if self.training {
            let count = (batch_size * spatial) as f32;
            let mut batch_mean = vec![0.0f32; self.channels];
            let mut batch_var = vec![0.0f32; self.channels];

            // Per-channel mean over batch and spatial positions
            for b in 0..batch_size {
                for c in 0..self.channels {
                    let base = b * sample_size + c * spatial;
                    for s in 0..spatial {
                        batch_mean[c] += input[base + s];
                    }
                }
            }
            for mean in &mut batch_mean {
                *mean /= count;
            }

            // Per-channel variance
            for b in 0..batch_size {
                for c in 0..self.channels {
                    let base = b * sample_size + c * spatial;
                    for s in 0..spatial {
                        let diff = input[base + s] - batch_mean[c];
                        batch_var[c] += diff * diff;
                    }
                }
            }
            for var in &mut batch_var {
                *var /= count;
            }

            let std: Vec<f32> = batch_var
                .iter()
                .map(|&v| (v + self.epsilon).sqrt())
                .collect();

            // Normalize and apply scale/shift
            for b in 0..batch_size {
                for c in 0..self.channels {
                    let base = b * sample_size + c * spatial;
                    for s in 0..spatial {
                        let idx = base + s;
                        let normalized = (input[idx] - batch_mean[c]) / std[c];
                        output[idx] = self.gamma[c] * normalized + self.beta[c];
                    }
                }
            }

            // Update running statistics with exponential moving average:
            // running = momentum * running + (1 - momentum) * batch
            let mut running_mean = self.running_mean.borrow_mut();
            let mut running_var = self.running_var.borrow_mut();
            for c in 0..self.channels {
                running_mean[c] =
                    self.momentum * running_mean[c] + (1.0 - self.momentum) * batch_mean[c];
                running_var[c] =
                    self.momentum * running_var[c] + (1.0 - self.momentum) * batch_var[c];
            }
        } else {
            // Inference mode: use running statistics
            let running_mean = self.running_mean.borrow();
            let running_var = self.running_var.borrow();
            for b in 0..batch_size {
                for c in 0..self.channels {
                    let base = b * sample_size + c * spatial;
                    let inv_std = 1.0 / (running_var[c] + self.epsilon).sqrt();
                    for s in 0..spatial {
                        let idx = base + s;
                        let normalized = (input[idx] - running_mean[c]) * inv_std;
                        output[idx] = self.gamma[c] * normalized + self.beta[c];
                    }
                }
            }
        }
    }

    fn input_size(&self) -> usize {
        self.channels * self.height * self.width
    }

    fn output_size(&self) -> usize {
        self.channels * self.height * self.width
    }

    fn parameter_count(&self) -> usize {
        2 * self.channels // gamma + beta
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn name(&self) -> &'static str {
        "batchnorm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batchnorm_initialization() {
        let layer = BatchNormLayer::new(32, 16, 16, 1e-3, 0.99);

        assert_eq!(layer.channels(), 32);
        assert_eq!(layer.input_size(), 32 * 16 * 16);
        assert_eq!(layer.output_size(), layer.input_size());
        assert!(layer.is_training());
        assert!(layer.gamma().iter().all(|&g| g == 1.0));
        assert!(layer.beta().iter().all(|&b| b == 0.0));
        assert!(layer.running_mean().iter().all(|&m| m == 0.0));
        assert!(layer.running_var().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_batchnorm_parameter_count() {
        let layer = BatchNormLayer::new(64, 8, 8, 1e-3, 0.99);
        assert_eq!(layer.parameter_count(), 128);
    }

    #[test]
    fn test_batchnorm_training_normalizes_channel() {
        let layer = BatchNormLayer::new(1, 2, 2, 1e-5, 0.9);

        // Single channel, batch of 2, values with mean 2.5
        let input = vec![1.0, 2.0, 3.0, 4.0, 1.0, 2.0, 3.0, 4.0];
        let mut output = vec![0.0f32; 8];
        layer.forward(&input, &mut output, 2);

        let mean: f32 = output.iter().sum::<f32>() / 8.0;
        assert!(mean.abs() < 1e-5, "normalized mean should be ~0, got {}", mean);

        let var: f32 = output.iter().map(|&v| v * v).sum::<f32>() / 8.0;
        assert!((var - 1.0).abs() < 1e-3, "normalized variance should be ~1, got {}", var);
    }

    #[test]
    fn test_batchnorm_updates_running_statistics() {
        let layer = BatchNormLayer::new(1, 1, 1, 1e-5, 0.9);

        let input = vec![10.0f32, 10.0, 10.0, 10.0];
        let mut output = vec![0.0f32; 4];
        layer.forward(&input, &mut output, 4);

        // running_mean = 0.9 * 0.0 + 0.1 * 10.0 = 1.0
        assert!((layer.running_mean()[0] - 1.0).abs() < 1e-6);
        // running_var = 0.9 * 1.0 + 0.1 * 0.0 = 0.9
        assert!((layer.running_var()[0] - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_batchnorm_inference_uses_running_statistics() {
        let mut layer = BatchNormLayer::new(1, 1, 1, 1e-5, 0.9);
        layer.set_training(false);

        // Fresh layer: running mean 0, running var 1, gamma 1, beta 0, so
        // inference is (nearly) the identity.
        let input = vec![0.5f32, -0.25];
        let mut output = vec![0.0f32; 2];
        layer.forward(&input, &mut output, 2);

        assert!((output[0] - 0.5).abs() < 1e-3);
        assert!((output[1] + 0.25).abs() < 1e-3);

        // Running statistics must not move at inference.
        assert_eq!(layer.running_mean()[0], 0.0);
        assert_eq!(layer.running_var()[0], 1.0);
    }

    #[test]
    fn test_batchnorm_per_channel_statistics_are_independent() {
        let layer = BatchNormLayer::new(2, 1, 2, 1e-5, 0.9);

        // Channel 0 holds small values, channel 1 large ones; both should be
        // normalized to ~zero mean independently.
        let input = vec![1.0, 2.0, 100.0, 200.0, 3.0, 4.0, 300.0, 400.0];
        let mut output = vec![0.0f32; 8];
        layer.forward(&input, &mut output, 2);

        let ch0_mean = (output[0] + output[1] + output[4] + output[5]) / 4.0;
        let ch1_mean = (output[2] + output[3] + output[6] + output[7]) / 4.0;
        assert!(ch0_mean.abs() < 1e-4);
        assert!(ch1_mean.abs() < 1e-4);
    }

    #[test]
    #[should_panic(expected = "epsilon must be positive")]
    fn test_batchnorm_zero_epsilon_panics() {
        BatchNormLayer::new(4, 1, 1, 0.0, 0.9);
    }

    #[test]
    #[should_panic(expected = "momentum must be in range")]
    fn test_batchnorm_invalid_momentum_panics() {
        BatchNormLayer::new(4, 1, 1, 1e-5, 1.5);
    }
}
