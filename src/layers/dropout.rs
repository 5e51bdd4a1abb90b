//! Dropout layer implementation for regularization
//!
//! This module provides a DropoutLayer that randomly drops (sets to zero) a
//! fraction of input units during training to prevent overfitting. During
//! inference, all units are kept and outputs pass through unchanged.

use crate::layers::Layer;
use crate::utils::rng::SimpleRng;
use std::cell::RefCell;

/// Dropout layer for regularization.
///
/// During training, randomly sets a fraction of input units to zero with
/// probability `drop_rate` and scales the remaining units by
/// 1/(1 - drop_rate) to maintain expected values (inverted dropout).
/// During inference, passes inputs through unchanged.
///
/// # Example
///
/// ```
/// use cifar_cnn::layers::{DropoutLayer, Layer};
/// use cifar_cnn::utils::SimpleRng;
///
/// let mut rng = SimpleRng::new(42);
/// let mut layer = DropoutLayer::new(512, 0.2, &mut rng);
/// assert_eq!(layer.input_size(), 512);
/// assert_eq!(layer.parameter_count(), 0);  // no trainable parameters
/// layer.set_training(false);  // inference: identity
/// ```
pub struct DropoutLayer {
    size: usize,
    drop_rate: f32,
    training: bool,
    rng: RefCell<SimpleRng>,
}

impl DropoutLayer {
    /// Creates a new dropout layer with specified size and drop rate.
    ///
    /// The layer starts in training mode and clones the provided RNG so the
    /// dropout mask stream is reproducible.
    ///
    /// # Arguments
    ///
    /// * `size` - Number of input/output features
    /// * `drop_rate` - Probability of dropping each unit, in [0.0, 1.0)
    /// * `rng` - Random number generator for mask generation
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or `drop_rate` is outside [0.0, 1.0).
    pub fn new(size: usize, drop_rate: f32, rng: &mut SimpleRng) -> Self {
        assert!(size > 0, "size must be greater than 0");
        assert!(
            (0.0..1.0).contains(&drop_rate),
            "drop_rate must be in range [0.0, 1.0)"
        );

        Self {
            size,
            drop_rate,
            training: true,
            rng: RefCell::new(rng.clone()),
        }
    }

    /// Get whether the layer is in training mode.
    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Get the configured drop rate.
    pub fn drop_rate(&self) -> f32 {
        self.drop_rate
    }
}

impl Layer for DropoutLayer {
    /// Forward propagation through the dropout layer.
    ///
    /// In training mode each unit is dropped independently with probability
    /// `drop_rate`; kept units are scaled by 1/(1 - drop_rate). In inference
    /// mode the input is copied through unchanged.
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

        if !self.training || self.drop_rate == 0.0 {
            output.copy_from_slice(input);
            return;
        }

        let keep_scale = 1.0 / (1.0 - self.drop_rate);
        let mut rng = self.rng.borrow_mut();
        for (out, &value) in output.iter_mut().zip(input.iter()) {
            if rng.next_f32() < self.drop_rate {
                *out = 0.0;
            } else {
                *out = value * keep_scale;
            }
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

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn name(&self) -> &'static str {
        "dropout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropout_initialization() {
        let mut rng = SimpleRng::new(42);
        let layer = DropoutLayer::new(256, 0.3, &mut rng);

        assert_eq!(layer.input_size(), 256);
        assert_eq!(layer.output_size(), 256);
        assert_eq!(layer.drop_rate(), 0.3);
        assert!(layer.is_training());
        assert_eq!(layer.parameter_count(), 0);
    }

    #[test]
    fn test_dropout_inference_is_identity() {
        let mut rng = SimpleRng::new(42);
        let mut layer = DropoutLayer::new(8, 0.5, &mut rng);
        layer.set_training(false);

        let input = vec![1.0, -2.0, 3.0, -4.0, 5.0, -6.0, 7.0, -8.0];
        let mut output = vec![0.0f32; 8];
        layer.forward(&input, &mut output, 1);

        assert_eq!(output, input);
    }

    #[test]
    fn test_dropout_training_drops_and_rescales() {
        let mut rng = SimpleRng::new(42);
        let layer = DropoutLayer::new(1000, 0.4, &mut rng);

        let input = vec![1.0f32; 1000];
        let mut output = vec![0.0f32; 1000];
        layer.forward(&input, &mut output, 1);

        let scale = 1.0 / (1.0 - 0.4);
        let dropped = output.iter().filter(|&&v| v == 0.0).count();
        for &v in &output {
            assert!(v == 0.0 || (v - scale).abs() < 1e-6);
        }

        // Roughly 40% of units should be dropped.
        assert!(dropped > 300 && dropped < 500, "dropped {} of 1000", dropped);
    }

    #[test]
    fn test_dropout_zero_rate_is_identity_in_training() {
        let mut rng = SimpleRng::new(42);
        let layer = DropoutLayer::new(4, 0.0, &mut rng);

        let input = vec![1.0, 2.0, 3.0, 4.0];
        let mut output = vec![0.0f32; 4];
        layer.forward(&input, &mut output, 1);

        assert_eq!(output, input);
    }

    #[test]
    fn test_dropout_deterministic_with_same_seed() {
        let mut rng1 = SimpleRng::new(7);
        let layer1 = DropoutLayer::new(64, 0.5, &mut rng1);
        let mut rng2 = SimpleRng::new(7);
        let layer2 = DropoutLayer::new(64, 0.5, &mut rng2);

        let input = vec![1.0f32; 64];
        let mut out1 = vec![0.0f32; 64];
        let mut out2 = vec![0.0f32; 64];
        layer1.forward(&input, &mut out1, 1);
        layer2.forward(&input, &mut out2, 1);

        assert_eq!(out1, out2);
    }

    #[test]
    #[should_panic(expected = "drop_rate must be in range")]
    fn test_dropout_rate_of_one_panics() {
        let mut rng = SimpleRng::new(42);
        DropoutLayer::new(4, 1.0, &mut rng);
    }
}
