//! 2D Convolutional layer implementation
//!
//! This module provides a Conv2DLayer that performs 2D convolution operations
//! over channel-major feature maps, with Keras-style `same`/`valid` padding
//! and an optional L2 penalty on the kernel weights.

use crate::layers::Layer;
use crate::utils::SimpleRng;
use serde::Deserialize;

/// Padding mode for convolutions.
///
/// `Same` pads the input so that the output spatial dimensions equal the
/// input dimensions (stride 1, odd kernels). `Valid` applies no padding,
/// shrinking the output by `kernel_size - 1` in each spatial dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    Same,
    #[default]
    Valid,
}

impl Padding {
    /// Zero-padding amount in pixels for a square kernel of the given size.
    pub fn amount(self, kernel_size: usize) -> usize {
        match self {
            Padding::Same => (kernel_size - 1) / 2,
            Padding::Valid => 0,
        }
    }
}

/// 2D Convolutional layer with learnable filters.
///
/// Performs 2D convolution: slides filters over input to produce feature maps.
/// Weights are laid out as out_channels × in_channels × kernel_size × kernel_size,
/// with one bias per output channel.
///
/// The layer optionally carries an L2 penalty strength on its kernel weights.
/// The penalty is observable via [`Layer::l2_penalty`] and does not affect
/// the forward pass.
///
/// # Example
///
/// ```
/// use cifar_cnn::layers::{Conv2DLayer, Padding};
/// use cifar_cnn::utils::SimpleRng;
///
/// let mut rng = SimpleRng::new(42);
/// // 3 input channels (RGB), 32 filters, 3x3 kernel, same padding, 32x32 input
/// let layer = Conv2DLayer::new(3, 32, 3, Padding::Same, 32, 32, 1e-4, &mut rng);
/// assert_eq!(layer.output_height(), 32);
/// assert_eq!(layer.output_width(), 32);
/// ```
pub struct Conv2DLayer {
    in_channels: usize,
    out_channels: usize,
    kernel_size: usize,
    padding: usize,
    input_height: usize,
    input_width: usize,
    l2_strength: f32,
    weights: Vec<f32>, // [out_channels * in_channels * kernel_size * kernel_size]
    biases: Vec<f32>,  // [out_channels]
}

impl Conv2DLayer {
    /// Create a new Conv2DLayer with Xavier initialization.
    ///
    /// Weights are initialized using Xavier/Glorot initialization adapted for
    /// convolutions: sampled uniformly from [-limit, limit] where
    /// limit = sqrt(6 / (fan_in + fan_out)), with
    /// fan_in = in_channels × kernel_size² and fan_out = out_channels × kernel_size².
    /// Biases are initialized to zero.
    ///
    /// # Arguments
    ///
    /// * `in_channels` - Number of input channels
    /// * `out_channels` - Number of output feature maps (filters)
    /// * `kernel_size` - Size of square kernel (e.g., 3 for 3×3)
    /// * `padding` - Padding mode (`Same` or `Valid`)
    /// * `input_height` - Height of input feature map
    /// * `input_width` - Width of input feature map
    /// * `l2_strength` - L2 penalty strength on kernel weights (0.0 disables)
    /// * `rng` - Random number generator for weight initialization
    ///
    /// # Panics
    ///
    /// Panics if any dimension is zero, if `l2_strength` is negative, or if
    /// `Same` padding is requested with an even kernel size.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        padding: Padding,
        input_height: usize,
        input_width: usize,
        l2_strength: f32,
        rng: &mut SimpleRng,
    ) -> Self {
        assert!(in_channels > 0, "in_channels must be greater than 0");
        assert!(out_channels > 0, "out_channels must be greater than 0");
        assert!(kernel_size > 0, "kernel_size must be greater than 0");
        assert!(input_height > 0 && input_width > 0, "input dimensions must be greater than 0");
        assert!(l2_strength >= 0.0, "l2_strength must be non-negative");
        assert!(
            padding == Padding::Valid || kernel_size % 2 == 1,
            "same padding requires an odd kernel size"
        );
        assert!(
            kernel_size <= input_height + 2 * padding.amount(kernel_size)
                && kernel_size <= input_width + 2 * padding.amount(kernel_size),
            "kernel does not fit the padded input"
        );

        let fan_in = (in_channels * kernel_size * kernel_size) as f32;
        let fan_out = (out_channels * kernel_size * kernel_size) as f32;
        let limit = (6.0f32 / (fan_in + fan_out)).sqrt();

        let weight_count = out_channels * in_channels * kernel_size * kernel_size;
        let mut weights = vec![0.0f32; weight_count];

        for value in &mut weights {
            *value = rng.gen_range_f32(-limit, limit);
        }

        Self {
            in_channels,
            out_channels,
            kernel_size,
            padding: padding.amount(kernel_size),
            input_height,
            input_width,
            l2_strength,
            weights,
            biases: vec![0.0f32; out_channels],
        }
    }

    /// Get the number of input channels.
    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    /// Get the number of output channels (filters).
    pub fn out_channels(&self) -> usize {
        self.out_channels
    }

    /// Get the kernel size.
    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    /// Get the L2 penalty strength on kernel weights.
    pub fn l2_strength(&self) -> f32 {
        self.l2_strength
    }

    /// Get the output height after convolution.
    ///
    /// Calculated as: input_height + 2*padding - kernel_size + 1
    pub fn output_height(&self) -> usize {
        self.input_height + 2 * self.padding - self.kernel_size + 1
    }

    /// Get the output width after convolution.
    ///
    /// Calculated as: input_width + 2*padding - kernel_size + 1
    pub fn output_width(&self) -> usize {
        self.input_width + 2 * self.padding - self.kernel_size + 1
    }
}

impl Layer for Conv2DLayer {
    fn forward(&self, input: &[f32], output: &mut [f32], batch_size: usize) {
        let out_h = self.output_height();
        let out_w = self.output_width();
        let out_spatial = out_h * out_w;
        let in_spatial = self.input_height * self.input_width;
        let padding = self.padding as isize;

        assert_eq!(
            input.len(),
            batch_size * self.in_channels * in_spatial,
            "input len mismatch in Conv2DLayer::forward"
        );
        assert_eq!(
            output.len(),
            batch_size * self.out_channels * out_spatial,
            "output len mismatch in Conv2DLayer::forward"
        );

        for b in 0..batch_size {
            let in_base = b * (self.in_channels * in_spatial);
            let out_base_b = b * (self.out_channels * out_spatial);

            for oc in 0..self.out_channels {
                let bias = self.biases[oc];
                let out_base = out_base_b + oc * out_spatial;

                for oy in 0..out_h {
                    for ox in 0..out_w {
                        let mut sum = bias;

                        for ic in 0..self.in_channels {
                            let w_base =
                                (oc * self.in_channels + ic) * self.kernel_size * self.kernel_size;
                            let in_base_c = in_base + ic * in_spatial;

                            for ky in 0..self.kernel_size {
                                for kx in 0..self.kernel_size {
                                    let iy = oy as isize + ky as isize - padding;
                                    let ix = ox as isize + kx as isize - padding;

                                    if iy >= 0
                                        && iy < self.input_height as isize
                                        && ix >= 0
                                        && ix < self.input_width as isize
                                    {
                                        let in_idx = in_base_c
                                            + iy as usize * self.input_width
                                            + ix as usize;
                                        let w_idx = w_base + ky * self.kernel_size + kx;
                                        sum += input[in_idx] * self.weights[w_idx];
                                    }
                                }
                            }
                        }

                        output[out_base + oy * out_w + ox] = sum;
                    }
                }
            }
        }
    }

    fn input_size(&self) -> usize {
        self.in_channels * self.input_height * self.input_width
    }

    fn output_size(&self) -> usize {
        self.out_channels * self.output_height() * self.output_width()
    }

    fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    /// Current L2 regularization penalty: l2_strength × Σ w².
    ///
    /// Biases are not regularized.
    fn l2_penalty(&self) -> f32 {
        if self.l2_strength == 0.0 {
            return 0.0;
        }
        let sum_sq: f32 = self.weights.iter().map(|w| w * w).sum();
        self.l2_strength * sum_sq
    }

    fn name(&self) -> &'static str {
        "conv2d"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conv2d_initialization() {
        let mut rng = SimpleRng::new(42);
        let layer = Conv2DLayer::new(3, 32, 3, Padding::Same, 32, 32, 1e-4, &mut rng);

        assert_eq!(layer.in_channels(), 3);
        assert_eq!(layer.out_channels(), 32);
        assert_eq!(layer.kernel_size(), 3);
        assert_eq!(layer.l2_strength(), 1e-4);
    }

    #[test]
    fn test_conv2d_parameter_count() {
        let mut rng = SimpleRng::new(42);
        let layer = Conv2DLayer::new(3, 32, 3, Padding::Same, 32, 32, 1e-4, &mut rng);

        // weights: 32 * 3 * 3 * 3 = 864, biases: 32
        assert_eq!(layer.parameter_count(), 896);
    }

    #[test]
    fn test_conv2d_same_padding_preserves_dimensions() {
        let mut rng = SimpleRng::new(42);
        let layer = Conv2DLayer::new(3, 32, 3, Padding::Same, 32, 32, 0.0, &mut rng);

        assert_eq!(layer.output_height(), 32);
        assert_eq!(layer.output_width(), 32);
    }

    #[test]
    fn test_conv2d_valid_padding_shrinks_dimensions() {
        let mut rng = SimpleRng::new(42);
        let layer = Conv2DLayer::new(32, 32, 3, Padding::Valid, 32, 32, 0.0, &mut rng);

        assert_eq!(layer.output_height(), 30); // 32 - 3 + 1
        assert_eq!(layer.output_width(), 30);
    }

    #[test]
    fn test_conv2d_xavier_initialization_bounds() {
        let mut rng = SimpleRng::new(42);
        let layer = Conv2DLayer::new(3, 32, 3, Padding::Same, 32, 32, 1e-4, &mut rng);

        let fan_in = (3 * 3 * 3) as f32;
        let fan_out = (32 * 3 * 3) as f32;
        let limit = (6.0f32 / (fan_in + fan_out)).sqrt();

        for &weight in &layer.weights {
            assert!(
                weight >= -limit && weight <= limit,
                "Weight {} outside Xavier bounds [{}, {}]",
                weight,
                -limit,
                limit
            );
        }

        for &bias in &layer.biases {
            assert_eq!(bias, 0.0);
        }
    }

    #[test]
    fn test_conv2d_deterministic_initialization() {
        let mut rng1 = SimpleRng::new(12345);
        let layer1 = Conv2DLayer::new(3, 16, 5, Padding::Same, 32, 32, 1e-4, &mut rng1);

        let mut rng2 = SimpleRng::new(12345);
        let layer2 = Conv2DLayer::new(3, 16, 5, Padding::Same, 32, 32, 1e-4, &mut rng2);

        assert_eq!(layer1.weights, layer2.weights);
        assert_eq!(layer1.biases, layer2.biases);
    }

    #[test]
    fn test_conv2d_forward_identity_kernel() {
        let mut rng = SimpleRng::new(42);
        let mut layer = Conv2DLayer::new(1, 1, 3, Padding::Same, 3, 3, 0.0, &mut rng);

        // Identity kernel: 1.0 at the center, 0.0 elsewhere.
        layer.weights = vec![0.0; 9];
        layer.weights[4] = 1.0;

        let input: Vec<f32> = (1..=9).map(|v| v as f32).collect();
        let mut output = vec![0.0f32; 9];
        layer.forward(&input, &mut output, 1);

        assert_eq!(output, input);
    }

    #[test]
    fn test_conv2d_forward_bias_only() {
        let mut rng = SimpleRng::new(42);
        let mut layer = Conv2DLayer::new(1, 2, 3, Padding::Valid, 4, 4, 0.0, &mut rng);

        layer.weights = vec![0.0; 2 * 9];
        layer.biases = vec![0.5, -1.5];

        let input = vec![1.0f32; 16];
        let mut output = vec![0.0f32; 2 * 4];
        layer.forward(&input, &mut output, 1);

        for &v in &output[..4] {
            assert_eq!(v, 0.5);
        }
        for &v in &output[4..] {
            assert_eq!(v, -1.5);
        }
    }

    #[test]
    fn test_conv2d_l2_penalty() {
        let mut rng = SimpleRng::new(42);
        let mut layer = Conv2DLayer::new(1, 1, 3, Padding::Valid, 4, 4, 1e-4, &mut rng);

        layer.weights = vec![2.0; 9];
        // 1e-4 * 9 * 4 = 3.6e-3
        assert!((layer.l2_penalty() - 3.6e-3).abs() < 1e-8);
    }

    #[test]
    fn test_conv2d_unregularized_penalty_is_zero() {
        let mut rng = SimpleRng::new(42);
        let layer = Conv2DLayer::new(1, 4, 3, Padding::Valid, 8, 8, 0.0, &mut rng);
        assert_eq!(layer.l2_penalty(), 0.0);
    }

    #[test]
    #[should_panic(expected = "same padding requires an odd kernel size")]
    fn test_conv2d_same_padding_even_kernel_panics() {
        let mut rng = SimpleRng::new(42);
        Conv2DLayer::new(1, 4, 2, Padding::Same, 8, 8, 0.0, &mut rng);
    }
}
