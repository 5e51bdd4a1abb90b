//! 2D max pooling layer implementation
//!
//! This module provides a MaxPool2DLayer that downsamples feature maps by
//! taking the maximum over non-overlapping square windows, the standard
//! spatial reduction between convolutional blocks.

use crate::layers::Layer;

/// 2D max pooling layer.
///
/// Slides a square window of `pool_size × pool_size` over each channel with
/// stride equal to the window size and keeps the maximum value per window.
/// Output dimensions use valid (floor) semantics: a trailing partial window
/// is discarded, so a 13×13 map pooled 2×2 becomes 6×6.
///
/// Max pooling has no trainable parameters.
///
/// # Example
///
/// ```
/// use cifar_cnn::layers::{Layer, MaxPool2DLayer};
///
/// let layer = MaxPool2DLayer::new(32, 30, 30, 2);
/// assert_eq!(layer.output_height(), 15);
/// assert_eq!(layer.output_size(), 32 * 15 * 15);
/// assert_eq!(layer.parameter_count(), 0);
/// ```
pub struct MaxPool2DLayer {
    channels: usize,
    input_height: usize,
    input_width: usize,
    pool_size: usize,
}

impl MaxPool2DLayer {
    /// Create a new max pooling layer.
    ///
    /// # Arguments
    ///
    /// * `channels` - Number of channels (unchanged by pooling)
    /// * `input_height` - Height of input feature map
    /// * `input_width` - Width of input feature map
    /// * `pool_size` - Side of the square pooling window (stride equals this)
    ///
    /// # Panics
    ///
    /// Panics if any dimension is zero or the window is larger than the input.
    pub fn new(channels: usize, input_height: usize, input_width: usize, pool_size: usize) -> Self {
        assert!(channels > 0, "channels must be greater than 0");
        assert!(pool_size > 0, "pool_size must be greater than 0");
        assert!(
            pool_size <= input_height && pool_size <= input_width,
            "pool window larger than input"
        );

        Self {
            channels,
            input_height,
            input_width,
            pool_size,
        }
    }

    /// Get the number of channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Get the pooling window size.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Get the output height: (input_height - pool_size) / pool_size + 1.
    pub fn output_height(&self) -> usize {
        (self.input_height - self.pool_size) / self.pool_size + 1
    }

    /// Get the output width: (input_width - pool_size) / pool_size + 1.
    pub fn output_width(&self) -> usize {
        (self.input_width - self.pool_size) / self.pool_size + 1
    }
}

impl Layer for MaxPool2DLayer {
    fn forward(&self, input: &[f32], output: &mut [f32], batch_size: usize) {
        let out_h = self.output_height();
        let out_w = self.output_width();
        let in_spatial = self.input_height * self.input_width;
        let out_spatial = out_h * out_w;

        assert_eq!(
            input.len(),
            batch_size * self.channels * in_spatial,
            "input len mismatch in MaxPool2DLayer::forward"
        );
        assert_eq!(
            output.len(),
            batch_size * self.channels * out_spatial,
            "output len mismatch in MaxPool2DLayer::forward"
        );

        for b in 0..batch_size {
            for c in 0..self.channels {
                let in_base = (b * self.channels + c) * in_spatial;
                let out_base = (b * self.channels + c) * out_spatial;

                for py in 0..out_h {
                    for px in 0..out_w {
                        let y0 = py * self.pool_size;
                        let x0 = px * self.pool_size;

                        let mut best = f32::NEG_INFINITY;
                        for dy in 0..self.pool_size {
                            for dx in 0..self.pool_size {
                                let idx = in_base + (y0 + dy) * self.input_width + (x0 + dx);
                                if input[idx] > best {
                                    best = input[idx];
                                }
                            }
                        }

                        output[out_base + py * out_w + px] = best;
                    }
                }
            }
        }
    }

    fn input_size(&self) -> usize {
        self.channels * self.input_height * self.input_width
    }

    fn output_size(&self) -> usize {
        self.channels * self.output_height() * self.output_width()
    }

    fn parameter_count(&self) -> usize {
        0
    }

    fn name(&self) -> &'static str {
        "maxpool2d"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maxpool_output_dimensions_even() {
        let layer = MaxPool2DLayer::new(32, 30, 30, 2);
        assert_eq!(layer.output_height(), 15);
        assert_eq!(layer.output_width(), 15);
    }

    #[test]
    fn test_maxpool_output_dimensions_odd_input_floors() {
        // A trailing odd row/column is dropped: 13 -> 6.
        let layer = MaxPool2DLayer::new(64, 13, 13, 2);
        assert_eq!(layer.output_height(), 6);
        assert_eq!(layer.output_width(), 6);
    }

    #[test]
    fn test_maxpool_forward_selects_window_maximum() {
        let layer = MaxPool2DLayer::new(1, 4, 4, 2);

        #[rustfmt::skip]
        let input = vec![
            1.0, 2.0,  5.0, 6.0,
            3.0, 4.0,  7.0, 8.0,
            -1.0, -2.0,  0.0, 0.5,
            -3.0, -4.0,  0.25, 0.75,
        ];
        let mut output = vec![0.0f32; 4];
        layer.forward(&input, &mut output, 1);

        assert_eq!(output, vec![4.0, 8.0, -1.0, 0.75]);
    }

    #[test]
    fn test_maxpool_forward_per_channel_and_batch() {
        let layer = MaxPool2DLayer::new(2, 2, 2, 2);

        // Two samples, two channels each, one window per channel.
        let input = vec![
            1.0, 2.0, 3.0, 4.0, // sample 0, channel 0
            5.0, 6.0, 7.0, 8.0, // sample 0, channel 1
            -1.0, -2.0, -3.0, -4.0, // sample 1, channel 0
            0.0, 0.0, 9.0, 0.0, // sample 1, channel 1
        ];
        let mut output = vec![0.0f32; 4];
        layer.forward(&input, &mut output, 2);

        assert_eq!(output, vec![4.0, 8.0, -1.0, 9.0]);
    }

    #[test]
    fn test_maxpool_has_no_parameters() {
        let layer = MaxPool2DLayer::new(128, 4, 4, 2);
        assert_eq!(layer.parameter_count(), 0);
    }

    #[test]
    #[should_panic(expected = "pool window larger than input")]
    fn test_maxpool_oversized_window_panics() {
        MaxPool2DLayer::new(1, 2, 2, 3);
    }
}
