//! Flatten layer implementation
//!
//! Marks the transition from spatial feature maps to a flat feature vector.
//! Since all layers already operate on flat row-major buffers, the forward
//! pass is a copy; the layer exists so a stacked model mirrors its topology
//! one layer per entry.

use crate::layers::Layer;

/// Flatten layer: channels × height × width in, flat vector of the same
/// length out. Has no trainable parameters.
pub struct FlattenLayer {
    size: usize,
}

impl FlattenLayer {
    /// Create a flatten layer over `size` values per sample.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "size must be greater than 0");
        Self { size }
    }
}

impl Layer for FlattenLayer {
    fn forward(&self, input: &[f32], output: &mut [f32], batch_size: usize) {
        let total_size = batch_size * self.size;
        assert_eq!(input.len(), total_size, "input len mismatch in FlattenLayer::forward");
        assert_eq!(output.len(), total_size, "output len mismatch in FlattenLayer::forward");
        output.copy_from_slice(input);
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
        "flatten"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_passes_data_through() {
        let layer = FlattenLayer::new(4);

        let input = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let mut output = vec![0.0f32; 8];
        layer.forward(&input, &mut output, 2);

        assert_eq!(output, input);
        assert_eq!(layer.parameter_count(), 0);
    }
}
