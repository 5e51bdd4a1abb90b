//! Layer abstractions for the CIFAR-10 architecture
//!
//! This module provides the Layer trait and implementations for the layer
//! types the architecture uses: convolution, batch normalization, activation,
//! max pooling, dropout, flatten, and dense.

mod r#trait;
pub mod activation;
pub mod batchnorm;
pub mod conv2d;
pub mod dense;
pub mod dropout;
pub mod flatten;
pub mod maxpool;

pub use activation::{Activation, ActivationLayer};
pub use batchnorm::BatchNormLayer;
pub use conv2d::{Conv2DLayer, Padding};
pub use dense::DenseLayer;
pub use dropout::DropoutLayer;
pub use flatten::FlattenLayer;
pub use maxpool::MaxPool2DLayer;
pub use r#trait::Layer;
