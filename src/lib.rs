//! CIFAR-10 CNN Architecture Library
//!
//! This library defines a convolutional neural network architecture for
//! 10-class image classification (CIFAR-10-style input). The core entry point
//! is [`model::build_custom_model`], which assembles a fixed sequential stack
//! of convolution, batch normalization, activation, pooling, dropout, and
//! dense layers from an input shape and a set of training hyperparameters.
//!
//! # Modules
//!
//! - `layers`: Layer trait and implementations (Conv2D, BatchNorm, MaxPool2D, etc.)
//! - `model`: Model container and the fixed CIFAR-10 architecture factory
//! - `architecture`: JSON-defined architecture configuration and building
//! - `config`: Hyperparameter configuration structures
//! - `utils`: Shared utilities (RNG, activation functions)

pub mod architecture;
pub mod config;
pub mod layers;
pub mod model;
pub mod utils;
