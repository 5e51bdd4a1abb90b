//! Shared utilities for the architecture library
//!
//! This module provides common utilities like random number generation
//! and activation functions used across the layer implementations.

pub mod activations;
pub mod rng;

pub use rng::SimpleRng;
