//! Hyperparameter configuration structures
//!
//! This module provides the training hyperparameters the model factory
//! accepts, and loading/validation for JSON hyperparameter files.

use serde::Deserialize;
use std::error::Error;
use std::fs;

/// Training hyperparameters accepted by the model factory.
///
/// The architecture itself is fixed; these values are validated and carried
/// on the built model for the training stage to consume. They do not alter
/// the layer topology.
///
/// # Example
///
/// ```json
/// {
///   "learning_rate": 0.01,
///   "weight_decay": 1e-4,
///   "momentum": 0.9
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Hyperparameters {
    /// Step size for gradient descent
    pub learning_rate: f32,

    /// Weight decay coefficient
    pub weight_decay: f32,

    /// Momentum coefficient for the optimizer
    pub momentum: f32,
}

impl Hyperparameters {
    /// Create a hyperparameter set without file I/O.
    pub fn new(learning_rate: f32, weight_decay: f32, momentum: f32) -> Self {
        Self {
            learning_rate,
            weight_decay,
            momentum,
        }
    }

    /// Validate value ranges.
    ///
    /// The learning rate must be positive, weight decay non-negative, and
    /// momentum within [0.0, 1.0].
    ///
    /// # Errors
    ///
    /// Returns an error with a descriptive message if any value is out of range.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if !(self.learning_rate > 0.0) {
            return Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "learning_rate must be positive",
            )));
        }
        if !(self.weight_decay >= 0.0) {
            return Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "weight_decay must be non-negative",
            )));
        }
        if !(0.0..=1.0).contains(&self.momentum) {
            return Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "momentum must be in range [0.0, 1.0]",
            )));
        }
        Ok(())
    }
}

/// Loads hyperparameters from a JSON file.
///
/// Reads the file at `path`, deserializes its JSON contents, and validates
/// the value ranges.
///
/// # Returns
///
/// `Ok(Hyperparameters)` on success, or an error if the file cannot be read,
/// the JSON is invalid, or a value is out of range.
///
/// # Examples
///
/// ```no_run
/// use cifar_cnn::config::load_hyperparameters;
///
/// let hp = load_hyperparameters("config/cifar10_sgd.json").unwrap();
/// assert!(hp.learning_rate > 0.0);
/// ```
pub fn load_hyperparameters(path: &str) -> Result<Hyperparameters, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let hyperparams: Hyperparameters = serde_json::from_str(&contents)?;
    hyperparams.validate()?;
    Ok(hyperparams)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_hyperparameters() {
        let hp = Hyperparameters::new(0.01, 1e-4, 0.9);
        assert!(hp.validate().is_ok());
    }

    #[test]
    fn test_zero_learning_rate_rejected() {
        let hp = Hyperparameters::new(0.0, 1e-4, 0.9);
        assert!(hp.validate().is_err());
    }

    #[test]
    fn test_negative_weight_decay_rejected() {
        let hp = Hyperparameters::new(0.01, -1e-4, 0.9);
        assert!(hp.validate().is_err());
    }

    #[test]
    fn test_momentum_above_one_rejected() {
        let hp = Hyperparameters::new(0.01, 1e-4, 1.1);
        assert!(hp.validate().is_err());
    }

    #[test]
    fn test_nan_learning_rate_rejected() {
        let hp = Hyperparameters::new(f32::NAN, 1e-4, 0.9);
        assert!(hp.validate().is_err());
    }

    #[test]
    fn test_zero_momentum_and_decay_accepted() {
        let hp = Hyperparameters::new(0.1, 0.0, 0.0);
        assert!(hp.validate().is_ok());
    }
}
