use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;

/// Hidden-layer nonlinearity.
///
/// The selector also decides how a fresh network is initialized: ReLU layers
/// get He initialization, Sigmoid layers get uniform `[-1, 1]` weights.
/// The output layer is never activated; see `Network::forward`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
}

impl ActivationFunction {
    /// Element-wise activation of a logit `z`.
    pub fn function(&self, z: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => sigmoid(z),
            ActivationFunction::ReLU => relu(z),
        }
    }

    /// Derivative expressed in terms of the activation `a = function(z)`,
    /// not the logit. Backprop only keeps activations around.
    pub fn derivative(&self, a: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => sigmoid_prime(a),
            ActivationFunction::ReLU => relu_prime(a),
        }
    }

    /// Weight matrix for a layer of `size` neurons with `fan_in` inputs each.
    pub fn init_weights<R: Rng + ?Sized>(&self, size: usize, fan_in: usize, rng: &mut R) -> Matrix {
        match self {
            ActivationFunction::Sigmoid => Matrix::random(size, fan_in, rng),
            ActivationFunction::ReLU => Matrix::he(size, fan_in, rng),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::ReLU => "relu",
        }
    }
}

impl Default for ActivationFunction {
    fn default() -> Self {
        ActivationFunction::ReLU
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raised when an activation name is not one of `sigmoid` / `relu`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownActivation(pub String);

impl fmt::Display for UnknownActivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid activation function: '{}' (expected 'sigmoid' or 'relu')", self.0)
    }
}

impl std::error::Error for UnknownActivation {}

impl FromStr for ActivationFunction {
    type Err = UnknownActivation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sigmoid" => Ok(ActivationFunction::Sigmoid),
            "relu" => Ok(ActivationFunction::ReLU),
            other => Err(UnknownActivation(other.to_owned())),
        }
    }
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// `a * (1 - a)` where `a = sigmoid(z)`.
pub fn sigmoid_prime(a: f64) -> f64 {
    a * (1.0 - a)
}

pub fn relu(z: f64) -> f64 {
    if z > 0.0 { z } else { 0.0 }
}

pub fn relu_prime(a: f64) -> f64 {
    if a > 0.0 { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        assert_eq!("relu".parse::<ActivationFunction>().unwrap(), ActivationFunction::ReLU);
        assert_eq!("sigmoid".parse::<ActivationFunction>().unwrap(), ActivationFunction::Sigmoid);
    }

    #[test]
    fn rejects_unknown_name() {
        let err = "tanh".parse::<ActivationFunction>().unwrap_err();
        assert!(err.to_string().contains("tanh"));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ActivationFunction::ReLU).unwrap();
        assert_eq!(json, "\"relu\"");
        let back: ActivationFunction = serde_json::from_str("\"sigmoid\"").unwrap();
        assert_eq!(back, ActivationFunction::Sigmoid);
        assert!(serde_json::from_str::<ActivationFunction>("\"swish\"").is_err());
    }
}
