use serde::{Serialize, Deserialize};
use crate::activation::activation::ActivationFunction;

/// Width of one MNIST image once flattened (28 × 28).
pub const INPUT_SIZE: usize = 28 * 28;
/// Number of digit classes.
pub const N_CLASSES: usize = 10;

/// Describes one layer of a network architecture.
///
/// Fields:
/// - `input_size`: number of values feeding into this layer (the size of the
///   previous layer, or the raw input width for the first one)
/// - `size`: number of neurons in this layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub input_size: usize,
    pub size: usize,
}

/// Architecture of a network plus the activation used by its hidden layers.
///
/// The activation also picks the initialization scheme, so a spec fully
/// determines how a fresh network is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub activation: ActivationFunction,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
}

impl NetworkSpec {
    /// 784 → 64 → 32 → 10 with ReLU hidden layers.
    pub fn relu() -> NetworkSpec {
        NetworkSpec {
            activation: ActivationFunction::ReLU,
            layers: vec![
                LayerSpec { input_size: INPUT_SIZE, size: 64 },
                LayerSpec { input_size: 64, size: 32 },
                LayerSpec { input_size: 32, size: N_CLASSES },
            ],
        }
    }

    /// 784 → 16 → 16 → 10 with Sigmoid hidden layers.
    pub fn sigmoid() -> NetworkSpec {
        NetworkSpec {
            activation: ActivationFunction::Sigmoid,
            layers: vec![
                LayerSpec { input_size: INPUT_SIZE, size: 16 },
                LayerSpec { input_size: 16, size: 16 },
                LayerSpec { input_size: 16, size: N_CLASSES },
            ],
        }
    }

    /// The preset architecture for `activation`.
    pub fn preset(activation: ActivationFunction) -> NetworkSpec {
        match activation {
            ActivationFunction::ReLU => NetworkSpec::relu(),
            ActivationFunction::Sigmoid => NetworkSpec::sigmoid(),
        }
    }

    /// Checks that there is at least one layer, none has a zero dimension, and
    /// every `input_size` equals the previous layer's `size`.
    pub fn validate(&self) -> Result<(), String> {
        if self.layers.is_empty() {
            return Err("network spec has no layers".to_owned());
        }
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.size == 0 || layer.input_size == 0 {
                return Err(format!("layer {} has a zero dimension", i));
            }
            if i > 0 && layer.input_size != self.layers[i - 1].size {
                return Err(format!(
                    "layer {} expects {} inputs but layer {} has {} neurons",
                    i, layer.input_size, i - 1, self.layers[i - 1].size
                ));
            }
        }
        Ok(())
    }
}

impl Default for NetworkSpec {
    fn default() -> Self {
        NetworkSpec::relu()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        assert!(NetworkSpec::relu().validate().is_ok());
        assert!(NetworkSpec::sigmoid().validate().is_ok());
        assert_eq!(NetworkSpec::default(), NetworkSpec::relu());
    }

    #[test]
    fn broken_chain_is_rejected() {
        let spec = NetworkSpec {
            activation: ActivationFunction::ReLU,
            layers: vec![
                LayerSpec { input_size: 4, size: 3 },
                LayerSpec { input_size: 2, size: 2 },
            ],
        };
        assert!(spec.validate().unwrap_err().contains("layer 1"));
    }
}
