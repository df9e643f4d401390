use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// One neuron as it appears in a persisted model: its incoming weights and bias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub weights: Vec<f64>,
    pub bias: f64,
}

/// Fully connected layer.
///
/// Weights live in a single `size × input_size` matrix (row `n` belongs to
/// neuron `n`), so every neuron has the same fan-in by construction.
/// On disk a layer is written as `{ "neurons": [{ "weights", "bias" }, ...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LayerRecord", into = "LayerRecord")]
pub struct Layer {
    pub weights: Matrix,
    pub biases: Vec<f64>,
}

impl Layer {
    /// Randomly initialized layer. Weights follow `activation`'s scheme,
    /// biases are uniform in `[-1, 1)`.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let weights = activation.init_weights(size, input_size, rng);
        let biases = (0..size).map(|_| rng.gen::<f64>() * 2.0 - 1.0).collect();
        Layer { weights, biases }
    }

    /// Builds a layer from explicit neurons.
    ///
    /// Fails if the layer is empty or the neurons disagree on weight count.
    pub fn from_neurons(neurons: Vec<Neuron>) -> Result<Layer, String> {
        if neurons.is_empty() {
            return Err("layer must contain at least one neuron".to_owned());
        }
        let biases = neurons.iter().map(|n| n.bias).collect();
        let rows = neurons.into_iter().map(|n| n.weights).collect();
        let weights = Matrix::from_rows(rows)
            .ok_or_else(|| "all neurons in a layer must have the same number of weights".to_owned())?;
        Ok(Layer { weights, biases })
    }

    /// Number of neurons.
    pub fn size(&self) -> usize {
        self.weights.rows
    }

    /// Width of the vector this layer consumes.
    pub fn input_size(&self) -> usize {
        self.weights.cols
    }

    pub fn neurons(&self) -> Vec<Neuron> {
        self.weights.rows_iter()
            .zip(self.biases.iter())
            .map(|(w, &b)| Neuron { weights: w.to_vec(), bias: b })
            .collect()
    }

    /// Logits `z_n = bias_n + sum_i(w_ni * input_i)` for every neuron.
    pub fn logits(&self, input: &[f64]) -> Vec<f64> {
        assert_eq!(
            input.len(),
            self.input_size(),
            "layer expects {} inputs, got {}",
            self.input_size(),
            input.len()
        );
        self.weights.rows_iter()
            .zip(self.biases.iter())
            .map(|(w, b)| b + w.iter().zip(input.iter()).map(|(w, x)| w * x).sum::<f64>())
            .collect()
    }

    /// Forward through this layer. `None` leaves the logits unactivated.
    pub fn feed_from(&self, input: &[f64], activation: Option<ActivationFunction>) -> Vec<f64> {
        let z = self.logits(input);
        match activation {
            Some(f) => z.into_iter().map(|x| f.function(x)).collect(),
            None => z,
        }
    }

    /// Applies pre-averaged gradients scaled by `lr`.
    pub fn apply_gradients(&mut self, weights_grad: &Matrix, biases_grad: &[f64], lr: f64) {
        assert_eq!(biases_grad.len(), self.biases.len(), "bias gradient has wrong length");
        self.weights.sub_scaled(weights_grad, lr);
        for (b, g) in self.biases.iter_mut().zip(biases_grad.iter()) {
            *b -= lr * g;
        }
    }
}

/// Serialized shape of a layer.
#[derive(Serialize, Deserialize)]
struct LayerRecord {
    neurons: Vec<Neuron>,
}

impl TryFrom<LayerRecord> for Layer {
    type Error = String;

    fn try_from(record: LayerRecord) -> Result<Self, Self::Error> {
        Layer::from_neurons(record.neurons)
    }
}

impl From<Layer> for LayerRecord {
    fn from(layer: Layer) -> Self {
        LayerRecord { neurons: layer.neurons() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logits_are_bias_plus_dot_product() {
        let layer = Layer::from_neurons(vec![
            Neuron { weights: vec![1.0, 2.0], bias: 0.5 },
            Neuron { weights: vec![-1.0, 0.0], bias: 0.0 },
        ]).unwrap();
        assert_eq!(layer.logits(&[3.0, 4.0]), vec![11.5, -3.0]);
        assert_eq!(
            layer.feed_from(&[3.0, 4.0], Some(ActivationFunction::ReLU)),
            vec![11.5, 0.0]
        );
    }

    #[test]
    fn ragged_neurons_are_rejected() {
        let err = Layer::from_neurons(vec![
            Neuron { weights: vec![1.0, 2.0], bias: 0.0 },
            Neuron { weights: vec![1.0], bias: 0.0 },
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn json_uses_neuron_records() {
        let layer = Layer::from_neurons(vec![Neuron { weights: vec![0.25], bias: -1.0 }]).unwrap();
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json, serde_json::json!({ "neurons": [{ "weights": [0.25], "bias": -1.0 }] }));
    }
}
