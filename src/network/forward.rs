use crate::activation::activation::ActivationFunction;
use crate::network::network::Network;

/// Activations recorded during one forward pass.
///
/// `activations[0]` is the input and `activations[l + 1]` is the output of
/// layer `l`. The final entry holds raw logits: the output layer is never
/// activated, softmax is the caller's business.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardCache {
    pub activations: Vec<Vec<f64>>,
}

impl ForwardCache {
    pub fn input(&self) -> &[f64] {
        &self.activations[0]
    }

    /// Logits of the output layer.
    pub fn logits(&self) -> &[f64] {
        self.activations.last().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Runs `input` through every layer of `network`.
///
/// Hidden layers apply `activation` to their logits; the last layer does not.
///
/// # Panics
/// Panics if `input.len()` differs from the network's input width.
pub fn forward(network: &Network, input: &[f64], activation: ActivationFunction) -> ForwardCache {
    let layers = network.layers();
    let mut activations = Vec::with_capacity(layers.len() + 1);
    activations.push(input.to_vec());

    for (l, layer) in layers.iter().enumerate() {
        let f = if l + 1 == layers.len() { None } else { Some(activation) };
        let a = layer.feed_from(&activations[l], f);
        activations.push(a);
    }

    ForwardCache { activations }
}
