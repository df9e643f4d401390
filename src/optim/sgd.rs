use crate::network::{gradients::Gradients, network::Network};

/// Plain stochastic gradient descent: `param -= learning_rate * grad`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one update to every layer of `network`.
    ///
    /// `grads` must already be averaged over the batch it came from.
    pub fn step(&self, network: &mut Network, grads: &Gradients) {
        assert_eq!(network.layers().len(), grads.dws.len(), "gradient layer count mismatch");
        for ((layer, dw), db) in network.layers_mut().iter_mut().zip(grads.dws.iter()).zip(grads.dbs.iter()) {
            layer.apply_gradients(dw, db, self.learning_rate);
        }
    }
}
