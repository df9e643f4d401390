use crate::activation::activation::ActivationFunction;
use crate::data::sample::Sample;
use crate::loss::cross_entropy::{CrossEntropyLoss, one_hot};
use crate::loss::softmax::softmax;
use crate::network::forward::forward;
use crate::network::gradients::Gradients;
use crate::network::network::Network;

/// Gradients of the softmax cross-entropy loss for a single labelled sample.
///
/// Output layer:  delta = softmax(logits) - one_hot(label)
/// Hidden layer l: delta_l[n] = (sum_k W_{l+1}[k][n] * delta_{l+1}[k]) * f'(a_{l+1}[n])
/// Every layer:    db_l = delta_l,  dw_l[n] = delta_l[n] * a_l
///
/// where `a_l` is the input of layer `l` and `f'` is evaluated at the
/// neuron's activation.
///
/// # Panics
/// Panics if `sample.label` is not a valid class for the output layer, or if
/// the input width is wrong.
pub fn backward(network: &Network, sample: &Sample, activation: ActivationFunction) -> Gradients {
    let cache = forward(network, &sample.input, activation);
    let layers = network.layers();
    let n_layers = layers.len();

    let expected = one_hot(sample.label, network.output_size());
    let classification = softmax(cache.logits());

    let mut grads = Gradients::zeros_like(network);
    let mut delta = CrossEntropyLoss::derivative(&classification, &expected);

    for l in (0..n_layers).rev() {
        if l + 1 < n_layers {
            let next = &layers[l + 1];
            let outputs = &cache.activations[l + 1];
            delta = (0..layers[l].size())
                .map(|n| {
                    let back: f64 = next.weights.rows_iter()
                        .zip(delta.iter())
                        .map(|(w, d)| w[n] * d)
                        .sum();
                    back * activation.derivative(outputs[n])
                })
                .collect();
        }

        let inputs = &cache.activations[l];
        for (n, d) in delta.iter().enumerate() {
            grads.dbs[l][n] = *d;
            grads.dws[l].row_mut(n)
                .iter_mut()
                .zip(inputs.iter())
                .for_each(|(dw, a)| *dw = d * a);
        }
    }

    grads.loss = CrossEntropyLoss::loss(&classification, &expected);
    grads
}
