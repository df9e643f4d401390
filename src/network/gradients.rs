use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// Per-parameter gradients, shaped exactly like the network they belong to.
///
/// `dws[l]` has one row per neuron of layer `l` and one column per incoming
/// weight; `dbs[l][n]` is the bias gradient of neuron `n`. `loss` is the
/// cross-entropy of the sample(s) the gradients were computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub dws: Vec<Matrix>,
    pub dbs: Vec<Vec<f64>>,
    pub loss: f64,
}

impl Gradients {
    /// All-zero gradients matching `network`'s shape.
    pub fn zeros_like(network: &Network) -> Gradients {
        Gradients {
            dws: network.layers().iter()
                .map(|l| Matrix::zeros(l.weights.rows, l.weights.cols))
                .collect(),
            dbs: network.layers().iter().map(|l| vec![0.0; l.size()]).collect(),
            loss: 0.0,
        }
    }

    /// Element-wise `self += other`, losses included.
    ///
    /// # Panics
    /// Panics if the two gradients come from differently shaped networks.
    pub fn accumulate(&mut self, other: &Gradients) {
        assert_eq!(self.dws.len(), other.dws.len(), "gradient layer count mismatch");
        for (acc, dw) in self.dws.iter_mut().zip(other.dws.iter()) {
            *acc += dw;
        }
        for (acc, db) in self.dbs.iter_mut().zip(other.dbs.iter()) {
            assert_eq!(acc.len(), db.len(), "bias gradient width mismatch");
            acc.iter_mut().zip(db.iter()).for_each(|(a, b)| *a += b);
        }
        self.loss += other.loss;
    }

    /// Multiplies every weight and bias gradient by `factor`. `loss` is left alone.
    pub fn scale(&mut self, factor: f64) {
        self.dws.iter_mut().for_each(|dw| dw.scale(factor));
        self.dbs.iter_mut().flatten().for_each(|db| *db *= factor);
    }

    /// True when every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.loss.is_finite()
            && self.dws.iter().all(|dw| dw.as_slice().iter().all(|x| x.is_finite()))
            && self.dbs.iter().flatten().all(|x| x.is_finite())
    }
}
